//! Post creation, the paginated home feed, and image uploads.

use std::sync::Arc;

use pagination::{Cursor, Page};
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{
    image_extension, BlobStore, BlobStoreError, CheerRepository, PostPersistenceError,
    NewPost, PostRepository, StoredBlob, UPLOAD_MAX_BYTES,
};
use crate::domain::{Caption, Error, FeedEntry, ImageUrl, Post, PostId, User, UserId};

/// Post and feed use-cases, plus the generic image upload they depend on.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    cheers: Arc<dyn CheerRepository>,
    blobs: Arc<dyn BlobStore>,
}

fn map_post_error(error: PostPersistenceError) -> Error {
    match error {
        PostPersistenceError::Connection { message } => Error::service_unavailable(message),
        PostPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::Io { message } => Error::internal(message),
        BlobStoreError::ForeignUrl { url } => {
            Error::internal(format!("url does not belong to this blob store: {url}"))
        }
    }
}

impl FeedService {
    /// Create the service over its repositories and blob store.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        cheers: Arc<dyn CheerRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self { posts, cheers, blobs }
    }

    /// Create a post from an already-uploaded image URL and an optional
    /// caption.
    ///
    /// # Errors
    /// `invalid_request` for a blank URL or an over-long caption, plus
    /// repository failures.
    pub async fn create_post(
        &self,
        actor: &User,
        image_url: &str,
        caption: Option<&str>,
    ) -> Result<Post, Error> {
        let image_url = ImageUrl::new(image_url).map_err(|error| {
            Error::invalid_request(error.to_string()).with_details(json!({ "field": "image_url" }))
        })?;
        let caption = caption
            .map(Caption::new)
            .transpose()
            .map_err(|error| {
                Error::invalid_request(error.to_string()).with_details(json!({ "field": "caption" }))
            })?;

        self.posts
            .insert(NewPost {
                user_id: actor.id,
                image_url,
                caption,
            })
            .await
            .map_err(map_post_error)
    }

    /// One page of the home feed, newest-first, annotated with the viewer's
    /// cheer state.
    ///
    /// The cheered annotation is best-effort: if the membership lookup
    /// fails, every entry reads as not cheered and the failure is logged.
    ///
    /// # Errors
    /// Repository failures from the windowed read.
    pub async fn feed(
        &self,
        viewer: Option<&User>,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Page<FeedEntry>, Error> {
        let rows = self
            .posts
            .feed_window(cursor, limit.saturating_add(1))
            .await
            .map_err(map_post_error)?;
        let page_size = usize::try_from(limit).unwrap_or_default();
        let mut page = Page::from_rows(rows, page_size, |entry: &FeedEntry| {
            (entry.post.created_at, *entry.post.id.as_uuid())
        });

        if let Some(viewer) = viewer {
            self.annotate_cheered(viewer, &mut page.items).await;
        }
        Ok(page)
    }

    /// A single post with stats, annotated with the viewer's cheer state.
    ///
    /// # Errors
    /// `not_found` for a missing post, plus repository failures.
    pub async fn get(
        &self,
        viewer: Option<&User>,
        post_id: &PostId,
    ) -> Result<FeedEntry, Error> {
        let mut entry = self
            .posts
            .find_with_stats(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found("post not found"))?;

        if let Some(viewer) = viewer {
            entry.is_cheered = match self.cheers.exists(post_id, &viewer.id).await {
                Ok(cheered) => cheered,
                Err(error) => {
                    warn!(%error, %post_id, "cheer lookup failed; reporting not cheered");
                    false
                }
            };
        }
        Ok(entry)
    }

    /// One page of a user's posts, newest-first, without stats.
    ///
    /// # Errors
    /// Repository failures from the windowed read.
    pub async fn posts_by_user(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Page<Post>, Error> {
        let rows = self
            .posts
            .user_posts_window(user_id, cursor, limit.saturating_add(1))
            .await
            .map_err(map_post_error)?;
        let page_size = usize::try_from(limit).unwrap_or_default();
        Ok(Page::from_rows(rows, page_size, |post: &Post| {
            (post.created_at, *post.id.as_uuid())
        }))
    }

    /// Delete a post the actor owns.
    ///
    /// The image blob is removed best-effort before the row: a storage
    /// failure is logged and does not block the delete.
    ///
    /// # Errors
    /// `not_found` for a missing post, `forbidden` for non-owners, plus
    /// repository failures.
    pub async fn delete_post(&self, actor: &User, post_id: &PostId) -> Result<(), Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found("post not found"))?;
        if post.user_id != actor.id {
            return Err(Error::forbidden("you do not own this post"));
        }

        if let Err(error) = self.blobs.delete_by_url(post.image_url.as_ref()).await {
            warn!(%error, %post_id, "image blob delete failed; removing row anyway");
        }
        self.posts.delete(post_id).await.map_err(map_post_error)
    }

    /// Store an uploaded image and return its public URL.
    ///
    /// # Errors
    /// `invalid_request` for an empty body, an oversized body, or a
    /// content type outside the accepted image set; storage failures
    /// surface as internal errors.
    pub async fn upload_image(
        &self,
        actor: &User,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredBlob, Error> {
        if bytes.is_empty() {
            return Err(Error::invalid_request("upload is empty"));
        }
        if bytes.len() > UPLOAD_MAX_BYTES {
            return Err(Error::invalid_request("upload exceeds the 10 MiB limit")
                .with_details(json!({ "max_bytes": UPLOAD_MAX_BYTES })));
        }
        let extension = image_extension(content_type).ok_or_else(|| {
            Error::invalid_request(format!("unsupported content type: {content_type}"))
        })?;

        self.blobs
            .put(&actor.id, extension, bytes)
            .await
            .map_err(map_blob_error)
    }

    async fn annotate_cheered(&self, viewer: &User, entries: &mut [FeedEntry]) {
        if entries.is_empty() {
            return;
        }
        let post_ids: Vec<PostId> = entries.iter().map(|entry| entry.post.id).collect();
        match self.cheers.cheered_subset(&viewer.id, &post_ids).await {
            Ok(cheered) => {
                for entry in entries {
                    entry.is_cheered = cheered.contains(&entry.post.id);
                }
            }
            Err(error) => {
                warn!(%error, "cheered-subset lookup failed; reporting not cheered");
            }
        }
    }
}
