//! Profile reads and the two profile write paths.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::ports::{
    image_extension, BlobStore, BlobStoreError, FollowRepository, UserPersistenceError,
    UserRepository, UserStatsQuery, UserStatsRecord,
};
use crate::domain::user::UserValidationError;
use crate::domain::{DisplayName, Error, Profile, User, UserId};

/// Maximum size of an avatar upload in bytes (5 MiB).
pub const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Profile use-cases: the merged profile read, display-name updates, and
/// avatar uploads.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    stats: Arc<dyn UserStatsQuery>,
    blobs: Arc<dyn BlobStore>,
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
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

fn map_name_error(error: UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": "display_name" }))
}

impl ProfileService {
    /// Create the service over its repositories and blob store.
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        stats: Arc<dyn UserStatsQuery>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            users,
            follows,
            stats,
            blobs,
        }
    }

    /// The merged profile for `target` as seen by `viewer`.
    ///
    /// Aggregate counts and the follow flag are best-effort: a stats
    /// failure zeroes the counts and a follow-lookup failure reads as not
    /// following, both logged.
    ///
    /// # Errors
    /// `not_found` for an unknown user, plus repository failures on the
    /// user row itself.
    pub async fn profile(
        &self,
        viewer: Option<&User>,
        target: &UserId,
    ) -> Result<Profile, Error> {
        let user = self
            .users
            .find_by_id(target)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let stats = match self.stats.user_stats(target).await {
            Ok(stats) => stats.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "user stats read failed; zeroing counts");
                UserStatsRecord::default()
            }
        };

        let is_own_profile = viewer.is_some_and(|viewer| viewer.id == *target);
        let is_following = match viewer {
            Some(viewer) if !is_own_profile => {
                match self.follows.exists(&viewer.id, target).await {
                    Ok(following) => following,
                    Err(error) => {
                        warn!(%error, "follow lookup failed; reporting not following");
                        false
                    }
                }
            }
            _ => false,
        };

        Ok(Profile {
            user,
            posts_count: stats.posts_count,
            followers_count: stats.followers_count,
            following_count: stats.following_count,
            is_following,
            is_own_profile,
        })
    }

    /// Update the actor's display name.
    ///
    /// # Errors
    /// `invalid_request` for a blank or over-long name, plus repository
    /// failures.
    pub async fn update_profile(
        &self,
        actor: &User,
        display_name: &str,
    ) -> Result<User, Error> {
        let display_name = DisplayName::new(display_name).map_err(map_name_error)?;
        self.users
            .update_display_name(&actor.id, &display_name)
            .await
            .map_err(map_user_error)
    }

    /// Store an avatar image and point the actor's profile at it.
    ///
    /// A previous avatar blob is removed best-effort; a storage failure
    /// there is logged and does not block the replacement.
    ///
    /// # Errors
    /// `invalid_request` for an empty body, a body over 5 MiB, or a
    /// content type outside the accepted image set; storage failures
    /// surface as internal errors.
    pub async fn upload_avatar(
        &self,
        actor: &User,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<User, Error> {
        if bytes.is_empty() {
            return Err(Error::invalid_request("avatar upload is empty"));
        }
        if bytes.len() > AVATAR_MAX_BYTES {
            return Err(Error::invalid_request("avatar exceeds the 5 MiB limit")
                .with_details(json!({ "max_bytes": AVATAR_MAX_BYTES })));
        }
        let extension = image_extension(content_type).ok_or_else(|| {
            Error::invalid_request(format!("unsupported content type: {content_type}"))
        })?;

        if let Some(previous) = actor.avatar_url.as_deref() {
            if let Err(error) = self.blobs.delete_by_url(previous).await {
                warn!(%error, "previous avatar delete failed; continuing with upload");
            }
        }

        let blob = self
            .blobs
            .put(&actor.id, extension, bytes)
            .await
            .map_err(map_blob_error)?;
        self.users
            .set_avatar_url(&actor.id, Some(&blob.url))
            .await
            .map_err(map_user_error)
    }
}
