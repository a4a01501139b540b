//! Port abstraction for post persistence adapters and their errors.

use async_trait::async_trait;
use pagination::Cursor;

use crate::domain::{Caption, FeedEntry, ImageUrl, Post, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by post repository adapters.
    pub enum PostPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post repository query failed: {message}",
    }
}

/// A post to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Owning user.
    pub user_id: UserId,
    /// Public URL of the already-uploaded image.
    pub image_url: ImageUrl,
    /// Optional caption.
    pub caption: Option<Caption>,
}

/// Persistence port for post rows and the `post_stats` read model.
///
/// Windowed reads fetch `fetch` rows ordered newest-first by
/// `(created_at, id)`, strictly older than `cursor` when one is supplied;
/// callers request one row beyond the page size and assemble the page
/// themselves. The stats-carrying reads return [`FeedEntry`] values with
/// `is_cheered` left `false`; viewer annotation happens in the service.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post.
    async fn insert(&self, new_post: NewPost) -> Result<Post, PostPersistenceError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError>;

    /// Delete a post row. Cheers and feedback cascade at the storage layer.
    async fn delete(&self, id: &PostId) -> Result<(), PostPersistenceError>;

    /// Windowed home-feed read over `post_stats` joined with authors.
    async fn feed_window(
        &self,
        cursor: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<FeedEntry>, PostPersistenceError>;

    /// Single-post read over `post_stats` joined with the author.
    async fn find_with_stats(
        &self,
        id: &PostId,
    ) -> Result<Option<FeedEntry>, PostPersistenceError>;

    /// Windowed read of one user's posts, without stats.
    async fn user_posts_window(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        fetch: i64,
    ) -> Result<Vec<Post>, PostPersistenceError>;
}
