//! Port abstraction for feedback persistence adapters.

use async_trait::async_trait;

use crate::domain::{Feedback, FeedbackContent, FeedbackId, FeedbackWithAuthor, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by feedback repository adapters.
    pub enum FeedbackPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "feedback repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "feedback repository query failed: {message}",
    }
}

/// A feedback entry to be inserted.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    /// Post the entry belongs to.
    pub post_id: PostId,
    /// Authoring user.
    pub user_id: UserId,
    /// Validated body text.
    pub content: FeedbackContent,
    /// Parent entry when this is a reply.
    pub parent_id: Option<FeedbackId>,
}

/// Persistence port for the comments relation.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Insert a feedback entry, returning it joined with its author.
    async fn insert(
        &self,
        new_feedback: NewFeedback,
    ) -> Result<FeedbackWithAuthor, FeedbackPersistenceError>;

    /// Fetch a feedback entry by identifier.
    async fn find_by_id(
        &self,
        id: &FeedbackId,
    ) -> Result<Option<Feedback>, FeedbackPersistenceError>;

    /// Top-level entries for a post, newest-first, capped at `limit`.
    async fn top_level_for_post(
        &self,
        post_id: &PostId,
        limit: i64,
    ) -> Result<Vec<FeedbackWithAuthor>, FeedbackPersistenceError>;

    /// All replies whose parent is in `parent_ids`, oldest-first.
    async fn replies_for(
        &self,
        parent_ids: &[FeedbackId],
    ) -> Result<Vec<FeedbackWithAuthor>, FeedbackPersistenceError>;

    /// Replace the content of an entry, bumping its update timestamp.
    async fn update_content(
        &self,
        id: &FeedbackId,
        content: &FeedbackContent,
    ) -> Result<FeedbackWithAuthor, FeedbackPersistenceError>;

    /// Delete an entry. Direct replies cascade at the storage layer.
    async fn delete(&self, id: &FeedbackId) -> Result<(), FeedbackPersistenceError>;
}
