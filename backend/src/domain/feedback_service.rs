//! Feedback write operations and threaded read assembly.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::feedback::{assemble_threads, FeedbackValidationError};
use crate::domain::ports::{
    FeedbackPersistenceError, FeedbackRepository, NewFeedback, PostPersistenceError,
    PostRepository,
};
use crate::domain::{
    Error, FeedbackContent, FeedbackId, FeedbackThread, FeedbackWithAuthor, PostId, User,
};

/// Feedback use-cases: create, threaded list, edit, delete.
#[derive(Clone)]
pub struct FeedbackService {
    posts: Arc<dyn PostRepository>,
    feedback: Arc<dyn FeedbackRepository>,
}

fn map_post_error(error: PostPersistenceError) -> Error {
    match error {
        PostPersistenceError::Connection { message } => Error::service_unavailable(message),
        PostPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_feedback_error(error: FeedbackPersistenceError) -> Error {
    match error {
        FeedbackPersistenceError::Connection { message } => Error::service_unavailable(message),
        FeedbackPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_content_error(error: FeedbackValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": "content" }))
}

impl FeedbackService {
    /// Create the service over its repositories.
    pub fn new(posts: Arc<dyn PostRepository>, feedback: Arc<dyn FeedbackRepository>) -> Self {
        Self { posts, feedback }
    }

    /// Create a feedback entry, optionally as a reply.
    ///
    /// Replies are bounded at depth one: the parent must exist, belong to
    /// the same post, and itself be top-level.
    ///
    /// # Errors
    /// `invalid_request` for content or threading violations, `not_found`
    /// for a missing post or parent, plus repository failures.
    pub async fn create(
        &self,
        actor: &User,
        post_id: &PostId,
        content: &str,
        parent_id: Option<FeedbackId>,
    ) -> Result<FeedbackWithAuthor, Error> {
        let content = FeedbackContent::new(content).map_err(map_content_error)?;

        self.posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found("post not found"))?;

        if let Some(parent_id) = parent_id {
            let parent = self
                .feedback
                .find_by_id(&parent_id)
                .await
                .map_err(map_feedback_error)?
                .ok_or_else(|| Error::not_found("parent feedback not found"))?;
            if parent.post_id != *post_id {
                return Err(Error::invalid_request(
                    "parent feedback belongs to a different post",
                ));
            }
            if parent.parent_id.is_some() {
                return Err(Error::invalid_request("replies cannot be nested further"));
            }
        }

        self.feedback
            .insert(NewFeedback {
                post_id: *post_id,
                user_id: actor.id,
                content,
                parent_id,
            })
            .await
            .map_err(map_feedback_error)
    }

    /// Threaded read: up to `limit` top-level entries, newest-first, each
    /// carrying its full reply list oldest-first.
    ///
    /// Reads degrade rather than fail: a replies-fetch failure yields bare
    /// top-level entries, and a top-level-fetch failure yields an empty
    /// list. Both are logged.
    pub async fn list(&self, post_id: &PostId, limit: i64) -> Vec<FeedbackThread> {
        let top_level = match self.feedback.top_level_for_post(post_id, limit).await {
            Ok(rows) => rows,
            Err(error) => {
                warn!(%error, %post_id, "top-level feedback read failed");
                return Vec::new();
            }
        };
        if top_level.is_empty() {
            return Vec::new();
        }

        let parent_ids: Vec<FeedbackId> = top_level.iter().map(|c| c.feedback.id).collect();
        let replies = match self.feedback.replies_for(&parent_ids).await {
            Ok(rows) => rows,
            Err(error) => {
                warn!(%error, %post_id, "reply read failed; returning bare top-level feedback");
                Vec::new()
            }
        };

        assemble_threads(top_level, replies)
    }

    /// Replace the content of an entry the actor owns.
    ///
    /// # Errors
    /// `not_found` for a missing entry, `forbidden` for non-owners,
    /// `invalid_request` for bad content, plus repository failures.
    pub async fn update(
        &self,
        actor: &User,
        feedback_id: &FeedbackId,
        content: &str,
    ) -> Result<FeedbackWithAuthor, Error> {
        let existing = self
            .feedback
            .find_by_id(feedback_id)
            .await
            .map_err(map_feedback_error)?
            .ok_or_else(|| Error::not_found("feedback not found"))?;
        if existing.user_id != actor.id {
            return Err(Error::forbidden("you do not own this feedback"));
        }

        let content = FeedbackContent::new(content).map_err(map_content_error)?;
        self.feedback
            .update_content(feedback_id, &content)
            .await
            .map_err(map_feedback_error)
    }

    /// Delete an entry the actor owns. Direct replies cascade.
    ///
    /// # Errors
    /// `not_found` for a missing entry, `forbidden` for non-owners, plus
    /// repository failures.
    pub async fn delete(&self, actor: &User, feedback_id: &FeedbackId) -> Result<(), Error> {
        let existing = self
            .feedback
            .find_by_id(feedback_id)
            .await
            .map_err(map_feedback_error)?
            .ok_or_else(|| Error::not_found("feedback not found"))?;
        if existing.user_id != actor.id {
            return Err(Error::forbidden("you do not own this feedback"));
        }

        self.feedback.delete(feedback_id).await.map_err(map_feedback_error)
    }
}
