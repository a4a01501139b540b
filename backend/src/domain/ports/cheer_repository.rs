//! Port abstraction for cheer (like) persistence adapters.

use async_trait::async_trait;

use crate::domain::{PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by cheer repository adapters.
    pub enum CheerPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "cheer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "cheer repository query failed: {message}",
    }
}

/// Result of inserting a membership row guarded by a unique constraint.
///
/// Concurrent toggles can both observe "absent" and both insert; the storage
/// layer's unique constraint turns the loser's insert into a conflict, which
/// adapters surface as [`InsertOutcome::AlreadyPresent`] so the toggle still
/// lands in the PRESENT state instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was created.
    Inserted,
    /// The unique constraint reported the row already exists.
    AlreadyPresent,
}

/// Persistence port for the likes relation.
#[async_trait]
pub trait CheerRepository: Send + Sync {
    /// Whether the (post, user) membership row exists.
    async fn exists(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<bool, CheerPersistenceError>;

    /// Insert the membership row.
    async fn insert(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<InsertOutcome, CheerPersistenceError>;

    /// Remove the membership row. Removing an absent row is not an error.
    async fn remove(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<(), CheerPersistenceError>;

    /// Number of cheers on a post.
    async fn count(&self, post_id: &PostId) -> Result<i64, CheerPersistenceError>;

    /// The subset of `post_ids` the user has cheered.
    async fn cheered_subset(
        &self,
        user_id: &UserId,
        post_ids: &[PostId],
    ) -> Result<Vec<PostId>, CheerPersistenceError>;
}
