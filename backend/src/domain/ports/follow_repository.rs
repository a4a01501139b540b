//! Port abstraction for follow persistence adapters.

use async_trait::async_trait;

use crate::domain::UserId;

use super::cheer_repository::InsertOutcome;
use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by follow repository adapters.
    pub enum FollowPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "follow repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "follow repository query failed: {message}",
    }
}

/// Persistence port for the follows relation.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Whether `follower` follows `following`.
    async fn exists(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<bool, FollowPersistenceError>;

    /// Insert the membership row; a unique-constraint conflict reports
    /// [`InsertOutcome::AlreadyPresent`].
    async fn insert(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<InsertOutcome, FollowPersistenceError>;

    /// Remove the membership row. Removing an absent row is not an error.
    async fn remove(
        &self,
        follower: &UserId,
        following: &UserId,
    ) -> Result<(), FollowPersistenceError>;
}
