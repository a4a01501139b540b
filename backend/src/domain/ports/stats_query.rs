//! Port abstraction for the read-only aggregate views.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by stats adapters.
    pub enum StatsPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "stats query connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "stats query failed: {message}",
    }
}

/// Aggregate counts for one user from the `user_stats` view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserStatsRecord {
    /// Number of posts the user owns.
    pub posts_count: i64,
    /// Number of users following this user.
    pub followers_count: i64,
    /// Number of users this user follows.
    pub following_count: i64,
}

/// Read-only port over the `user_stats` aggregate view.
#[async_trait]
pub trait UserStatsQuery: Send + Sync {
    /// Counts for one user; `None` when the view has no row (a user with no
    /// activity), which callers treat as all-zero.
    async fn user_stats(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserStatsRecord>, StatsPersistenceError>;
}
