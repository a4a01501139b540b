//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{DisplayName, Subject, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Persistence port for user rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by internal identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by external auth subject.
    async fn find_by_subject(
        &self,
        subject: &Subject,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a user on first sign-in, or refresh the display name of an
    /// existing row keyed by the same subject.
    async fn upsert_by_subject(
        &self,
        subject: &Subject,
        display_name: &DisplayName,
    ) -> Result<User, UserPersistenceError>;

    /// Replace the display name of an existing user.
    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: &DisplayName,
    ) -> Result<User, UserPersistenceError>;

    /// Replace the avatar URL of an existing user.
    async fn set_avatar_url(
        &self,
        id: &UserId,
        avatar_url: Option<&str>,
    ) -> Result<User, UserPersistenceError>;
}
