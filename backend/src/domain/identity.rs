//! Identity resolution: external auth subjects to internal users.
//!
//! The auth provider owns authentication; this service only maps its opaque
//! subject identifier onto an internal user row. Every other operation takes
//! the resolved [`User`] as an explicit actor parameter, so nothing below
//! this layer reads ambient session state.

use std::sync::Arc;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, Error, Subject, User};

/// Maps auth-provider subjects onto internal user rows.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
    }
}

impl IdentityService {
    /// Create the service over a user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolve a subject to its user row, if one has been synced.
    ///
    /// # Errors
    /// Propagates repository failures as domain errors.
    pub async fn resolve(&self, subject: &Subject) -> Result<Option<User>, Error> {
        self.users
            .find_by_subject(subject)
            .await
            .map_err(map_persistence_error)
    }

    /// Resolve a subject, failing with `not_found` when no row exists.
    ///
    /// # Errors
    /// Returns `not_found` for unknown subjects, plus repository failures.
    pub async fn resolve_required(&self, subject: &Subject) -> Result<User, Error> {
        self.resolve(subject)
            .await?
            .ok_or_else(|| Error::not_found("user record not found"))
    }

    /// First-sign-in sync: insert a user row for the subject, or refresh the
    /// display name of the existing one.
    ///
    /// # Errors
    /// Propagates repository failures as domain errors.
    pub async fn sync(&self, subject: &Subject, display_name: &DisplayName) -> Result<User, Error> {
        self.users
            .upsert_by_subject(subject, display_name)
            .await
            .map_err(map_persistence_error)
    }
}
