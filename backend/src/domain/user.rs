//! User data model.
//!
//! Users are created by the sign-in sync step: the auth provider hands the
//! application an opaque subject identifier, and the identity service maps
//! it onto an internal row. The subject is immutable after creation; display
//! fields may change.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The identifier was empty or not a UUID.
    InvalidId,
    /// The external subject was empty once trimmed.
    EmptySubject,
    /// The external subject exceeded the storage bound.
    SubjectTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// The display name was empty once trimmed.
    EmptyDisplayName,
    /// The display name exceeded the allowed length.
    DisplayNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptySubject => write!(f, "subject must not be empty"),
            Self::SubjectTooLong { max } => {
                write!(f, "subject must be at most {max} characters")
            }
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidId`] for non-UUID input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID without further validation.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed length for an external subject identifier.
pub const SUBJECT_MAX: usize = 255;

/// Opaque subject identifier issued by the external auth provider.
///
/// The application never interprets its contents; it is only ever compared
/// for equality and used as the lookup key in the sign-in sync step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    /// Validate and construct a [`Subject`] from owned input.
    ///
    /// # Errors
    /// Returns a [`UserValidationError`] when empty or over-long.
    pub fn new(subject: impl Into<String>) -> Result<Self, UserValidationError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(UserValidationError::EmptySubject);
        }
        if subject.chars().count() > SUBJECT_MAX {
            return Err(UserValidationError::SubjectTooLong { max: SUBJECT_MAX });
        }
        Ok(Self(subject))
    }
}

impl AsRef<str> for Subject {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}

impl TryFrom<String> for Subject {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 50;

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    ///
    /// # Errors
    /// Returns a [`UserValidationError`] when empty or over-long.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// ## Invariants
/// - `subject` is unique across users and never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable internal identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// External auth-provider subject this row was synced from.
    #[schema(value_type = String, example = "auth0|64f1c2")]
    pub subject: Subject,
    /// Display name shown alongside posts and feedback.
    #[schema(value_type = String, example = "Ada Lovelace")]
    pub display_name: DisplayName,
    /// Public URL of the current avatar image, when one has been uploaded.
    pub avatar_url: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("auth0|abc123", true)]
    fn subject_rejects_blank_input(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(Subject::new(raw).is_ok(), ok);
    }

    #[test]
    fn subject_enforces_length_bound() {
        let long = "s".repeat(SUBJECT_MAX + 1);
        assert_eq!(
            Subject::new(long),
            Err(UserValidationError::SubjectTooLong { max: SUBJECT_MAX })
        );
    }

    #[rstest]
    #[case("Ada", true)]
    #[case("", false)]
    #[case(" \t ", false)]
    fn display_name_requires_visible_characters(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(DisplayName::new(raw).is_ok(), ok);
    }

    #[test]
    fn display_name_enforces_length_bound() {
        let max = "n".repeat(DISPLAY_NAME_MAX);
        assert!(DisplayName::new(max).is_ok());
        let over = "n".repeat(DISPLAY_NAME_MAX + 1);
        assert_eq!(
            DisplayName::new(over),
            Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX
            })
        );
    }

    #[test]
    fn user_id_parses_canonical_uuid_strings() {
        let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(UserId::new("not-a-uuid"), Err(UserValidationError::InvalidId));
    }
}
