//! Post data model and feed read models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::User;

/// Validation errors returned by the post value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// The identifier was not a UUID.
    InvalidId,
    /// The image URL was empty.
    EmptyImageUrl,
    /// The caption exceeded the allowed length.
    CaptionTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "post id must be a valid UUID"),
            Self::EmptyImageUrl => write!(f, "image url must not be empty"),
            Self::CaptionTooLong { max } => {
                write!(f, "caption must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Stable post identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(Uuid);

impl PostId {
    /// Validate and construct a [`PostId`] from string input.
    ///
    /// # Errors
    /// Returns [`PostValidationError::InvalidId`] for non-UUID input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, PostValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| PostValidationError::InvalidId)
    }

    /// Wrap an existing UUID without further validation.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`PostId`].
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

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed caption length in characters.
pub const CAPTION_MAX: usize = 2200;

/// Post caption, bounded at [`CAPTION_MAX`] characters.
///
/// Captions are optional on a post; a present caption may still be blank
/// (the bound is on length only, matching the write-path validation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Caption(String);

impl Caption {
    /// Validate and construct a [`Caption`] from owned input.
    ///
    /// # Errors
    /// Returns [`PostValidationError::CaptionTooLong`] past the bound.
    pub fn new(caption: impl Into<String>) -> Result<Self, PostValidationError> {
        let caption = caption.into();
        if caption.chars().count() > CAPTION_MAX {
            return Err(PostValidationError::CaptionTooLong { max: CAPTION_MAX });
        }
        Ok(Self(caption))
    }
}

impl AsRef<str> for Caption {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Caption> for String {
    fn from(value: Caption) -> Self {
        value.0
    }
}

impl TryFrom<String> for Caption {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public retrieval URL of a stored post image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Validate and construct an [`ImageUrl`] from owned input.
    ///
    /// # Errors
    /// Returns [`PostValidationError::EmptyImageUrl`] for blank input.
    pub fn new(url: impl Into<String>) -> Result<Self, PostValidationError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(PostValidationError::EmptyImageUrl);
        }
        Ok(Self(url))
    }
}

impl AsRef<str> for ImageUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ImageUrl> for String {
    fn from(value: ImageUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageUrl {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A single image post owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: PostId,
    /// Owning user.
    #[schema(value_type = String)]
    pub user_id: super::user::UserId,
    /// Public URL of the stored image.
    #[schema(value_type = String)]
    pub image_url: ImageUrl,
    /// Optional caption, at most [`CAPTION_MAX`] characters.
    #[schema(value_type = Option<String>)]
    pub caption: Option<Caption>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author and precomputed engagement counts.
///
/// Read model for the home feed and the post detail view; the counts come
/// from the `post_stats` aggregate view and default to zero when the view
/// has no row for the post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    /// The post itself.
    #[serde(flatten)]
    pub post: Post,
    /// Author row joined on `user_id`.
    pub author: User,
    /// Number of cheers on the post.
    pub likes_count: i64,
    /// Number of feedback entries on the post (replies included).
    pub comments_count: i64,
    /// Whether the requesting viewer has cheered the post. Always `false`
    /// for anonymous viewers.
    pub is_cheered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_accepts_the_boundary_length() {
        let at_bound = "c".repeat(CAPTION_MAX);
        assert!(Caption::new(at_bound).is_ok());
    }

    #[test]
    fn caption_rejects_one_past_the_boundary() {
        let over = "c".repeat(CAPTION_MAX + 1);
        assert_eq!(
            Caption::new(over),
            Err(PostValidationError::CaptionTooLong { max: CAPTION_MAX })
        );
    }

    #[test]
    fn image_url_must_not_be_blank() {
        assert_eq!(ImageUrl::new("  "), Err(PostValidationError::EmptyImageUrl));
        assert!(ImageUrl::new("https://cdn.example/u/1/pic.webp").is_ok());
    }
}
