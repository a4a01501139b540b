//! Feedback (threaded comment) data model and thread assembly.
//!
//! Feedback is threaded one level deep: a top-level entry may carry replies,
//! and replies may not themselves be replied to. The depth bound is enforced
//! at write time so the two-level assembler below is total over stored data.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::post::PostId;
use super::user::{User, UserId};

/// Validation errors returned by the feedback value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackValidationError {
    /// The identifier was not a UUID.
    InvalidId,
    /// The content was empty once trimmed.
    EmptyContent,
    /// The content exceeded the allowed length.
    ContentTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
}

impl fmt::Display for FeedbackValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "feedback id must be a valid UUID"),
            Self::EmptyContent => write!(f, "feedback content must not be empty"),
            Self::ContentTooLong { max } => {
                write!(f, "feedback content must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for FeedbackValidationError {}

/// Stable feedback identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(Uuid);

impl FeedbackId {
    /// Validate and construct a [`FeedbackId`] from string input.
    ///
    /// # Errors
    /// Returns [`FeedbackValidationError::InvalidId`] for non-UUID input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, FeedbackValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| FeedbackValidationError::InvalidId)
    }

    /// Wrap an existing UUID without further validation.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`FeedbackId`].
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

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum allowed feedback content length in characters.
pub const CONTENT_MAX: usize = 1000;

/// Feedback body text, trimmed on construction and bounded at
/// [`CONTENT_MAX`] characters.
///
/// The length bound applies to the input as supplied; trimming happens
/// after the check so a 1000-character comment padded with whitespace is
/// still rejected the way the write path always has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedbackContent(String);

impl FeedbackContent {
    /// Validate and construct [`FeedbackContent`] from owned input.
    ///
    /// # Errors
    /// Returns a [`FeedbackValidationError`] for blank or over-long input.
    pub fn new(content: impl Into<String>) -> Result<Self, FeedbackValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(FeedbackValidationError::EmptyContent);
        }
        if content.chars().count() > CONTENT_MAX {
            return Err(FeedbackValidationError::ContentTooLong { max: CONTENT_MAX });
        }
        Ok(Self(content.trim().to_owned()))
    }
}

impl AsRef<str> for FeedbackContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FeedbackContent> for String {
    fn from(value: FeedbackContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for FeedbackContent {
    type Error = FeedbackValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A single feedback entry on a post.
///
/// ## Invariants
/// - `parent_id == None` marks a top-level entry; `Some` marks a reply.
/// - A reply's parent belongs to the same post and is itself top-level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Stable identifier.
    #[schema(value_type = String)]
    pub id: FeedbackId,
    /// Post this entry belongs to.
    #[schema(value_type = String)]
    pub post_id: PostId,
    /// Authoring user.
    #[schema(value_type = String)]
    pub user_id: UserId,
    /// Body text.
    #[schema(value_type = String)]
    pub content: FeedbackContent,
    /// Parent entry when this is a reply.
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<FeedbackId>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Feedback entry joined with its author row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackWithAuthor {
    /// The feedback entry.
    #[serde(flatten)]
    pub feedback: Feedback,
    /// Author row joined on `user_id`.
    pub author: User,
}

/// A top-level feedback entry with its attached replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackThread {
    /// The top-level entry and its author.
    #[serde(flatten)]
    pub entry: FeedbackWithAuthor,
    /// Direct replies, oldest-first.
    pub replies: Vec<FeedbackWithAuthor>,
    /// Length of `replies`.
    pub replies_count: usize,
}

/// Group replies by their parent identifier, preserving input order.
///
/// Replies arrive oldest-first from the second fetch; grouping keeps that
/// order within each bucket.
#[must_use]
pub fn group_replies(
    replies: Vec<FeedbackWithAuthor>,
) -> HashMap<FeedbackId, Vec<FeedbackWithAuthor>> {
    let mut grouped: HashMap<FeedbackId, Vec<FeedbackWithAuthor>> = HashMap::new();
    for reply in replies {
        let Some(parent_id) = reply.feedback.parent_id else {
            // Top-level rows have no place in a reply grouping; skip rather
            // than misfile them under a synthetic key.
            continue;
        };
        grouped.entry(parent_id).or_default().push(reply);
    }
    grouped
}

/// Merge top-level entries with their grouped replies into threads.
///
/// `top_level` keeps its input order (newest-first from the first fetch);
/// entries without replies get an empty list and a zero count.
#[must_use]
pub fn assemble_threads(
    top_level: Vec<FeedbackWithAuthor>,
    replies: Vec<FeedbackWithAuthor>,
) -> Vec<FeedbackThread> {
    let mut grouped = group_replies(replies);
    top_level
        .into_iter()
        .map(|entry| {
            let replies = grouped.remove(&entry.feedback.id).unwrap_or_default();
            let replies_count = replies.len();
            FeedbackThread {
                entry,
                replies,
                replies_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().expect("valid ts")
    }

    fn author() -> User {
        User {
            id: UserId::random(),
            subject: crate::domain::Subject::new("auth|tester").expect("subject"),
            display_name: crate::domain::DisplayName::new("Tester").expect("name"),
            avatar_url: None,
            created_at: ts(0),
        }
    }

    fn entry(
        id: FeedbackId,
        post_id: PostId,
        parent_id: Option<FeedbackId>,
        seconds: i64,
    ) -> FeedbackWithAuthor {
        FeedbackWithAuthor {
            feedback: Feedback {
                id,
                post_id,
                user_id: UserId::random(),
                content: FeedbackContent::new("hello").expect("content"),
                parent_id,
                created_at: ts(seconds),
                updated_at: ts(seconds),
            },
            author: author(),
        }
    }

    #[rstest]
    #[case(CONTENT_MAX, true)]
    #[case(CONTENT_MAX + 1, false)]
    fn content_length_boundary(#[case] len: usize, #[case] ok: bool) {
        let content = "x".repeat(len);
        assert_eq!(FeedbackContent::new(content).is_ok(), ok);
    }

    #[test]
    fn content_is_stored_trimmed() {
        let content = FeedbackContent::new("  trimmed  ").expect("content");
        assert_eq!(content.as_ref(), "trimmed");
    }

    #[test]
    fn blank_content_is_rejected() {
        assert_eq!(
            FeedbackContent::new("   \n "),
            Err(FeedbackValidationError::EmptyContent)
        );
    }

    #[test]
    fn threads_keep_top_level_order_and_attach_replies() {
        // C1 (top-level), C2 (reply to C1), C3 (top-level); top-level rows
        // arrive newest-first, so the input is [C3, C1].
        let post = PostId::random();
        let c1 = FeedbackId::random();
        let c3 = FeedbackId::random();
        let top = vec![entry(c3, post, None, 30), entry(c1, post, None, 10)];
        let replies = vec![entry(FeedbackId::random(), post, Some(c1), 20)];

        let threads = assemble_threads(top, replies);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].entry.feedback.id, c3);
        assert!(threads[0].replies.is_empty());
        assert_eq!(threads[0].replies_count, 0);
        assert_eq!(threads[1].entry.feedback.id, c1);
        assert_eq!(threads[1].replies.len(), 1);
        assert_eq!(threads[1].replies_count, 1);
        assert_eq!(threads[1].replies[0].feedback.parent_id, Some(c1));
    }

    #[test]
    fn reply_groups_preserve_oldest_first_order() {
        let post = PostId::random();
        let parent = FeedbackId::random();
        let first = entry(FeedbackId::random(), post, Some(parent), 1);
        let second = entry(FeedbackId::random(), post, Some(parent), 2);
        let expected = vec![first.feedback.id, second.feedback.id];

        let grouped = group_replies(vec![first, second]);

        let bucket = grouped.get(&parent).expect("bucket for parent");
        let ids: Vec<_> = bucket.iter().map(|r| r.feedback.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn stray_top_level_rows_are_dropped_from_grouping() {
        let post = PostId::random();
        let grouped = group_replies(vec![entry(FeedbackId::random(), post, None, 1)]);
        assert!(grouped.is_empty());
    }
}
