//! Domain primitives, aggregates, and use-case services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, the ports those layers implement, and the services
//! that carry the use-case logic. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Services take the acting user explicitly rather than reading ambient
//! request state; resolving a session to a [`User`] happens once at the
//! HTTP boundary.

pub mod cheer_service;
pub mod error;
pub mod feed_service;
pub mod feedback;
pub mod feedback_service;
pub mod follow_service;
pub mod identity;
pub mod optimistic;
pub mod ports;
pub mod post;
pub mod profile;
pub mod profile_service;
pub mod trace_id;
pub mod user;

pub use self::cheer_service::{CheerService, CheerState};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed_service::FeedService;
pub use self::feedback::{
    Feedback, FeedbackContent, FeedbackId, FeedbackThread, FeedbackValidationError,
    FeedbackWithAuthor,
};
pub use self::feedback_service::FeedbackService;
pub use self::follow_service::{FollowService, FollowState};
pub use self::identity::IdentityService;
pub use self::post::{Caption, FeedEntry, ImageUrl, Post, PostId, PostValidationError};
pub use self::profile::Profile;
pub use self::profile_service::{ProfileService, AVATAR_MAX_BYTES};
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};
pub use self::user::{DisplayName, Subject, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use cheerfeed_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
