//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_store;
mod cheer_repository;
mod feedback_repository;
mod follow_repository;
mod post_repository;
mod stats_query;
mod user_repository;

pub use blob_store::{
    image_extension, BlobStore, BlobStoreError, StoredBlob, ALLOWED_IMAGE_TYPES, UPLOAD_MAX_BYTES,
};
pub use cheer_repository::{CheerPersistenceError, CheerRepository, InsertOutcome};
pub use feedback_repository::{FeedbackPersistenceError, FeedbackRepository, NewFeedback};
pub use follow_repository::{FollowPersistenceError, FollowRepository};
pub use post_repository::{NewPost, PostPersistenceError, PostRepository};
pub use stats_query::{StatsPersistenceError, UserStatsQuery, UserStatsRecord};
pub use user_repository::{UserPersistenceError, UserRepository};
