//! Cheer toggle and count operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    CheerPersistenceError, CheerRepository, PostPersistenceError, PostRepository,
};
use crate::domain::{Error, PostId, User};

/// Result of a cheer toggle or count read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheerState {
    /// Whether the acting user now cheers the post.
    pub is_cheered: bool,
    /// Total cheers on the post after the operation.
    pub count: i64,
}

/// Toggle-state primitive over the likes relation.
///
/// The membership flip is read-then-write: check existence, then insert or
/// delete. Two concurrent flips can both observe "absent"; the storage
/// layer's unique constraint resolves the race and the adapter reports the
/// loser's insert as already-present, which lands in the same PRESENT state.
#[derive(Clone)]
pub struct CheerService {
    posts: Arc<dyn PostRepository>,
    cheers: Arc<dyn CheerRepository>,
}

fn map_post_error(error: PostPersistenceError) -> Error {
    match error {
        PostPersistenceError::Connection { message } => Error::service_unavailable(message),
        PostPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_cheer_error(error: CheerPersistenceError) -> Error {
    match error {
        CheerPersistenceError::Connection { message } => Error::service_unavailable(message),
        CheerPersistenceError::Query { message } => Error::internal(message),
    }
}

impl CheerService {
    /// Create the service over its repositories.
    pub fn new(posts: Arc<dyn PostRepository>, cheers: Arc<dyn CheerRepository>) -> Self {
        Self { posts, cheers }
    }

    /// Flip the actor's cheer membership on a post.
    ///
    /// # Errors
    /// `not_found` when the post does not exist; repository failures map to
    /// their domain codes.
    pub async fn toggle(&self, actor: &User, post_id: &PostId) -> Result<CheerState, Error> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found("post not found"))?;

        let present = self
            .cheers
            .exists(post_id, &actor.id)
            .await
            .map_err(map_cheer_error)?;

        let is_cheered = if present {
            self.cheers
                .remove(post_id, &actor.id)
                .await
                .map_err(map_cheer_error)?;
            false
        } else {
            // Both insert outcomes end in the PRESENT state.
            self.cheers
                .insert(post_id, &actor.id)
                .await
                .map_err(map_cheer_error)?;
            true
        };

        let count = self.cheers.count(post_id).await.map_err(map_cheer_error)?;
        Ok(CheerState { is_cheered, count })
    }

    /// Total cheers on a post. Public: no actor required.
    ///
    /// # Errors
    /// Propagates repository failures as domain errors.
    pub async fn count(&self, post_id: &PostId) -> Result<i64, Error> {
        self.cheers.count(post_id).await.map_err(map_cheer_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::TestWorld;

    #[tokio::test]
    async fn toggle_alternates_between_present_and_absent() {
        let world = TestWorld::new();
        let author = world.add_user("auth|a", "Author").await;
        let fan = world.add_user("auth|b", "Fan").await;
        let post = world.add_post(&author, "https://cdn.example/p.webp").await;
        let service = CheerService::new(world.posts.clone(), world.cheers.clone());

        let first = service.toggle(&fan, &post.id).await.expect("first toggle");
        assert_eq!(
            first,
            CheerState {
                is_cheered: true,
                count: 1
            }
        );

        let second = service.toggle(&fan, &post.id).await.expect("second toggle");
        assert_eq!(
            second,
            CheerState {
                is_cheered: false,
                count: 0
            }
        );
    }

    #[tokio::test]
    async fn toggling_a_missing_post_is_not_found() {
        let world = TestWorld::new();
        let fan = world.add_user("auth|b", "Fan").await;
        let service = CheerService::new(world.posts.clone(), world.cheers.clone());

        let error = service
            .toggle(&fan, &PostId::random())
            .await
            .expect_err("missing post");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn conflicting_insert_still_reports_present() {
        let world = TestWorld::new();
        let author = world.add_user("auth|a", "Author").await;
        let fan = world.add_user("auth|b", "Fan").await;
        let post = world.add_post(&author, "https://cdn.example/p.webp").await;
        let service = CheerService::new(world.posts.clone(), world.cheers.clone());

        // A concurrent toggle already inserted the row between this call's
        // existence check and its insert.
        world.cheers.sneak_insert(&post.id, &fan.id);
        world.cheers.force_absent_on_next_exists();

        let state = service.toggle(&fan, &post.id).await.expect("toggle");
        assert!(state.is_cheered);
        assert_eq!(state.count, 1);
    }
}
