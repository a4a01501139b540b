//! Follow toggle and status operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::{
    FollowPersistenceError, FollowRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, User, UserId};

/// Result of a follow toggle or status read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowState {
    /// Whether the acting user now follows the target.
    pub is_following: bool,
}

/// Toggle-state primitive over the follows relation.
#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_follow_error(error: FollowPersistenceError) -> Error {
    match error {
        FollowPersistenceError::Connection { message } => Error::service_unavailable(message),
        FollowPersistenceError::Query { message } => Error::internal(message),
    }
}

impl FollowService {
    /// Create the service over its repositories.
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    /// Flip the actor's follow membership on a target user.
    ///
    /// Self-follow is rejected before any storage access.
    ///
    /// # Errors
    /// `invalid_request` for self-follow, `not_found` for an unknown target,
    /// plus repository failures mapped to their domain codes.
    pub async fn toggle(&self, actor: &User, target: &UserId) -> Result<FollowState, Error> {
        if actor.id == *target {
            return Err(Error::invalid_request("you cannot follow yourself"));
        }

        self.users
            .find_by_id(target)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let present = self
            .follows
            .exists(&actor.id, target)
            .await
            .map_err(map_follow_error)?;

        let is_following = if present {
            self.follows
                .remove(&actor.id, target)
                .await
                .map_err(map_follow_error)?;
            false
        } else {
            self.follows
                .insert(&actor.id, target)
                .await
                .map_err(map_follow_error)?;
            true
        };

        Ok(FollowState { is_following })
    }

    /// Whether the viewer follows the target.
    ///
    /// Anonymous viewers and self-lookups report `false`; so does a failed
    /// relationship read, since status is decorative data on a profile and
    /// not worth failing the page for.
    pub async fn status(&self, viewer: Option<&User>, target: &UserId) -> FollowState {
        let Some(viewer) = viewer else {
            return FollowState {
                is_following: false,
            };
        };
        if viewer.id == *target {
            return FollowState {
                is_following: false,
            };
        }

        let is_following = match self.follows.exists(&viewer.id, target).await {
            Ok(present) => present,
            Err(error) => {
                warn!(%error, %target, "follow status read failed; reporting not-following");
                false
            }
        };
        FollowState { is_following }
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
        let actor = world.add_user("auth|a", "Actor").await;
        let target = world.add_user("auth|b", "Target").await;
        let service = FollowService::new(world.users.clone(), world.follows.clone());

        let first = service.toggle(&actor, &target.id).await.expect("follow");
        assert!(first.is_following);
        let second = service.toggle(&actor, &target.id).await.expect("unfollow");
        assert!(!second.is_following);
    }

    #[tokio::test]
    async fn self_follow_is_always_rejected() {
        let world = TestWorld::new();
        let actor = world.add_user("auth|a", "Actor").await;
        let service = FollowService::new(world.users.clone(), world.follows.clone());

        let error = service
            .toggle(&actor, &actor.id)
            .await
            .expect_err("self-follow");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);

        // Still rejected when a (corrupt) relationship row exists.
        world.follows.sneak_insert(&actor.id, &actor.id);
        let error = service
            .toggle(&actor, &actor.id)
            .await
            .expect_err("self-follow with row present");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn following_an_unknown_user_is_not_found() {
        let world = TestWorld::new();
        let actor = world.add_user("auth|a", "Actor").await;
        let service = FollowService::new(world.users.clone(), world.follows.clone());

        let error = service
            .toggle(&actor, &UserId::random())
            .await
            .expect_err("unknown target");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn status_degrades_to_false_for_anonymous_self_and_failures() {
        let world = TestWorld::new();
        let actor = world.add_user("auth|a", "Actor").await;
        let target = world.add_user("auth|b", "Target").await;
        let service = FollowService::new(world.users.clone(), world.follows.clone());

        assert!(!service.status(None, &target.id).await.is_following);
        assert!(!service.status(Some(&actor), &actor.id).await.is_following);

        service.toggle(&actor, &target.id).await.expect("follow");
        assert!(service.status(Some(&actor), &target.id).await.is_following);

        world.follows.fail_with_query();
        assert!(!service.status(Some(&actor), &target.id).await.is_following);
    }
}
