//! Test helpers for inbound HTTP components.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;

use crate::domain::{
    CheerService, FeedService, FeedbackService, FollowService, IdentityService, ProfileService,
};
use crate::inbound::http::state::HttpState;
use crate::test_support::TestWorld;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build handler state over a world of in-memory repositories.
pub fn test_state(world: &TestWorld) -> HttpState {
    HttpState {
        identity: IdentityService::new(world.users.clone()),
        feed: FeedService::new(
            world.posts.clone(),
            world.cheers.clone(),
            world.blobs.clone(),
        ),
        cheers: CheerService::new(world.posts.clone(), world.cheers.clone()),
        feedback: FeedbackService::new(world.posts.clone(), world.feedback.clone()),
        follows: FollowService::new(world.users.clone(), world.follows.clone()),
        profiles: ProfileService::new(
            world.users.clone(),
            world.follows.clone(),
            world.stats.clone(),
            world.blobs.clone(),
        ),
    }
}
