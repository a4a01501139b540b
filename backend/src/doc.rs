//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for the
//! REST API: every inbound HTTP path, the domain schemas they reference, and
//! the session cookie security scheme. Swagger UI serves the document in
//! debug builds at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    CheerState, Error, Feedback, FeedbackThread, FeedbackWithAuthor, FeedEntry, FollowState, Post,
    Profile, User,
};
use crate::inbound::http::cheer::CheerCount;
use crate::inbound::http::feedback::{CreateFeedbackRequest, UpdateFeedbackRequest};
use crate::inbound::http::posts::{CreatePostRequest, UploadResponse};
use crate::inbound::http::profile::UpdateProfileRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/session.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cheerfeed backend API",
        description = "HTTP interface for posts, cheers, feedback, follows, and profiles."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::sign_in,
        crate::inbound::http::auth::sign_out,
        crate::inbound::http::posts::upload_image,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::feed,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::user_posts,
        crate::inbound::http::cheer::toggle_cheer,
        crate::inbound::http::cheer::cheer_count,
        crate::inbound::http::feedback::create_feedback,
        crate::inbound::http::feedback::list_feedback,
        crate::inbound::http::feedback::update_feedback,
        crate::inbound::http::feedback::delete_feedback,
        crate::inbound::http::follow::toggle_follow,
        crate::inbound::http::follow::follow_status,
        crate::inbound::http::profile::own_profile,
        crate::inbound::http::profile::get_profile,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::profile::upload_avatar,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Post,
        FeedEntry,
        Feedback,
        FeedbackWithAuthor,
        FeedbackThread,
        Profile,
        CheerState,
        FollowState,
        Error,
        CheerCount,
        CreatePostRequest,
        UploadResponse,
        CreateFeedbackRequest,
        UpdateFeedbackRequest,
        UpdateProfileRequest,
    )),
    tags(
        (name = "auth", description = "Session establishment and teardown"),
        (name = "posts", description = "Posts, the home feed, and image uploads"),
        (name = "cheers", description = "Cheer toggles and counts"),
        (name = "feedback", description = "Threaded feedback on posts"),
        (name = "follows", description = "Follow relationships"),
        (name = "profile", description = "User profiles and avatars"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
