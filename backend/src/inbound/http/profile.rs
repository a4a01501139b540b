//! Profile API handlers.
//!
//! ```text
//! GET  /api/profile                 (caller's own profile)
//! GET  /api/profile/{userId}
//! PUT  /api/profile {"displayName":"..."}
//! POST /api/profile/avatar          (raw image body)
//! ```

use actix_web::{get, post, put, web, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Profile, User, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{content_type, parse_uuid, FieldName};
use crate::inbound::http::{ApiResult, Data};

/// Request body for `PUT /api/profile`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// New display name, 1 to 50 characters after trimming.
    pub display_name: String,
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Own profile", body = Profile),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "ownProfile"
)]
#[get("/profile")]
pub async fn own_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Data<Profile>>> {
    let actor = state.require_actor(&session).await?;
    let profile = state.profiles.profile(Some(&actor), &actor.id).await?;
    Ok(web::Json(Data::new(profile)))
}

/// A user's public profile with aggregate counts.
#[utoipa::path(
    get,
    path = "/api/profile/{userId}",
    params(("userId" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getProfile",
    security([])
)]
#[get("/profile/{userId}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Data<Profile>>> {
    let viewer = state.viewer(&session).await?;
    let target = UserId::from_uuid(parse_uuid(&path, FieldName::new("userId"))?);
    let profile = state.profiles.profile(viewer.as_ref(), &target).await?;
    Ok(web::Json(Data::new(profile)))
}

/// Change the caller's display name.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid display name", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<Data<User>>> {
    let actor = state.require_actor(&session).await?;
    let updated = state
        .profiles
        .update_profile(&actor, &payload.display_name)
        .await?;
    Ok(web::Json(Data::new(updated)))
}

/// Replace the caller's avatar with the uploaded image.
#[utoipa::path(
    post,
    path = "/api/profile/avatar",
    request_body(content = [u8], content_type = "image/*"),
    responses(
        (status = 200, description = "User with new avatar URL", body = User),
        (status = 400, description = "Empty, oversized, or non-image body", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["profile"],
    operation_id = "uploadAvatar"
)]
#[post("/profile/avatar")]
pub async fn upload_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<Data<User>>> {
    let actor = state.require_actor(&session).await?;
    let content_type = content_type(&req)?;
    let updated = state
        .profiles
        .upload_avatar(&actor, &content_type, body.to_vec())
        .await?;
    Ok(web::Json(Data::new(updated)))
}
