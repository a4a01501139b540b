//! Feedback API handlers.
//!
//! ```text
//! POST /api/posts/{postId}/feedback {"content":"...","parentId":"..."}
//! GET  /api/posts/{postId}/feedback?limit
//! PUT  /api/feedback/{feedbackId} {"content":"..."}
//! DELETE /api/feedback/{feedbackId}
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, FeedbackId, FeedbackThread, FeedbackWithAuthor, PostId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, resolve_limit, FieldName};
use crate::inbound::http::{ApiResult, Data};

/// Default number of top-level feedback entries per read.
pub const FEEDBACK_DEFAULT_LIMIT: i64 = 10;
/// Largest number of top-level feedback entries a client may request.
pub const FEEDBACK_MAX_LIMIT: i64 = 100;

/// Request body for creating feedback on a post.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    /// Feedback text, 1 to 1000 characters after trimming.
    pub content: String,
    /// Identifier of the top-level entry being replied to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Request body for editing feedback.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeedbackRequest {
    /// Replacement text, 1 to 1000 characters after trimming.
    pub content: String,
}

/// Query parameters for the feedback listing.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQuery {
    /// Requested number of top-level entries, 1 to 100; defaults to 10.
    pub limit: Option<i64>,
}

/// Leave feedback on a post, optionally as a reply to a top-level entry.
#[utoipa::path(
    post,
    path = "/api/posts/{postId}/feedback",
    params(("postId" = String, Path, description = "Post identifier")),
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback created", body = FeedbackWithAuthor),
        (status = 400, description = "Invalid content or nesting", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Post or parent not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "createFeedback"
)]
#[post("/posts/{postId}/feedback")]
pub async fn create_feedback(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CreateFeedbackRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.require_actor(&session).await?;
    let post_id = PostId::from_uuid(parse_uuid(&path, FieldName::new("postId"))?);
    let payload = payload.into_inner();
    let parent_id = payload
        .parent_id
        .as_deref()
        .map(|raw| parse_uuid(raw, FieldName::new("parentId")).map(FeedbackId::from_uuid))
        .transpose()?;
    let created = state
        .feedback
        .create(&actor, &post_id, &payload.content, parent_id)
        .await?;
    Ok(HttpResponse::Created().json(Data::new(created)))
}

/// Threaded feedback for a post, newest top-level entries first.
#[utoipa::path(
    get,
    path = "/api/posts/{postId}/feedback",
    params(
        ("postId" = String, Path, description = "Post identifier"),
        FeedbackQuery
    ),
    responses(
        (status = 200, description = "Feedback threads", body = [FeedbackThread]),
        (status = 400, description = "Invalid identifier or limit", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "listFeedback",
    security([])
)]
#[get("/posts/{postId}/feedback")]
pub async fn list_feedback(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<FeedbackQuery>,
) -> ApiResult<web::Json<Data<Vec<FeedbackThread>>>> {
    let post_id = PostId::from_uuid(parse_uuid(&path, FieldName::new("postId"))?);
    let limit = resolve_limit(query.limit, FEEDBACK_DEFAULT_LIMIT, FEEDBACK_MAX_LIMIT)?;
    let threads = state.feedback.list(&post_id, limit).await;
    Ok(web::Json(Data::new(threads)))
}

/// Edit the caller's own feedback.
#[utoipa::path(
    put,
    path = "/api/feedback/{feedbackId}",
    params(("feedbackId" = String, Path, description = "Feedback identifier")),
    request_body = UpdateFeedbackRequest,
    responses(
        (status = 200, description = "Feedback updated", body = FeedbackWithAuthor),
        (status = 400, description = "Invalid content", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "updateFeedback"
)]
#[put("/feedback/{feedbackId}")]
pub async fn update_feedback(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateFeedbackRequest>,
) -> ApiResult<web::Json<Data<FeedbackWithAuthor>>> {
    let actor = state.require_actor(&session).await?;
    let feedback_id = FeedbackId::from_uuid(parse_uuid(&path, FieldName::new("feedbackId"))?);
    let updated = state
        .feedback
        .update(&actor, &feedback_id, &payload.content)
        .await?;
    Ok(web::Json(Data::new(updated)))
}

/// Delete the caller's own feedback; replies go with it.
#[utoipa::path(
    delete,
    path = "/api/feedback/{feedbackId}",
    params(("feedbackId" = String, Path, description = "Feedback identifier")),
    responses(
        (status = 204, description = "Feedback deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["feedback"],
    operation_id = "deleteFeedback"
)]
#[delete("/feedback/{feedbackId}")]
pub async fn delete_feedback(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = state.require_actor(&session).await?;
    let feedback_id = FeedbackId::from_uuid(parse_uuid(&path, FieldName::new("feedbackId"))?);
    state.feedback.delete(&actor, &feedback_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
