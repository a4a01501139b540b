//! Post and feed API handlers.
//!
//! ```text
//! POST /api/uploads                     (raw image body)
//! POST /api/posts {"imageUrl":"...","caption":"..."}
//! GET  /api/posts?cursor&limit
//! GET  /api/posts/{postId}
//! DELETE /api/posts/{postId}
//! GET  /api/users/{userId}/posts?cursor&limit
//! ```

use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use pagination::Page;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, FeedEntry, Post, PostId, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    content_type, parse_cursor, parse_uuid, resolve_limit, FieldName,
};
use crate::inbound::http::{ApiResult, Data};

/// Default page size for windowed post reads.
pub const FEED_DEFAULT_LIMIT: i64 = 10;
/// Largest page size a client may request for post reads.
pub const FEED_MAX_LIMIT: i64 = 50;

/// Query parameters shared by the windowed post reads.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Opaque continuation cursor from a previous page.
    pub cursor: Option<String>,
    /// Requested page size, 1 to 50; defaults to 10.
    pub limit: Option<i64>,
}

/// Request body for `POST /api/posts`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    /// Public URL of the uploaded image, as returned by `POST /api/uploads`.
    pub image_url: String,
    /// Optional caption, at most 2200 characters.
    pub caption: Option<String>,
}

/// Response body for `POST /api/uploads`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Public URL of the stored image.
    pub url: String,
}

/// Store an uploaded image for later use as a post image.
#[utoipa::path(
    post,
    path = "/api/uploads",
    request_body(content = [u8], content_type = "image/*"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Empty, oversized, or non-image body", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "uploadImage"
)]
#[post("/uploads")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let actor = state.require_actor(&session).await?;
    let content_type = content_type(&req)?;
    let blob = state
        .feed
        .upload_image(&actor, &content_type, body.to_vec())
        .await?;
    Ok(HttpResponse::Created().json(Data::new(UploadResponse { url: blob.url })))
}

/// Create a post from an uploaded image.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.require_actor(&session).await?;
    let payload = payload.into_inner();
    let post = state
        .feed
        .create_post(&actor, &payload.image_url, payload.caption.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(Data::new(post)))
}

/// One page of the home feed, newest-first.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Feed page", body = [FeedEntry]),
        (status = 400, description = "Invalid cursor or limit", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "feed",
    security([])
)]
#[get("/posts")]
pub async fn feed(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Data<Page<FeedEntry>>>> {
    let viewer = state.viewer(&session).await?;
    let cursor = parse_cursor(query.cursor.as_deref())?;
    let limit = resolve_limit(query.limit, FEED_DEFAULT_LIMIT, FEED_MAX_LIMIT)?;
    let page = state.feed.feed(viewer.as_ref(), cursor, limit).await?;
    Ok(web::Json(Data::new(page)))
}

/// A single post with stats.
#[utoipa::path(
    get,
    path = "/api/posts/{postId}",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post", body = FeedEntry),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost",
    security([])
)]
#[get("/posts/{postId}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Data<FeedEntry>>> {
    let viewer = state.viewer(&session).await?;
    let post_id = PostId::from_uuid(parse_uuid(&path, FieldName::new("postId"))?);
    let entry = state.feed.get(viewer.as_ref(), &post_id).await?;
    Ok(web::Json(Data::new(entry)))
}

/// Delete one of the caller's posts.
#[utoipa::path(
    delete,
    path = "/api/posts/{postId}",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{postId}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = state.require_actor(&session).await?;
    let post_id = PostId::from_uuid(parse_uuid(&path, FieldName::new("postId"))?);
    state.feed.delete_post(&actor, &post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// One page of a user's posts, newest-first.
#[utoipa::path(
    get,
    path = "/api/users/{userId}/posts",
    params(
        ("userId" = String, Path, description = "User identifier"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Posts page", body = [Post]),
        (status = 400, description = "Invalid identifier, cursor, or limit", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["posts"],
    operation_id = "userPosts",
    security([])
)]
#[get("/users/{userId}/posts")]
pub async fn user_posts(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Data<Page<Post>>>> {
    let user_id = UserId::from_uuid(parse_uuid(&path, FieldName::new("userId"))?);
    let cursor = parse_cursor(query.cursor.as_deref())?;
    let limit = resolve_limit(query.limit, FEED_DEFAULT_LIMIT, FEED_MAX_LIMIT)?;
    let page = state.feed.posts_by_user(&user_id, cursor, limit).await?;
    Ok(web::Json(Data::new(page)))
}
