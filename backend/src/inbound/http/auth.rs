//! Session establishment and teardown.
//!
//! ```text
//! POST /api/auth/session {"subject":"auth0|64f1c2","displayName":"Ada"}
//! DELETE /api/auth/session
//! ```
//!
//! Authentication itself lives with the external provider; this endpoint
//! trusts the already-verified subject handed over by the frontend, syncs
//! the user row, and issues the session cookie.

use actix_web::{delete, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{DisplayName, Error, Subject, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, Data};

/// Request body for `POST /api/auth/session`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Verified subject identifier from the auth provider.
    pub subject: String,
    /// Display name to create or refresh the user row with.
    pub display_name: String,
}

/// Sync the user row for a verified subject and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/session",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Session established", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/session")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignInRequest>,
) -> ApiResult<web::Json<Data<User>>> {
    let payload = payload.into_inner();
    let subject = Subject::new(payload.subject).map_err(|error| {
        Error::invalid_request(error.to_string()).with_details(json!({ "field": "subject" }))
    })?;
    let display_name = DisplayName::new(payload.display_name).map_err(|error| {
        Error::invalid_request(error.to_string()).with_details(json!({ "field": "displayName" }))
    })?;

    let user = state.identity.sync(&subject, &display_name).await?;
    session.persist_subject(&subject)?;
    Ok(web::Json(Data::new(user)))
}

/// Drop the session.
#[utoipa::path(
    delete,
    path = "/api/auth/session",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[delete("/auth/session")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}
