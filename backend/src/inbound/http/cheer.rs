//! Cheer API handlers.
//!
//! ```text
//! POST /api/posts/{postId}/cheer
//! GET  /api/posts/{postId}/cheer/count
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::Serialize;

use crate::domain::{CheerState, Error, PostId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::inbound::http::{ApiResult, Data};

/// Response body for the cheer count read.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheerCount {
    /// Total cheers on the post.
    pub count: i64,
}

/// Toggle the caller's cheer on a post.
#[utoipa::path(
    post,
    path = "/api/posts/{postId}/cheer",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "New cheer state", body = CheerState),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Post not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cheers"],
    operation_id = "toggleCheer"
)]
#[post("/posts/{postId}/cheer")]
pub async fn toggle_cheer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Data<CheerState>>> {
    let actor = state.require_actor(&session).await?;
    let post_id = PostId::from_uuid(parse_uuid(&path, FieldName::new("postId"))?);
    let cheer = state.cheers.toggle(&actor, &post_id).await?;
    Ok(web::Json(Data::new(cheer)))
}

/// Current cheer count for a post.
#[utoipa::path(
    get,
    path = "/api/posts/{postId}/cheer/count",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Cheer count", body = CheerCount),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cheers"],
    operation_id = "cheerCount",
    security([])
)]
#[get("/posts/{postId}/cheer/count")]
pub async fn cheer_count(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let post_id = PostId::from_uuid(parse_uuid(&path, FieldName::new("postId"))?);
    let count = state.cheers.count(&post_id).await?;
    Ok(HttpResponse::Ok().json(Data::new(CheerCount { count })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::auth::{sign_in, SignInRequest};
    use crate::inbound::http::test_utils::{test_session_middleware, test_state};
    use crate::test_support::TestWorld;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    fn app_for(
        world: &TestWorld,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(test_state(world)))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api")
                    .service(sign_in)
                    .service(toggle_cheer)
                    .service(cheer_count),
            )
    }

    async fn signed_in_cookie<S>(app: &S, subject: &str) -> Cookie<'static>
    where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/auth/session")
                .set_json(&SignInRequest {
                    subject: subject.into(),
                    display_name: "Tester".into(),
                })
                .to_request(),
        )
        .await;
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn toggling_twice_returns_to_zero() {
        let world = TestWorld::new();
        let author = world.add_user("auth0|author", "Author").await;
        let post = world.add_post(&author, "https://cdn.example/a.webp").await;
        let app = test::init_service(app_for(&world)).await;
        let cookie = signed_in_cookie(&app, "auth0|fan").await;
        let uri = format!("/api/posts/{id}/cheer", id = post.id);

        let on: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri(&uri)
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(on["data"]["isCheered"].as_bool(), Some(true));
        assert_eq!(on["data"]["count"].as_i64(), Some(1));

        let off: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri(&uri)
                    .cookie(cookie)
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(off["data"]["isCheered"].as_bool(), Some(false));
        assert_eq!(off["data"]["count"].as_i64(), Some(0));
    }

    #[actix_web::test]
    async fn counts_are_public() {
        let world = TestWorld::new();
        let author = world.add_user("auth0|author", "Author").await;
        let post = world.add_post(&author, "https://cdn.example/a.webp").await;
        let app = test::init_service(app_for(&world)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/posts/{id}/cheer/count", id = post.id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["count"].as_i64(), Some(0));
    }

    #[actix_web::test]
    async fn toggling_requires_a_session() {
        let world = TestWorld::new();
        let author = world.add_user("auth0|author", "Author").await;
        let post = world.add_post(&author, "https://cdn.example/a.webp").await;
        let app = test::init_service(app_for(&world)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/posts/{id}/cheer", id = post.id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn cheering_a_missing_post_is_not_found() {
        let world = TestWorld::new();
        let app = test::init_service(app_for(&world)).await;
        let cookie = signed_in_cookie(&app, "auth0|fan").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/posts/{}/cheer", uuid::Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
