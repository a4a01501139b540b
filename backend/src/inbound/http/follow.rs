//! Follow API handlers.
//!
//! ```text
//! POST /api/follow/{userId}
//! GET  /api/follow/status/{userId}
//! ```

use actix_web::{get, post, web};

use crate::domain::{Error, FollowState, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::inbound::http::{ApiResult, Data};

/// Toggle the caller's follow of another user.
#[utoipa::path(
    post,
    path = "/api/follow/{userId}",
    params(("userId" = String, Path, description = "User to follow or unfollow")),
    responses(
        (status = 200, description = "New follow state", body = FollowState),
        (status = 400, description = "Invalid identifier or self-follow", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["follows"],
    operation_id = "toggleFollow"
)]
#[post("/follow/{userId}")]
pub async fn toggle_follow(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Data<FollowState>>> {
    let actor = state.require_actor(&session).await?;
    let target = UserId::from_uuid(parse_uuid(&path, FieldName::new("userId"))?);
    let follow = state.follows.toggle(&actor, &target).await?;
    Ok(web::Json(Data::new(follow)))
}

/// Whether the caller follows another user. Always false without a session.
#[utoipa::path(
    get,
    path = "/api/follow/status/{userId}",
    params(("userId" = String, Path, description = "User to check")),
    responses(
        (status = 200, description = "Follow state", body = FollowState),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["follows"],
    operation_id = "followStatus",
    security([])
)]
#[get("/follow/status/{userId}")]
pub async fn follow_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Data<FollowState>>> {
    let viewer = state.viewer(&session).await?;
    let target = UserId::from_uuid(parse_uuid(&path, FieldName::new("userId"))?);
    let follow = state.follows.status(viewer.as_ref(), &target).await;
    Ok(web::Json(Data::new(follow)))
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
                    .service(toggle_follow)
                    .service(follow_status),
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
    async fn follow_then_status_then_unfollow() {
        let world = TestWorld::new();
        let target = world.add_user("auth0|target", "Target").await;
        let app = test::init_service(app_for(&world)).await;
        let cookie = signed_in_cookie(&app, "auth0|follower").await;

        let on: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri(&format!("/api/follow/{id}", id = target.id))
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(on["data"]["isFollowing"].as_bool(), Some(true));

        let status: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri(&format!("/api/follow/status/{id}", id = target.id))
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(status["data"]["isFollowing"].as_bool(), Some(true));

        let off: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri(&format!("/api/follow/{id}", id = target.id))
                    .cookie(cookie)
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(off["data"]["isFollowing"].as_bool(), Some(false));
    }

    #[actix_web::test]
    async fn status_without_a_session_is_false() {
        let world = TestWorld::new();
        let target = world.add_user("auth0|target", "Target").await;
        let app = test::init_service(app_for(&world)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/follow/status/{id}", id = target.id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["isFollowing"].as_bool(), Some(false));
    }

    #[actix_web::test]
    async fn following_yourself_is_rejected() {
        let world = TestWorld::new();
        let app = test::init_service(app_for(&world)).await;
        let cookie = signed_in_cookie(&app, "auth0|narcissus").await;

        let me: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/auth/session")
                    .set_json(&SignInRequest {
                        subject: "auth0|narcissus".into(),
                        display_name: "Tester".into(),
                    })
                    .to_request(),
            )
            .await,
        )
        .await;
        let my_id = me["data"]["id"].as_str().expect("id").to_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/follow/{my_id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn toggling_requires_a_session() {
        let world = TestWorld::new();
        let target = world.add_user("auth0|target", "Target").await;
        let app = test::init_service(app_for(&world)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/follow/{id}", id = target.id))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
