//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
    SessionMiddleware,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};

use crate::domain::ports::UPLOAD_MAX_BYTES;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::auth::{sign_in, sign_out};
use crate::inbound::http::cheer::{cheer_count, toggle_cheer};
use crate::inbound::http::feedback::{
    create_feedback, delete_feedback, list_feedback, update_feedback,
};
use crate::inbound::http::follow::{follow_status, toggle_follow};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::posts::{
    create_post, delete_post, feed, get_post, upload_image, user_posts,
};
use crate::inbound::http::profile::{get_profile, own_profile, update_profile, upload_avatar};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .service(sign_in)
        .service(sign_out)
        .service(upload_image)
        .service(create_post)
        .service(feed)
        .service(get_post)
        .service(delete_post)
        .service(user_posts)
        .service(toggle_cheer)
        .service(cheer_count)
        .service(create_feedback)
        .service(list_feedback)
        .service(update_feedback)
        .service(delete_feedback)
        .service(toggle_follow)
        .service(follow_status)
        .service(own_profile)
        .service(get_profile)
        .service(update_profile)
        .service(upload_avatar);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        // Raw image uploads exceed the default payload cap.
        .app_data(web::PayloadConfig::new(UPLOAD_MAX_BYTES + 1024))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the given configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
