//! Server construction and middleware wiring.

mod config;
pub mod shutdown;

pub use config::ServerConfig;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Environment;
use crate::doc::{ApiDoc, OPENAPI_JSON_PATH};
use crate::inbound::http::api_info::api_info;
use crate::inbound::http::body_limits::{form_config, json_config};
use crate::inbound::http::health::health;
use crate::inbound::http::not_found::not_found;
use crate::inbound::http::probe;
use crate::inbound::http::state::HttpState;
use crate::middleware::{ErrorSink, Trace, cors, security_headers};

const SESSION_COOKIE_NAME: &str = "session";
const SESSION_TTL_HOURS: i64 = 24;

/// Per-worker inputs for [`build_app`].
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub environment: Environment,
}

fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.into())
        .cookie_path("/".into())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}

/// Assemble the application: middleware stack, routes and catch-all.
///
/// Middleware, outermost first: trace, security headers, CORS, session,
/// error sink. Body limits apply through extractor configuration.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        environment,
    } = deps;
    let docs_enabled = environment.is_development();

    let app = App::new()
        .app_data(http_state)
        .app_data(json_config())
        .app_data(form_config())
        .wrap(ErrorSink::new(environment.clone()))
        .wrap(session_middleware(key))
        .wrap(cors())
        .wrap(security_headers())
        .wrap(Trace::for_environment(&environment))
        .service(health)
        .service(api_info)
        .service(probe::scope());

    let app = if docs_enabled {
        app.service(SwaggerUi::new("/api/docs/{_:.*}").url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
    } else {
        app
    };

    app.default_service(web::to(not_found))
}

/// Bind and start the HTTP server.
///
/// OS signals are not handled by Actix; [`shutdown`] owns the shutdown
/// sequence so the database can be closed after the listener stops.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(http_state: web::Data<HttpState>, config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        bind_addr,
        environment,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            environment: environment.clone(),
        })
    })
    .disable_signals()
    .shutdown_timeout(shutdown::GRACE_PERIOD.as_secs())
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "server listening");
    Ok(server)
}
