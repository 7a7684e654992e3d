//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint and its reply schemas. Swagger
//! UI serves it at `/api/docs` in development, and
//! `cargo run --bin openapi-dump` exports it for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::api_info::ApiInfo;
use crate::inbound::http::health::{DatabaseStatus, HealthReport, HealthStatus, MemoryUsage};
use crate::inbound::http::probe::TestReply;

/// Path of the generated OpenAPI JSON document.
pub const OPENAPI_JSON_PATH: &str = "/api/docs/openapi.json";

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Starter backend API",
        description = "Health, API information and connectivity test endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::health,
        crate::inbound::http::api_info::api_info,
        crate::inbound::http::probe::test_route,
    ),
    components(schemas(
        HealthReport,
        HealthStatus,
        DatabaseStatus,
        MemoryUsage,
        ApiInfo,
        TestReply
    )),
    tags(
        (name = "health", description = "Endpoints for health checks"),
        (name = "info", description = "API description and connectivity checks")
    )
)]
pub struct ApiDoc;
