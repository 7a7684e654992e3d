//! Connectivity test route.
//!
//! Every method on `/api/test` and any path below it answers with a fixed
//! message, so clients can check they reach the API through proxies.

use actix_web::{HttpResponse, Scope, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Path prefix served by the test route.
pub const TEST_ROUTE_PREFIX: &str = "/api/test";
const TEST_ROUTE_MESSAGE: &str = "Test endpoint is working!";

/// Test route reply.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestReply {
    pub message: String,
}

/// Answer the test route.
#[utoipa::path(
    get,
    path = "/api/test",
    tags = ["info"],
    responses((status = 200, description = "Test route reachable", body = TestReply))
)]
pub async fn test_route() -> HttpResponse {
    HttpResponse::Ok().json(TestReply {
        message: TEST_ROUTE_MESSAGE.to_owned(),
    })
}

/// Scope serving [`test_route`] for any method and sub-path.
#[must_use]
pub fn scope() -> Scope {
    web::scope(TEST_ROUTE_PREFIX).default_service(web::to(test_route))
}
