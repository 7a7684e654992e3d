//! API information endpoint.

use std::collections::BTreeMap;

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::state::{APP_VERSION, HttpState};

const API_NAME: &str = env!("CARGO_PKG_NAME");
const API_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
const API_INFO_MESSAGE: &str = "API Information";
const DOCUMENTATION_CONTACT: &str = "Contact the API maintainers for documentation access";

/// Routes advertised by the API information endpoint, keyed by name.
pub const ENDPOINTS: [(&str, &str); 3] = [
    ("health", "GET /health - Service and database health"),
    ("info", "GET /api - API information"),
    ("test", "ANY /api/test - Connectivity test route"),
];

/// API information payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub endpoints: BTreeMap<String, String>,
    /// Link to the interactive docs in development; a contact note otherwise.
    pub documentation: String,
}

impl ApiInfo {
    fn describe(state: &HttpState) -> Self {
        let documentation = if state.environment.is_development() {
            format!("http://localhost:{}/api/docs", state.port)
        } else {
            DOCUMENTATION_CONTACT.to_owned()
        };
        Self {
            name: API_NAME.to_owned(),
            version: APP_VERSION.to_owned(),
            description: API_DESCRIPTION.to_owned(),
            timestamp: state.clock.utc(),
            endpoints: ENDPOINTS
                .iter()
                .map(|(key, route)| ((*key).to_owned(), (*route).to_owned()))
                .collect(),
            documentation,
        }
    }
}

/// Describe the API.
#[utoipa::path(
    get,
    path = "/api",
    tags = ["info"],
    responses((status = 200, description = "API information envelope"))
)]
#[get("/api")]
pub async fn api_info(state: web::Data<HttpState>) -> Envelope<ApiInfo> {
    Envelope::ok(ApiInfo::describe(&state)).with_message(API_INFO_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::domain::ConnectionManager;
    use crate::domain::ports::{ConnectOptions, FixtureDatabaseDriver};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state(environment: Environment, port: u16) -> HttpState {
        let manager = ConnectionManager::new(
            Arc::new(FixtureDatabaseDriver::new()),
            ConnectOptions::new("postgres://fixture/app"),
        );
        HttpState::new(manager, environment, port)
    }

    async fn fetch(state: HttpState) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(api_info),
        )
        .await;
        let request = actix_test::TestRequest::get().uri("/api").to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&bytes).expect("envelope JSON"))
    }

    #[rstest]
    #[actix_web::test]
    async fn info_is_wrapped_in_the_envelope() {
        let (status, body) = fetch(state(Environment::Production, 3000)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("API Information"));
        assert_eq!(body["statusCode"], json!(200));
        assert_eq!(body["data"]["name"], json!(API_NAME));
        assert_eq!(body["data"]["version"], json!(APP_VERSION));
        assert_eq!(body["data"]["endpoints"]["health"], json!(ENDPOINTS[0].1));
    }

    #[rstest]
    #[case(Environment::Development, 8080, "http://localhost:8080/api/docs")]
    #[case(Environment::Production, 8080, DOCUMENTATION_CONTACT)]
    #[case(Environment::Test, 3000, DOCUMENTATION_CONTACT)]
    #[actix_web::test]
    async fn documentation_link_depends_on_environment(
        #[case] environment: Environment,
        #[case] port: u16,
        #[case] expected: &str,
    ) {
        let (_, body) = fetch(state(environment, port)).await;
        assert_eq!(body["data"]["documentation"], json!(expected));
    }
}
