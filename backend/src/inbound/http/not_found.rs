//! Catch-all for unmatched routes.

use actix_web::HttpRequest;

use crate::inbound::http::envelope::Envelope;

/// Answer 404 naming the requested path and query.
pub async fn not_found(req: HttpRequest) -> Envelope<()> {
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path(), |target| target.as_str());
    Envelope::not_found(format!("Route {target} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case("/missing", "Route /missing not found")]
    #[case("/api/v2/widgets?page=2", "Route /api/v2/widgets?page=2 not found")]
    #[actix_web::test]
    async fn unmatched_routes_name_the_target(#[case] uri: &str, #[case] message: &str) {
        let app =
            actix_test::init_service(App::new().default_service(web::to(not_found))).await;
        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = actix_test::read_body(response).await;
        let body: Value = serde_json::from_slice(&bytes).expect("envelope JSON");
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!(message));
        assert_eq!(body["statusCode"], json!(404));
    }
}
