//! Cross-origin policy.
//!
//! Any origin is reflected back with credentials allowed, so browser
//! front-ends on other hosts can use cookie sessions.

use actix_cors::Cors;
use actix_web::http::{Method, header};

/// Methods allowed for cross-origin requests.
pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

/// Build the CORS middleware.
#[must_use]
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(ALLOWED_METHODS)
        .allowed_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .supports_credentials()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const ORIGIN: &str = "https://app.example.com";

    fn header_str<'a, B>(res: &'a actix_web::dev::ServiceResponse<B>, name: &str) -> Option<&'a str> {
        res.headers().get(name).and_then(|value| value.to_str().ok())
    }

    #[actix_web::test]
    async fn origin_is_reflected_with_credentials() {
        let app = test::init_service(
            App::new()
                .wrap(cors())
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, ORIGIN))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            header_str(&res, "access-control-allow-origin"),
            Some(ORIGIN)
        );
        assert_eq!(
            header_str(&res, "access-control-allow-credentials"),
            Some("true")
        );
    }

    #[actix_web::test]
    async fn preflight_lists_allowed_methods() {
        let app = test::init_service(
            App::new()
                .wrap(cors())
                .route("/", web::put().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/")
            .insert_header((header::ORIGIN, ORIGIN))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PUT"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let methods = header_str(&res, "access-control-allow-methods").unwrap_or_default();
        for method in ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"] {
            assert!(methods.contains(method), "missing {method} in {methods}");
        }
    }
}
