//! Tests for fault classification.

use super::*;
use crate::domain::AppError;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn development() -> Environment {
    Environment::Development
}

#[rstest]
fn validation_faults_join_field_messages(development: Environment) {
    let fault = Fault::validation(["name is required", "age must be positive"]);
    let reply = classify(&fault, &development);

    assert_eq!(reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.message, "Validation failed");
    assert_eq!(
        reply.error.as_deref(),
        Some("name is required, age must be positive")
    );
}

#[rstest]
fn duplicate_key_names_field_and_value(development: Environment) {
    let reply = classify(&Fault::duplicate_key("email", "a@b.c"), &development);
    assert_eq!(reply.status(), StatusCode::CONFLICT);
    assert_eq!(reply.message, "email: 'a@b.c' already exists");
}

#[rstest]
#[case(Fault::MalformedId("abc".to_owned()), 400, "Invalid ID format")]
#[case(Fault::InvalidToken, 401, "Invalid token")]
#[case(Fault::TokenExpired, 401, "Token expired")]
fn fixed_classes_use_fixed_messages(
    development: Environment,
    #[case] fault: Fault,
    #[case] status: u16,
    #[case] message: &str,
) {
    let reply = classify(&fault, &development);
    assert_eq!(reply.status_code, status);
    assert_eq!(reply.message, message);
    assert!(!reply.success);
}

#[rstest]
#[case(AppError::forbidden("Not yours"), 403)]
#[case(AppError::not_found("Widget"), 404)]
#[case(AppError::conflict("Already linked"), 409)]
#[case(AppError::bad_request("Body too large"), 400)]
fn typed_errors_keep_message_and_status(
    #[case] error: AppError,
    #[case] status: u16,
    #[values(Environment::Development, Environment::Production)] environment: Environment,
) {
    let message = error.message().to_owned();
    let reply = classify(&Fault::from(error), &environment);
    assert_eq!(reply.status_code, status);
    assert_eq!(reply.message, message);
}

#[rstest]
fn typed_internal_error_keeps_its_message_in_production() {
    let reply = classify(
        &Fault::from(AppError::internal("Cache offline")),
        &Environment::Production,
    );
    assert_eq!(reply.status_code, 500);
    assert_eq!(reply.message, "Cache offline");
}

#[rstest]
#[case(Environment::Development, "boom")]
#[case(Environment::Test, "boom")]
#[case(Environment::Other("staging".to_owned()), "boom")]
#[case(Environment::Production, "Internal server error")]
fn unclassified_faults_redact_only_in_production(
    #[case] environment: Environment,
    #[case] expected: &str,
) {
    let reply = classify(&Fault::unclassified("boom"), &environment);
    assert_eq!(reply.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.message, expected);
}

#[rstest]
#[actix_web::test]
async fn response_error_renders_as_production() {
    let fault = Fault::unclassified("pool exhausted");
    assert_eq!(
        ResponseError::status_code(&fault),
        StatusCode::INTERNAL_SERVER_ERROR
    );

    let response = ResponseError::error_response(&fault);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body: Value = serde_json::from_slice(&bytes).expect("envelope JSON");
    assert_eq!(body["message"], json!("Internal server error"));
    assert_eq!(body["statusCode"], json!(500));
}
