//! Request body extractor limits.
//!
//! JSON and URL-encoded bodies are capped at 10 MiB. Extractor failures are
//! raised as bad-request faults so the error sink renders them like any
//! other handler fault.

use actix_web::{HttpRequest, error, web};
use tracing::debug;

use crate::domain::{AppError, Fault};

/// Maximum accepted body size for JSON and URL-encoded payloads.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

fn payload_fault(kind: &'static str, detail: impl std::fmt::Display) -> error::Error {
    debug!(kind, %detail, "rejected request body");
    Fault::from(AppError::bad_request(format!("Invalid {kind} body: {detail}"))).into()
}

/// JSON extractor configuration.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(BODY_LIMIT_BYTES)
        .error_handler(|err, _req: &HttpRequest| payload_fault("JSON", err))
}

/// URL-encoded form extractor configuration.
#[must_use]
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .limit(BODY_LIMIT_BYTES)
        .error_handler(|err, _req: &HttpRequest| payload_fault("form", err))
}
