//! HTTP classification of handler faults.
//!
//! Purpose: turn any [`Fault`] into exactly one envelope error reply. The
//! domain stays HTTP-agnostic; this module owns the status table and the
//! production redaction rule.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::config::Environment;
use crate::domain::Fault;
use crate::inbound::http::envelope::Envelope;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Fault>;

const INVALID_ID_MESSAGE: &str = "Invalid ID format";
const INVALID_TOKEN_MESSAGE: &str = "Invalid token";
const TOKEN_EXPIRED_MESSAGE: &str = "Token expired";
const OPAQUE_INTERNAL_MESSAGE: &str = "Internal server error";

/// Status a fault is answered with.
#[must_use]
pub fn status_for(fault: &Fault) -> StatusCode {
    match fault {
        Fault::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Fault::DuplicateKey { .. } => StatusCode::CONFLICT,
        Fault::MalformedId(_) => StatusCode::BAD_REQUEST,
        Fault::InvalidToken | Fault::TokenExpired => StatusCode::UNAUTHORIZED,
        Fault::App(error) => {
            StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Fault::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the error reply for `fault`.
///
/// Outside production an unclassified fault exposes its raw text; in
/// production the message is replaced with an opaque one.
///
/// # Examples
/// ```
/// use starter_backend::config::Environment;
/// use starter_backend::domain::Fault;
/// use starter_backend::inbound::http::error::classify;
///
/// let reply = classify(&Fault::duplicate_key("email", "a@b.c"), &Environment::Production);
/// assert_eq!(reply.status_code, 409);
/// assert_eq!(reply.message, "email: 'a@b.c' already exists");
/// ```
#[must_use]
pub fn classify(fault: &Fault, environment: &Environment) -> Envelope<()> {
    match fault {
        Fault::Validation(messages) => Envelope::validation_error(messages),
        Fault::DuplicateKey { field, value } => {
            Envelope::conflict(format!("{field}: '{value}' already exists"))
        }
        Fault::MalformedId(_) => Envelope::bad_request(INVALID_ID_MESSAGE),
        Fault::InvalidToken => Envelope::unauthorized(INVALID_TOKEN_MESSAGE),
        Fault::TokenExpired => Envelope::unauthorized(TOKEN_EXPIRED_MESSAGE),
        Fault::App(error) => Envelope::error(status_for(fault)).with_message(error.message()),
        Fault::Unclassified(raw) => {
            let message = if environment.is_production() {
                OPAQUE_INTERNAL_MESSAGE
            } else {
                raw.as_str()
            };
            Envelope::internal_server_error(message)
        }
    }
}

/// Fallback rendering used when a fault is turned into a response outside
/// the error sink. It assumes production so raw text never leaks; the sink
/// re-renders with the configured environment.
impl ResponseError for Fault {
    fn status_code(&self) -> StatusCode {
        status_for(self)
    }

    fn error_response(&self) -> HttpResponse {
        classify(self, &Environment::Production).into_response()
    }
}

#[cfg(test)]
mod tests;
