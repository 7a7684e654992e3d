//! Uniform JSON envelope for HTTP replies.
//!
//! Every reply body has the shape
//! `{success, message, data?, error?, statusCode, timestamp}`. Success
//! replies never carry `error`, and `statusCode` always matches the status
//! line because the HTTP response is built from it.
//!
//! Building the response consumes the envelope, so a handler cannot write
//! the same reply twice.

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";
const DEFAULT_VALIDATION_MESSAGE: &str = "Validation failed";
const VALIDATION_SEPARATOR: &str = ", ";

/// Flavour of a successful reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessKind {
    /// 200 with "Operation succeeded".
    Ok,
    /// 201 with "Created successfully".
    Created,
}

impl SuccessKind {
    /// Status written for this kind.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::Created => StatusCode::CREATED,
        }
    }

    /// Message used when the caller does not supply one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Ok => "Operation succeeded",
            Self::Created => "Created successfully",
        }
    }
}

/// Reply envelope.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use starter_backend::inbound::http::envelope::Envelope;
///
/// let reply = Envelope::ok(42).with_message("Answer");
/// assert!(reply.success);
/// assert_eq!(reply.status_code, 200);
///
/// let failure = Envelope::conflict("email taken");
/// assert!(!failure.success);
/// assert_eq!(failure.status(), StatusCode::CONFLICT);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Payload for successful replies.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Raw error detail for failed replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP status written with the reply.
    pub status_code: u16,
    /// Moment the envelope was built.
    pub timestamp: DateTime<Utc>,
}

impl<T> Envelope<T> {
    /// Successful reply of the given kind, with the kind's default message.
    pub fn success(kind: SuccessKind, data: Option<T>) -> Self {
        Self {
            success: true,
            message: kind.default_message().to_owned(),
            data,
            error: None,
            status_code: kind.status().as_u16(),
            timestamp: Utc::now(),
        }
    }

    /// 200 reply carrying `data`.
    pub fn ok(data: T) -> Self {
        Self::success(SuccessKind::Ok, Some(data))
    }

    /// 201 reply carrying `data`.
    pub fn created(data: T) -> Self {
        Self::success(SuccessKind::Created, Some(data))
    }

    /// Replace the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Status the reply is written with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Envelope<()> {
    /// Failed reply with the default message.
    #[must_use]
    pub fn error(status: StatusCode) -> Self {
        Self {
            success: false,
            message: DEFAULT_ERROR_MESSAGE.to_owned(),
            data: None,
            error: None,
            status_code: status.as_u16(),
            timestamp: Utc::now(),
        }
    }

    /// Attach a raw error detail.
    #[must_use]
    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }

    /// 400 reply.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(StatusCode::BAD_REQUEST).with_message(message)
    }

    /// 401 reply.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::error(StatusCode::UNAUTHORIZED).with_message(message)
    }

    /// 403 reply.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::error(StatusCode::FORBIDDEN).with_message(message)
    }

    /// 404 reply.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(StatusCode::NOT_FOUND).with_message(message)
    }

    /// 409 reply.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::error(StatusCode::CONFLICT).with_message(message)
    }

    /// 422 reply; the detail joins every field message with `", "`.
    ///
    /// # Examples
    /// ```
    /// use starter_backend::inbound::http::envelope::Envelope;
    ///
    /// let reply = Envelope::validation_error(&["name required", "age invalid"]);
    /// assert_eq!(reply.status_code, 422);
    /// assert_eq!(reply.error.as_deref(), Some("name required, age invalid"));
    /// ```
    pub fn validation_error<S: AsRef<str>>(errors: &[S]) -> Self {
        let detail = errors
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(VALIDATION_SEPARATOR);
        Self::error(StatusCode::UNPROCESSABLE_ENTITY)
            .with_message(DEFAULT_VALIDATION_MESSAGE)
            .with_error(detail)
    }

    /// 500 reply.
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR).with_message(message)
    }
}

impl<T: Serialize> Envelope<T> {
    /// Write the envelope as the response body with its status code.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status()).json(self)
    }
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        self.into_response()
    }
}
