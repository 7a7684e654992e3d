//! Typed application errors.
//!
//! These errors are transport agnostic. The kind fixes a default HTTP status
//! and message; inbound adapters translate the status into protocol types.

use std::fmt;

/// Category of an explicit application failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Input failed domain validation.
    Validation,
    /// The requested resource does not exist.
    NotFound,
    /// The resource already exists or the change conflicts with current state.
    Conflict,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The request is malformed.
    BadRequest,
    /// An unexpected failure inside the service.
    Internal,
}

impl ErrorKind {
    /// HTTP status code associated with the kind.
    ///
    /// # Examples
    /// ```
    /// use starter_backend::domain::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::Conflict.status(), 409);
    /// ```
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Validation | Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }

    /// Message used when the caller does not supply one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::Unauthorized => "Unauthorized access",
            Self::Forbidden => "Forbidden",
            Self::BadRequest => "Bad request",
            Self::Internal => "Internal server error",
        }
    }
}

/// Explicit application failure carrying its own status.
///
/// # Examples
/// ```
/// use starter_backend::domain::{AppError, ErrorKind};
///
/// let err = AppError::not_found("Customer");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.message(), "Customer not found");
/// assert_eq!(err.status(), 404);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    /// Create an error with an explicit message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an error using the kind's default message.
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    /// Failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP status carried by the error.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Convenience constructor for [`ErrorKind::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Convenience constructor for [`ErrorKind::NotFound`].
    ///
    /// The message names the missing resource, for example
    /// `"Customer not found"`.
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, format!("{resource} not found"))
    }

    /// Convenience constructor for [`ErrorKind::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Convenience constructor for [`ErrorKind::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorKind::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorKind::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Convenience constructor for [`ErrorKind::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}
