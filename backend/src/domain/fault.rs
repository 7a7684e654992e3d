//! Faults raised while handling a request.
//!
//! Handlers never format error replies themselves. They return a [`Fault`]
//! (usually through `?`) and the HTTP classifier decides the status and
//! message. Driver adapters convert their own failures into the matching
//! variant at the boundary.

use super::AppError;

/// Any failure that can escape a request handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    /// Input failed validation; one message per offending field.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    /// A unique constraint rejected the write.
    #[error("duplicate key {field}={value}")]
    DuplicateKey {
        /// Column or key name that collided.
        field: String,
        /// Offending value.
        value: String,
    },
    /// An identifier could not be parsed.
    #[error("malformed identifier: {0}")]
    MalformedId(String),
    /// A credential token failed verification.
    #[error("invalid token")]
    InvalidToken,
    /// A credential token is past its expiry.
    #[error("token expired")]
    TokenExpired,
    /// Explicit application error carrying its own status.
    #[error(transparent)]
    App(#[from] AppError),
    /// Anything else; the raw text is hidden from clients in production.
    #[error("{0}")]
    Unclassified(String),
}

impl Fault {
    /// Build a validation fault from per-field messages.
    ///
    /// # Examples
    /// ```
    /// use starter_backend::domain::Fault;
    ///
    /// let fault = Fault::validation(["name required", "age invalid"]);
    /// assert_eq!(fault.to_string(), "validation failed: name required, age invalid");
    /// ```
    pub fn validation<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation(messages.into_iter().map(Into::into).collect())
    }

    /// Build a duplicate-key fault.
    pub fn duplicate_key(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::DuplicateKey {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wrap an arbitrary error as an unclassified fault.
    pub fn unclassified(error: impl std::fmt::Display) -> Self {
        Self::Unclassified(error.to_string())
    }
}

impl From<uuid::Error> for Fault {
    fn from(value: uuid::Error) -> Self {
        Self::MalformedId(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn uuid_parse_failure_is_malformed_id() {
        let fault: Fault = uuid::Uuid::parse_str("not-a-uuid")
            .map_err(Fault::from)
            .expect_err("parse should fail");
        assert!(matches!(fault, Fault::MalformedId(_)));
    }

    #[rstest]
    fn app_errors_convert_transparently() {
        let fault = Fault::from(AppError::forbidden("nope"));
        assert_eq!(fault.to_string(), "nope");
    }

    #[rstest]
    fn unclassified_keeps_raw_text() {
        let fault = Fault::unclassified("socket closed");
        assert_eq!(fault, Fault::Unclassified("socket closed".to_owned()));
    }
}
