//! Translate Diesel and pool failures into request faults.
//!
//! Repositories return `Result<_, Fault>` by applying `?` to Diesel calls;
//! the conversions here decide which failures the classifier can name.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;
use crate::domain::{AppError, ErrorKind, Fault};

const DETAIL_PREFIX: &str = "Key (";
const DETAIL_SEPARATOR: &str = ")=(";
const DETAIL_SUFFIX: &str = ") already exists";

/// Split a PostgreSQL unique-violation detail into field and value.
///
/// The server reports `Key (field)=(value) already exists.`; composite keys
/// keep their comma-separated lists.
///
/// # Examples
/// ```
/// use starter_backend::outbound::persistence::error_mapping::parse_duplicate_key;
///
/// let parsed = parse_duplicate_key("Key (email)=(a@b.c) already exists.");
/// assert_eq!(parsed, Some(("email".to_owned(), "a@b.c".to_owned())));
/// ```
#[must_use]
pub fn parse_duplicate_key(detail: &str) -> Option<(String, String)> {
    let body = detail.trim().strip_prefix(DETAIL_PREFIX)?;
    let (field, rest) = body.split_once(DETAIL_SEPARATOR)?;
    let value = &rest[..rest.rfind(DETAIL_SUFFIX)?];
    if field.is_empty() {
        return None;
    }
    Some((field.to_owned(), value.to_owned()))
}

impl From<DieselError> for Fault {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => AppError::from_kind(ErrorKind::NotFound).into(),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                debug!(
                    constraint = info.constraint_name().unwrap_or("unknown"),
                    "unique constraint violated"
                );
                match info.details().and_then(parse_duplicate_key) {
                    Some((field, value)) => Self::duplicate_key(field, value),
                    None => AppError::from_kind(ErrorKind::Conflict).into(),
                }
            }
            DieselError::DatabaseError(_, info) => Self::unclassified(info.message()),
            other => Self::unclassified(other),
        }
    }
}

impl From<PoolError> for Fault {
    fn from(error: PoolError) -> Self {
        Self::unclassified(error)
    }
}
