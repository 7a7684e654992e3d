//! Domain primitives and services.
//!
//! Purpose: keep failure taxonomy and the connection lifecycle free of
//! transport concerns. Inbound adapters translate these types into HTTP
//! replies; outbound adapters implement the ports.
//!
//! Public surface:
//! - AppError / ErrorKind: typed application errors with fixed statuses.
//! - Fault: any failure a request handler can raise.
//! - ConnectionManager: owner of the database connection state.

pub mod connection;
pub mod error;
pub mod fault;
pub mod ports;

pub use self::connection::{ConnectionError, ConnectionManager, ConnectionPhase, ConnectionState};
pub use self::error::{AppError, ErrorKind};
pub use self::fault::Fault;

/// Convenient handler result alias.
///
/// # Examples
/// ```
/// use starter_backend::domain::{AppError, HandlerResult};
///
/// fn lookup() -> HandlerResult<u32> {
///     Err(AppError::not_found("Customer").into())
/// }
/// assert!(lookup().is_err());
/// ```
pub type HandlerResult<T> = Result<T, Fault>;
