//! Request middleware.
//!
//! Purpose: define middleware for request lifecycle concerns such as
//! tracing, cross-origin policy, hardening headers and fault rendering.

pub mod cors;
pub mod error_sink;
pub mod security_headers;
pub mod trace;

pub use cors::cors;
pub use error_sink::ErrorSink;
pub use security_headers::security_headers;
pub use trace::Trace;
