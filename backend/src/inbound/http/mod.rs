//! HTTP inbound adapter exposing the REST endpoints.

pub mod api_info;
pub mod body_limits;
pub mod envelope;
pub mod error;
pub mod health;
pub mod not_found;
pub mod probe;
pub mod state;

pub use envelope::{Envelope, SuccessKind};
pub use error::{ApiResult, classify};
