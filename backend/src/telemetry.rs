//! Tracing subscriber set-up.

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Environment;

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// Production emits JSON lines; other environments use the compact human
/// format. `RUST_LOG` overrides the default `info` filter.
///
/// # Errors
/// Returns the subscriber error when a global subscriber is already set.
pub fn init(environment: &Environment) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt().with_env_filter(filter);
    if environment.is_production() {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    }
}
