//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`. It carries the
//! process-wide connection manager so every handler observes the same
//! database status.

use std::sync::Arc;
use std::time::Instant;

use mockable::{Clock, DefaultClock};

use crate::config::Environment;
use crate::domain::ConnectionManager;

/// Version reported by diagnostics endpoints.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Single connection lifecycle manager for the process.
    pub connection: ConnectionManager,
    /// Deployment environment.
    pub environment: Environment,
    /// Port the server listens on, used in advertised links.
    pub port: u16,
    /// Process start, used for uptime.
    pub started_at: Instant,
    /// Wall clock for reply timestamps.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state starting the uptime clock now.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use starter_backend::config::Environment;
    /// use starter_backend::domain::ConnectionManager;
    /// use starter_backend::domain::ports::{ConnectOptions, FixtureDatabaseDriver};
    /// use starter_backend::inbound::http::state::HttpState;
    ///
    /// let manager = ConnectionManager::new(
    ///     Arc::new(FixtureDatabaseDriver::new()),
    ///     ConnectOptions::new("postgres://localhost/app"),
    /// );
    /// let state = HttpState::new(manager, Environment::Development, 3000);
    /// assert_eq!(state.port, 3000);
    /// ```
    #[must_use]
    pub fn new(connection: ConnectionManager, environment: Environment, port: u16) -> Self {
        Self {
            connection,
            environment,
            port,
            started_at: Instant::now(),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Measure uptime from `started_at` instead of construction time.
    ///
    /// The binary passes the instant captured on entry to `main`, so
    /// configuration and the database connect count towards uptime.
    #[must_use]
    pub fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    /// Replace the wall clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
