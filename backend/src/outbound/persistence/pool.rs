//! Async connection pool for Diesel PostgreSQL connections.
//!
//! Wraps `diesel-async` and `bb8`. The pool is sized and timed from the
//! driver's [`ConnectOptions`], and [`DbPool::ping`] gives the driver a cheap
//! liveness check for the initial handshake and the background probe.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::domain::ports::{ConnectOptions, define_port_error};

define_port_error! {
    /// Failures raised by the pool while opening or probing connections.
    pub enum PoolError {
        /// No connection could be checked out in time.
        Checkout => "failed to get connection from pool: {message}",
        /// The pool itself could not be built.
        Build => "failed to build connection pool: {message}",
        /// The liveness query failed.
        Ping => "database ping failed: {message}",
    }
}

/// Configuration for the database connection pool.
#[derive(Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Size and time the pool from connect options, using `database_url` as
    /// the fully prepared connection string.
    pub fn from_options(database_url: impl Into<String>, options: &ConnectOptions) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: options.max_pool_size,
            connection_timeout: options.server_selection_timeout,
        }
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &"<redacted>")
            .field("max_size", &self.max_size)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

/// Async connection pool for PostgreSQL via Diesel.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// Connections are opened lazily, so this does not prove the server is
    /// reachable; call [`DbPool::ping`] for that.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the pool cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(None)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    async fn checkout(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Run `SELECT 1` on a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` when no connection is available and
    /// `PoolError::Ping` when the query fails.
    pub async fn ping(&self) -> Result<(), PoolError> {
        let mut conn = self.checkout().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| PoolError::ping(err.to_string()))
    }
}
