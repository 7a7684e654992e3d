//! Database connection lifecycle.
//!
//! [`ConnectionManager`] owns the open/closed state of the process-wide
//! database connection. The binary builds exactly one manager at start-up
//! and hands clones of it to request handlers; clones share state.
//!
//! State lives in a [`tokio::sync::watch`] channel. Explicit lifecycle calls
//! and a single consumer task draining the driver's [`DriverEvent`] stream
//! publish into it, so readers always observe the latest value without
//! holding a lock across I/O.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::ports::{ConnectOptions, DatabaseDriver, DatabaseDriverError, DriverEvent, DriverEvents};

/// Lifecycle phase of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// No connection has been opened, or it was closed.
    Disconnected,
    /// An open is in flight.
    Connecting,
    /// The connection is up.
    Connected,
    /// The driver reported an error. Transient: the next notification or
    /// lifecycle call moves the phase on.
    Errored,
}

/// Snapshot of the connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    /// Lifecycle phase.
    pub phase: ConnectionPhase,
    /// Whether the connection is believed live.
    pub is_connected: bool,
    /// Most recent driver error, if any.
    pub last_error: Option<String>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            phase: ConnectionPhase::Disconnected,
            is_connected: false,
            last_error: None,
        }
    }
}

impl ConnectionState {
    /// Apply a driver notification.
    ///
    /// `Connected` is informational only; `Error` records the message
    /// without touching `is_connected`.
    fn apply(&mut self, event: &DriverEvent) {
        match event {
            DriverEvent::Connected => {}
            DriverEvent::Disconnected => {
                self.phase = ConnectionPhase::Disconnected;
                self.is_connected = false;
            }
            DriverEvent::Error(message) => {
                self.phase = ConnectionPhase::Errored;
                self.last_error = Some(message.clone());
            }
            DriverEvent::Reconnected => {
                self.phase = ConnectionPhase::Connected;
                self.is_connected = true;
            }
        }
    }
}

/// Errors returned by [`ConnectionManager::connect`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The driver could not open the connection.
    #[error(transparent)]
    Driver(#[from] DatabaseDriverError),
}

struct Inner {
    driver: Arc<dyn DatabaseDriver>,
    options: ConnectOptions,
    state: watch::Sender<ConnectionState>,
    lifecycle: Mutex<Option<JoinHandle<()>>>,
}

/// Owner of the database connection state.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use starter_backend::domain::ConnectionManager;
/// use starter_backend::domain::ports::{ConnectOptions, FixtureDatabaseDriver};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let manager = ConnectionManager::new(
///     Arc::new(FixtureDatabaseDriver::new()),
///     ConnectOptions::new("postgres://localhost/app"),
/// );
/// assert!(!manager.connection_status());
/// manager.connect().await.expect("fixture connects");
/// assert!(manager.connection_status());
/// # });
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    /// Create a manager in the disconnected state.
    pub fn new(driver: Arc<dyn DatabaseDriver>, options: ConnectOptions) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        Self {
            inner: Arc::new(Inner {
                driver,
                options,
                state,
                lifecycle: Mutex::new(None),
            }),
        }
    }

    /// Open the connection.
    ///
    /// A no-op when already connected. On success the driver's notification
    /// stream is handed to a consumer task that keeps the state in step with
    /// the live connection.
    ///
    /// # Errors
    /// Returns [`ConnectionError::Driver`] when the driver fails to connect.
    /// Callers at start-up treat this as fatal; nothing is retried here.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        let mut consumer = self.inner.lifecycle.lock().await;
        if self.inner.state.borrow().is_connected {
            info!("database already connected");
            return Ok(());
        }

        self.inner.state.send_modify(|state| {
            state.phase = ConnectionPhase::Connecting;
        });

        match self.inner.driver.connect(&self.inner.options).await {
            Ok(events) => {
                self.inner.state.send_modify(|state| {
                    state.phase = ConnectionPhase::Connected;
                    state.is_connected = true;
                    state.last_error = None;
                });
                info!(
                    database = self.inner.driver.database_name().as_deref().unwrap_or("unknown"),
                    "database connected"
                );
                if let Some(previous) = consumer.take() {
                    previous.abort();
                }
                *consumer = Some(tokio::spawn(consume_events(
                    events,
                    self.inner.state.clone(),
                )));
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "database connection failed");
                self.inner.state.send_modify(|state| {
                    state.phase = ConnectionPhase::Errored;
                    state.is_connected = false;
                    state.last_error = Some(err.to_string());
                });
                Err(err.into())
            }
        }
    }

    /// Close the connection.
    ///
    /// A no-op when not connected. Driver failures are logged and leave the
    /// state untouched; this runs during shutdown and must not abort it.
    pub async fn disconnect(&self) {
        let mut consumer = self.inner.lifecycle.lock().await;
        if !self.inner.state.borrow().is_connected {
            return;
        }

        match self.inner.driver.disconnect().await {
            Ok(()) => {
                if let Some(task) = consumer.take() {
                    task.abort();
                }
                self.inner.state.send_modify(|state| {
                    state.phase = ConnectionPhase::Disconnected;
                    state.is_connected = false;
                });
                info!("database disconnected");
            }
            Err(err) => {
                warn!(error = %err, "database disconnect failed");
            }
        }
    }

    /// Whether the connection is usable.
    ///
    /// True only when the flag is set and the driver independently reports
    /// ready, which guards against a stale flag.
    #[must_use]
    pub fn connection_status(&self) -> bool {
        self.inner.state.borrow().is_connected && self.inner.driver.is_ready()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }
}

async fn consume_events(mut events: DriverEvents, state: watch::Sender<ConnectionState>) {
    while let Some(event) = events.recv().await {
        match &event {
            DriverEvent::Connected => info!("database link established"),
            DriverEvent::Disconnected => warn!("database link lost"),
            DriverEvent::Error(message) => error!(error = %message, "database driver error"),
            DriverEvent::Reconnected => info!("database link re-established"),
        }
        state.send_modify(|current| current.apply(&event));
    }
}

#[cfg(test)]
mod tests;
