//! Port for the database driver underneath the connection lifecycle.
//!
//! The [`DatabaseDriver`] trait hides the concrete client library. A
//! successful [`DatabaseDriver::connect`] hands back a stream of
//! [`DriverEvent`] notifications that the lifecycle manager consumes on a
//! dedicated task, so driver callbacks never write shared state directly.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::define_port_error;

const DEFAULT_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(45);

define_port_error! {
    /// Errors raised by database driver adapters.
    pub enum DatabaseDriverError {
        /// The connection could not be opened.
        Connect => "database connection failed: {message}",
        /// The connection URI was rejected before any I/O happened.
        InvalidUri => "invalid database connection uri: {message}",
        /// Closing the connection failed.
        Disconnect => "database disconnect failed: {message}",
    }
}

/// Address family used when resolving the database host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    /// Resolve to IPv4 addresses only.
    Ipv4,
    /// Accept whatever the resolver returns first.
    Any,
}

/// Operational parameters for opening a connection.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use starter_backend::domain::ports::{AddressFamily, ConnectOptions};
///
/// let options = ConnectOptions::new("postgres://localhost/app");
/// assert_eq!(options.max_pool_size, 10);
/// assert_eq!(options.server_selection_timeout, Duration::from_secs(5));
/// assert_eq!(options.socket_timeout, Duration::from_secs(45));
/// assert_eq!(options.address_family, AddressFamily::Ipv4);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Connection URI, including credentials.
    pub uri: String,
    /// Upper bound on pooled connections.
    pub max_pool_size: u32,
    /// How long to wait for a usable server before failing.
    pub server_selection_timeout: Duration,
    /// How long an established socket may stall before it is dropped.
    pub socket_timeout: Duration,
    /// Address family for host resolution.
    pub address_family: AddressFamily,
}

impl ConnectOptions {
    /// Options for `uri` with the fixed operational defaults.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            server_selection_timeout: DEFAULT_SERVER_SELECTION_TIMEOUT,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
            address_family: AddressFamily::Ipv4,
        }
    }
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The URI embeds credentials.
        f.debug_struct("ConnectOptions")
            .field("uri", &"<redacted>")
            .field("max_pool_size", &self.max_pool_size)
            .field("server_selection_timeout", &self.server_selection_timeout)
            .field("socket_timeout", &self.socket_timeout)
            .field("address_family", &self.address_family)
            .finish()
    }
}

/// Asynchronous notification emitted by a live driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    /// The driver (re)established its link.
    Connected,
    /// The link dropped.
    Disconnected,
    /// The driver reported an error; the link may still be up.
    Error(String),
    /// The link came back after a drop.
    Reconnected,
}

/// Receiving half of a driver's notification stream.
pub type DriverEvents = mpsc::UnboundedReceiver<DriverEvent>;

/// Port for opening and closing the process-wide database connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Open the connection and return its notification stream.
    ///
    /// The stream ends when the driver drops its sender, typically on
    /// [`DatabaseDriver::disconnect`].
    async fn connect(&self, options: &ConnectOptions) -> Result<DriverEvents, DatabaseDriverError>;

    /// Close the connection.
    async fn disconnect(&self) -> Result<(), DatabaseDriverError>;

    /// Whether the driver itself considers the connection ready for queries.
    fn is_ready(&self) -> bool;

    /// Name of the connected database, when known.
    fn database_name(&self) -> Option<String>;
}

/// In-memory driver for tests and local wiring without a database.
///
/// Counts connect calls and lets tests push notifications as if they came
/// from a live driver.
#[derive(Debug, Default)]
pub struct FixtureDatabaseDriver {
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    ready: AtomicBool,
    connect_failure: Option<String>,
    notifier: Mutex<Option<mpsc::UnboundedSender<DriverEvent>>>,
}

impl FixtureDatabaseDriver {
    /// Driver whose connect calls succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver whose connect calls fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            connect_failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of connect operations performed.
    #[must_use]
    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::Acquire)
    }

    /// Number of disconnect operations performed.
    #[must_use]
    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::Acquire)
    }

    /// Override the driver-level readiness report.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Emit `event` on the notification stream.
    ///
    /// Readiness follows the event the way a real driver's would. Returns
    /// `false` when no connection is open or the consumer has gone away.
    pub fn notify(&self, event: DriverEvent) -> bool {
        match event {
            DriverEvent::Disconnected => self.set_ready(false),
            DriverEvent::Connected | DriverEvent::Reconnected => self.set_ready(true),
            DriverEvent::Error(_) => {}
        }
        let guard = self
            .notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .is_some_and(|sender| sender.send(event).is_ok())
    }
}

#[async_trait]
impl DatabaseDriver for FixtureDatabaseDriver {
    async fn connect(&self, _options: &ConnectOptions) -> Result<DriverEvents, DatabaseDriverError> {
        self.connects.fetch_add(1, Ordering::AcqRel);
        if let Some(message) = &self.connect_failure {
            return Err(DatabaseDriverError::connect(message.as_str()));
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        *self
            .notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(sender);
        self.set_ready(true);
        Ok(receiver)
    }

    async fn disconnect(&self) -> Result<(), DatabaseDriverError> {
        self.disconnects.fetch_add(1, Ordering::AcqRel);
        self.set_ready(false);
        self.notifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn database_name(&self) -> Option<String> {
        Some("fixture".to_owned())
    }
}
