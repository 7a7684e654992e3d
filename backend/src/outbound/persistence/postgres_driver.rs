//! PostgreSQL implementation of the database driver port.
//!
//! `connect` prepares the connection URL, builds a bb8 pool and proves the
//! server reachable with `SELECT 1` before reporting success. A background
//! probe then pings the server on a fixed interval and reports link changes
//! on the event stream handed back to the lifecycle manager.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::connection_url;
use super::pool::{DbPool, PoolConfig, PoolError};
use crate::domain::ports::{
    ConnectOptions, DatabaseDriver, DatabaseDriverError, DriverEvent, DriverEvents,
};

/// Interval between background liveness pings.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(10);

struct Session {
    probe: JoinHandle<()>,
}

/// Database driver backed by a Diesel async pool.
pub struct PostgresDriver {
    ready: Arc<AtomicBool>,
    database_name: Mutex<Option<String>>,
    session: tokio::sync::Mutex<Option<Session>>,
    probe_interval: Duration,
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresDriver {
    /// Create a driver probing every [`PROBE_INTERVAL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_probe_interval(PROBE_INTERVAL)
    }

    /// Create a driver with a custom probe interval.
    #[must_use]
    pub fn with_probe_interval(probe_interval: Duration) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            database_name: Mutex::new(None),
            session: tokio::sync::Mutex::new(None),
            probe_interval,
        }
    }

    fn set_database_name(&self, name: Option<String>) {
        *self
            .database_name
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = name;
    }
}

/// Events implied by one probe result given the previous readiness.
fn transition(was_ready: bool, ping: Result<(), PoolError>) -> Vec<DriverEvent> {
    match (was_ready, ping) {
        (true, Err(err)) => vec![DriverEvent::Error(err.to_string()), DriverEvent::Disconnected],
        (false, Ok(())) => vec![DriverEvent::Reconnected],
        _ => Vec::new(),
    }
}

/// Report the completed handshake; returns whether anyone was listening.
fn announce_connected(events: &mpsc::UnboundedSender<DriverEvent>) -> bool {
    let delivered = events.send(DriverEvent::Connected).is_ok();
    if !delivered {
        debug!("driver event receiver dropped before the handshake event");
    }
    delivered
}

async fn probe(
    pool: DbPool,
    ready: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<DriverEvent>,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the handshake already pinged.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let ping = pool.ping().await;
        if let Err(err) = &ping {
            debug!(error = %err, "database probe failed");
        }
        let was_ready = ready.load(Ordering::Acquire);
        for event in transition(was_ready, ping) {
            match event {
                DriverEvent::Disconnected => ready.store(false, Ordering::Release),
                DriverEvent::Reconnected => ready.store(true, Ordering::Release),
                DriverEvent::Connected | DriverEvent::Error(_) => {}
            }
            if events.send(event).is_err() {
                return;
            }
        }
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    async fn connect(&self, options: &ConnectOptions) -> Result<DriverEvents, DatabaseDriverError> {
        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            previous.probe.abort();
            self.ready.store(false, Ordering::Release);
        }

        let url = connection_url::prepare(options).await?;
        self.set_database_name(connection_url::database_name(&url));

        let pool = DbPool::new(PoolConfig::from_options(url.as_str(), options))
            .await
            .map_err(|err| DatabaseDriverError::connect(err.to_string()))?;
        pool.ping()
            .await
            .map_err(|err| DatabaseDriverError::connect(err.to_string()))?;

        self.ready.store(true, Ordering::Release);
        let (sender, receiver) = mpsc::unbounded_channel();
        announce_connected(&sender);
        let probe = tokio::spawn(probe(
            pool,
            Arc::clone(&self.ready),
            sender,
            self.probe_interval,
        ));
        *session = Some(Session { probe });
        info!(interval_secs = self.probe_interval.as_secs(), "database probe started");
        Ok(receiver)
    }

    async fn disconnect(&self) -> Result<(), DatabaseDriverError> {
        let mut session = self.session.lock().await;
        match session.take() {
            Some(Session { probe }) => {
                // Aborting the probe drops the last pool handle, closing
                // every pooled connection.
                probe.abort();
                match probe.await {
                    Err(err) if !err.is_cancelled() => {
                        warn!(error = %err, "database probe ended abnormally");
                    }
                    _ => {}
                }
            }
            None => debug!("database driver already closed"),
        }
        self.ready.store(false, Ordering::Release);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn database_name(&self) -> Option<String> {
        self.database_name
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
