//! Process shutdown: signal handling, the bounded drain sequence and the
//! panic policy.
//!
//! On SIGTERM or SIGINT the listener stops accepting connections, in-flight
//! requests finish, then the database connection is closed. The whole
//! sequence must complete within [`GRACE_PERIOD`] or the process exits with
//! a failure status.

use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use tracing::{error, info};

use crate::domain::ConnectionManager;

/// Upper bound for the whole shutdown sequence.
pub const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// How a shutdown sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Everything closed within the grace period.
    Graceful,
    /// The grace period elapsed first.
    TimedOut,
}

impl ShutdownOutcome {
    /// Numeric process status for this outcome.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Graceful => 0,
            Self::TimedOut => 1,
        }
    }

    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Wait for SIGTERM or SIGINT and return the signal's name.
///
/// # Errors
/// Returns the I/O error raised while registering a signal handler.
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = terminate.recv() => Ok("SIGTERM"),
            result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|()| "SIGINT")
    }
}

/// Run `sequence`, giving up after `grace`.
pub async fn drain<F>(sequence: F, grace: Duration) -> ShutdownOutcome
where
    F: Future<Output = ()>,
{
    match tokio::time::timeout(grace, sequence).await {
        Ok(()) => ShutdownOutcome::Graceful,
        Err(_) => {
            error!(grace_secs = grace.as_secs_f64(), "shutdown timed out");
            ShutdownOutcome::TimedOut
        }
    }
}

/// Stop the server, then close the database connection, within
/// [`GRACE_PERIOD`].
pub async fn graceful_shutdown(server: ServerHandle, connection: ConnectionManager) -> ShutdownOutcome {
    drain(
        async move {
            server.stop(true).await;
            info!("http server stopped");
            connection.disconnect().await;
        },
        GRACE_PERIOD,
    )
    .await
}

/// Log any panic and terminate the process with status 1.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        error!(panic = %info, "unrecoverable panic");
        std::process::exit(1);
    }));
}
