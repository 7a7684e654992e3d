//! Backend entry-point: loads configuration, opens the database connection
//! and serves HTTP until a shutdown signal arrives.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{error, info};

use starter_backend::config::{AppConfig, Environment};
use starter_backend::domain::ConnectionManager;
use starter_backend::domain::ports::ConnectOptions;
use starter_backend::inbound::http::api_info::ENDPOINTS;
use starter_backend::inbound::http::state::HttpState;
use starter_backend::outbound::persistence::PostgresDriver;
use starter_backend::server::{ServerConfig, create_server, shutdown};
use starter_backend::telemetry;

fn log_development_endpoints(port: u16) {
    info!(url = %format!("http://localhost:{port}/api/docs/"), "api docs");
    for (name, route) in ENDPOINTS {
        info!(endpoint = name, route, port, "development endpoint");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> ExitCode {
    let started_at = Instant::now();
    let env = DefaultEnv::new();
    let environment = Environment::from_env(&env);
    if let Err(err) = telemetry::init(&environment) {
        // No subscriber is installed, so report straight to stderr.
        let _ignored = writeln!(io::stderr(), "tracing init failed: {err}");
    }
    shutdown::install_panic_hook();

    let config = match AppConfig::from_env(&env) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(environment = %config.environment, port = config.port, "starting");

    let connection = ConnectionManager::new(
        Arc::new(PostgresDriver::new()),
        ConnectOptions::new(config.database_url.as_str()),
    );
    if let Err(err) = connection.connect().await {
        error!(error = %err, "startup failed: database unavailable");
        return ExitCode::FAILURE;
    }

    let port = config.port;
    let http_state = web::Data::new(
        HttpState::new(connection.clone(), config.environment.clone(), port)
            .with_started_at(started_at),
    );
    let server_config = ServerConfig::from_app_config(&config);
    // Wipes the session secret now that the key is derived.
    drop(config);

    let server = match create_server(http_state, server_config) {
        Ok(server) => server,
        Err(err) => {
            error!(error = %err, "failed to bind http server");
            connection.disconnect().await;
            return ExitCode::FAILURE;
        }
    };
    if environment.is_development() {
        log_development_endpoints(port);
    }

    let handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Ok(())) => info!("http server exited"),
                Ok(Err(err)) => error!(error = %err, "http server failed"),
                Err(err) => error!(error = %err, "http server task failed"),
            }
            connection.disconnect().await;
            ExitCode::FAILURE
        }
        signal = shutdown::wait_for_signal() => {
            let outcome = shutdown::graceful_shutdown(handle, connection).await;
            match signal {
                Ok(name) => {
                    info!(signal = name, ?outcome, "shutdown complete");
                    outcome.exit_code()
                }
                Err(err) => {
                    error!(error = %err, "signal handler failed");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
