//! Health endpoint: database status plus process diagnostics.
//!
//! Answers 200 while the database is usable and 503 otherwise, so load
//! balancers can drain an instance that lost its database. Replies are never
//! cached.

use actix_web::{HttpResponse, get, http::header, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::System;
use utoipa::ToSchema;

use crate::inbound::http::state::{APP_VERSION, HttpState};

/// Overall health label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum HealthStatus {
    /// Database connected.
    #[serde(rename = "OK")]
    Ok,
    /// Database unavailable.
    Error,
}

/// Database connectivity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// Memory figures in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// Resident set size of this process.
    pub rss: u64,
    /// Virtual memory size of this process.
    #[serde(rename = "virtual")]
    pub virtual_size: u64,
    /// Total system memory.
    pub system_total: u64,
    /// System memory in use.
    pub system_used: u64,
}

impl MemoryUsage {
    /// Sample the current process and system memory.
    ///
    /// Figures the platform cannot report are zero.
    #[must_use]
    pub fn sample() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let mut usage = Self {
            system_total: system.total_memory(),
            system_used: system.used_memory(),
            ..Self::default()
        };
        if let Ok(pid) = sysinfo::get_current_pid() {
            system.refresh_process(pid);
            if let Some(process) = system.process(pid) {
                usage.rss = process.memory();
                usage.virtual_size = process.virtual_memory();
            }
        }
        usage
    }
}

/// Health reply body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseStatus,
    /// Seconds since the process started.
    pub uptime: f64,
    pub memory: MemoryUsage,
    pub environment: String,
    pub version: String,
}

impl HealthReport {
    fn collect(state: &HttpState) -> Self {
        let connected = state.connection.connection_status();
        Self {
            status: if connected {
                HealthStatus::Ok
            } else {
                HealthStatus::Error
            },
            timestamp: state.clock.utc(),
            database: if connected {
                DatabaseStatus::Connected
            } else {
                DatabaseStatus::Disconnected
            },
            uptime: state.started_at.elapsed().as_secs_f64(),
            memory: MemoryUsage::sample(),
            environment: state.environment.name().to_owned(),
            version: APP_VERSION.to_owned(),
        }
    }
}

/// Health check. Return 200 when the database is connected and 503
/// otherwise; the body is the same shape either way.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    responses(
        (status = 200, description = "Server and database are healthy", body = HealthReport),
        (status = 503, description = "Database is unavailable", body = HealthReport)
    )
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> HttpResponse {
    let report = HealthReport::collect(&state);
    let mut response = match report.status {
        HealthStatus::Ok => HttpResponse::Ok(),
        HealthStatus::Error => HttpResponse::ServiceUnavailable(),
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(report)
}
