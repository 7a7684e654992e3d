//! PostgreSQL persistence adapter.
//!
//! Implements the database driver port on top of Diesel async and bb8, and
//! converts Diesel failures into request faults.

pub mod connection_url;
pub mod error_mapping;
pub mod pool;
pub mod postgres_driver;

pub use pool::{DbPool, PoolConfig, PoolError};
pub use postgres_driver::{PROBE_INTERVAL, PostgresDriver};
