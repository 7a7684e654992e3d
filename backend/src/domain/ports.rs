//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters.
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants.

mod database_driver;
mod macros;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use database_driver::MockDatabaseDriver;
pub use database_driver::{
    AddressFamily, ConnectOptions, DatabaseDriver, DatabaseDriverError, DriverEvent,
    DriverEvents, FixtureDatabaseDriver,
};
