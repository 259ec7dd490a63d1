//! Region lookup service over a small async database driver abstraction.
//!
//! The [`Database`] facade picks a [`Driver`] from a [`DriverRegistry`] by
//! engine name, logs every connect/query/disconnect outcome, and refuses
//! queries until a connection is held. [`RegionRepository`] uses it for one
//! unit of work per lookup, and [`server`] exposes that over HTTP.

pub mod config;
pub mod database;
pub mod driver;
pub mod error;
pub mod region;
pub mod results;
pub mod server;
pub mod statement;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub mod translation;

pub use config::{AppConfig, DatabaseConfig};
pub use database::Database;
pub use driver::{Driver, DriverFactory, DriverRegistry};
pub use error::DbError;
pub use region::{LookupError, Region, RegionLookup, RegionRepository};
pub use results::Row;
pub use statement::StatementKind;
pub use types::RowValues;
