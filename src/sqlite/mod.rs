// SQLite driver
//
// - params: converting `RowValues` into rusqlite values
// - query: reading rusqlite rows back into `Row`s
// - driver: the `Driver` implementation over one connection

pub mod driver;
pub mod params;
pub mod query;

pub use driver::SqliteDriver;

/// Engine name the driver is registered under.
pub const ENGINE: &str = "sqlite";
