// PostgreSQL driver
//
// - params: binding `RowValues` as tokio-postgres parameters
// - query: turning tokio-postgres rows into `Row`s
// - driver: the `Driver` implementation over one client connection

pub mod driver;
pub mod params;
pub mod query;

pub use driver::PostgresDriver;

/// Engine name the driver is registered under.
pub const ENGINE: &str = "postgres";
