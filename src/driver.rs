use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::error::DbError;
use crate::results::Row;
use crate::types::RowValues;

/// Contract every engine-specific driver implements.
///
/// A driver owns at most one connection handle. The handle is set by a
/// successful [`connect`](Driver::connect) and cleared by a successful
/// [`disconnect`](Driver::disconnect). Drivers do not guard `select`/`run`
/// against a missing connection themselves; the facade checks
/// [`is_connected`](Driver::is_connected) before delegating.
#[async_trait]
pub trait Driver: Send {
    /// Engine name this driver is registered under.
    fn engine(&self) -> &'static str;

    /// Whether the connection handle is currently held.
    fn is_connected(&self) -> bool;

    /// Open the connection described by the driver's configuration.
    async fn connect(&mut self) -> Result<(), DbError>;

    /// Execute a parameterized read; returns every row, in order.
    async fn select(&mut self, sql: &str, params: &[RowValues]) -> Result<Vec<Row>, DbError>;

    /// Execute a parameterized INSERT, UPDATE or DELETE and return its effect value.
    async fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<i64, DbError>;

    /// Close the connection. A no-op when not connected.
    async fn disconnect(&mut self) -> Result<(), DbError>;
}

/// Factory producing an unconnected driver. Must not perform I/O.
pub type DriverFactory = Arc<dyn Fn(&DatabaseConfig) -> Box<dyn Driver> + Send + Sync>;

/// Maps engine names to driver factories.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: BTreeMap<String, DriverFactory>,
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("engines", &self.names())
            .finish()
    }
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every engine compiled into this build.
    #[must_use]
    pub fn with_builtin() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "postgres")]
        registry.register(crate::postgres::ENGINE, |config| {
            Box::new(crate::postgres::PostgresDriver::new(config.clone()))
        });
        #[cfg(feature = "sqlite")]
        registry.register(crate::sqlite::ENGINE, |config| {
            Box::new(crate::sqlite::SqliteDriver::new(config.clone()))
        });
        registry
    }

    /// Add a factory, replacing any existing one under the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&DatabaseConfig) -> Box<dyn Driver> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered engine names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the driver named by `config.db_driver`.
    ///
    /// # Errors
    /// Returns `DbError::UnknownDriver` if no factory is registered under that name.
    pub fn create(&self, config: &DatabaseConfig) -> Result<Box<dyn Driver>, DbError> {
        let factory = self
            .factories
            .get(&config.db_driver)
            .ok_or_else(|| DbError::UnknownDriver(config.db_driver.clone()))?;
        Ok(factory(config))
    }
}
