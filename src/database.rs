//! Engine-agnostic entry point for the rest of the application.
//!
//! A [`Database`] wraps exactly one [`Driver`], chosen once from a
//! [`DriverRegistry`] by the configured engine name. It owns no connection
//! state itself: before any query it asks the driver whether its connection
//! handle is held and fails with [`DbError::NotConnected`] if not, so drivers
//! never have to repeat that check.
//!
//! ```rust,no_run
//! use region_api::{Database, DatabaseConfig, RowValues};
//!
//! # async fn demo() -> Result<(), region_api::DbError> {
//! let mut db = Database::new(&DatabaseConfig::sqlite("regions.db"))?;
//! let rows = db
//!     .scoped(|db| {
//!         Box::pin(async move {
//!             db.select("SELECT id, name FROM region WHERE id = $1", &[RowValues::Int(5)])
//!                 .await
//!         })
//!     })
//!     .await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::driver::{Driver, DriverRegistry};
use crate::error::DbError;
use crate::results::Row;
use crate::types::RowValues;

pub struct Database {
    driver: Box<dyn Driver>,
    debug: bool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("engine", &self.driver.engine())
            .field("connected", &self.driver.is_connected())
            .finish()
    }
}

impl Database {
    /// Build a facade over one of the drivers compiled into this build.
    ///
    /// # Errors
    /// Returns `DbError::UnknownDriver` if `config.db_driver` names no registered engine.
    pub fn new(config: &DatabaseConfig) -> Result<Self, DbError> {
        Self::from_registry(&DriverRegistry::with_builtin(), config)
    }

    /// Build a facade using the given registry. No connection is attempted.
    ///
    /// # Errors
    /// Returns `DbError::UnknownDriver` if `config.db_driver` is not registered.
    pub fn from_registry(registry: &DriverRegistry, config: &DatabaseConfig) -> Result<Self, DbError> {
        let driver = registry.create(config)?;
        Ok(Self::from_driver(driver, config.db_debug))
    }

    /// Wrap an already-built driver. `debug` enables parameter logging.
    #[must_use]
    pub fn from_driver(driver: Box<dyn Driver>, debug: bool) -> Self {
        Self { driver, debug }
    }

    #[must_use]
    pub fn engine(&self) -> &'static str {
        self.driver.engine()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.driver.is_connected()
    }

    /// Connect to the database. Must be called before any query.
    ///
    /// # Errors
    /// Forwards the driver's `DbError::ConnectionError`.
    pub async fn connect(&mut self) -> Result<(), DbError> {
        let engine = self.driver.engine();
        match self.driver.connect().await {
            Ok(()) => {
                debug!(engine, "database connect succeeded");
                Ok(())
            }
            Err(err) => {
                warn!(engine, error = %err, "database connect failed");
                Err(err)
            }
        }
    }

    /// Close the connection once all queries have completed.
    ///
    /// # Errors
    /// Forwards the driver's `DbError::DisconnectError`.
    pub async fn disconnect(&mut self) -> Result<(), DbError> {
        let engine = self.driver.engine();
        match self.driver.disconnect().await {
            Ok(()) => {
                debug!(engine, "database disconnect succeeded");
                Ok(())
            }
            Err(err) => {
                warn!(engine, error = %err, "database disconnect failed");
                Err(err)
            }
        }
    }

    /// Run a read query and return zero or more rows.
    ///
    /// # Errors
    /// Returns `DbError::NotConnected` without touching the driver when no
    /// connection is held; otherwise forwards the driver's error.
    pub async fn select(&mut self, sql: &str, params: &[RowValues]) -> Result<Vec<Row>, DbError> {
        self.log_dispatch("select", sql, params);
        self.ensure_connected("select")?;

        match self.driver.select(sql, params).await {
            Ok(rows) => {
                debug!(engine = self.driver.engine(), rows = rows.len(), "database select succeeded");
                Ok(rows)
            }
            Err(err) => {
                warn!(engine = self.driver.engine(), error = %err, "database select failed");
                Err(err)
            }
        }
    }

    /// Run an INSERT, UPDATE or DELETE and return its effect value: the last
    /// inserted id for INSERT, otherwise the number of rows touched.
    ///
    /// # Errors
    /// Returns `DbError::NotConnected` without touching the driver when no
    /// connection is held; otherwise forwards the driver's error.
    pub async fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<i64, DbError> {
        self.log_dispatch("run", sql, params);
        self.ensure_connected("run")?;

        match self.driver.run(sql, params).await {
            Ok(effect) => {
                debug!(engine = self.driver.engine(), effect, "database run succeeded");
                Ok(effect)
            }
            Err(err) => {
                warn!(engine = self.driver.engine(), error = %err, "database run failed");
                Err(err)
            }
        }
    }

    /// Run `body` as one unit of work: connect, run the body, then disconnect
    /// whatever the body returned.
    ///
    /// The body's result is returned as-is. A disconnect failure after the
    /// body has run is logged and not reported. If connect fails the body is
    /// skipped and the connect error is returned.
    ///
    /// The closure receives the facade by mutable reference and must return
    /// a boxed future borrowing it, so it may only capture owned values.
    ///
    /// # Errors
    /// Returns the connect error or the body's error.
    pub async fn scoped<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        F: for<'a> FnOnce(&'a mut Database) -> BoxFuture<'a, Result<T, E>>,
        E: From<DbError>,
    {
        self.connect().await?;
        let outcome = body(self).await;
        if let Err(err) = self.disconnect().await {
            warn!(engine = self.driver.engine(), error = %err, "unit of work left connection unclosed");
        }
        outcome
    }

    fn ensure_connected(&self, op: &'static str) -> Result<(), DbError> {
        if self.driver.is_connected() {
            Ok(())
        } else {
            warn!(engine = self.driver.engine(), op, "query attempted without a connection");
            Err(DbError::NotConnected)
        }
    }

    fn log_dispatch(&self, op: &'static str, sql: &str, params: &[RowValues]) {
        if self.debug {
            debug!(engine = self.driver.engine(), op, sql, ?params, "database query dispatched");
        } else {
            debug!(engine = self.driver.engine(), op, sql, "database query dispatched");
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.driver.is_connected() {
            warn!(
                engine = self.driver.engine(),
                "database dropped while connected; releasing connection without disconnect"
            );
        }
    }
}
