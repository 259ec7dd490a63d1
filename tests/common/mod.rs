#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use region_api::{DatabaseConfig, DbError, Driver, DriverRegistry, Row, RowValues};

pub const DOUBLE_ENGINE: &str = "double";

/// Call counters shared between a test and every driver its factory builds.
#[derive(Debug, Default)]
pub struct Calls {
    pub created: AtomicUsize,
    pub connect: AtomicUsize,
    pub select: AtomicUsize,
    pub run: AtomicUsize,
    pub disconnect: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Canned responses for the recording driver.
#[derive(Debug, Clone)]
pub struct Script {
    pub rows: Result<Vec<Row>, String>,
    pub effect: Result<i64, String>,
    pub connect_error: Option<String>,
    pub disconnect_error: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            rows: Ok(Vec::new()),
            effect: Ok(0),
            connect_error: None,
            disconnect_error: None,
        }
    }
}

impl Script {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Ok(rows),
            ..Self::default()
        }
    }

    pub fn failing_select(message: &str) -> Self {
        Self {
            rows: Err(message.to_string()),
            ..Self::default()
        }
    }
}

pub fn region_row(id: i64, name: &str) -> Row {
    Row::from_pairs([("id", RowValues::Int(id)), ("name", RowValues::Text(name.into()))])
}

/// Test double that records every call and answers from a `Script`.
pub struct RecordingDriver {
    calls: Arc<Calls>,
    script: Script,
    connected: bool,
}

impl RecordingDriver {
    pub fn new(calls: Arc<Calls>, script: Script) -> Self {
        calls.created.fetch_add(1, Ordering::SeqCst);
        Self {
            calls,
            script,
            connected: false,
        }
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    fn engine(&self) -> &'static str {
        DOUBLE_ENGINE
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn connect(&mut self) -> Result<(), DbError> {
        self.calls.connect.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.script.connect_error {
            return Err(DbError::ConnectionError(message.clone()));
        }
        self.connected = true;
        Ok(())
    }

    async fn select(&mut self, _sql: &str, _params: &[RowValues]) -> Result<Vec<Row>, DbError> {
        self.calls.select.fetch_add(1, Ordering::SeqCst);
        self.script.rows.clone().map_err(DbError::QueryError)
    }

    async fn run(&mut self, _sql: &str, _params: &[RowValues]) -> Result<i64, DbError> {
        self.calls.run.fetch_add(1, Ordering::SeqCst);
        self.script.effect.clone().map_err(DbError::QueryError)
    }

    async fn disconnect(&mut self) -> Result<(), DbError> {
        self.calls.disconnect.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.script.disconnect_error {
            return Err(DbError::DisconnectError(message.clone()));
        }
        self.connected = false;
        Ok(())
    }
}

/// Registry holding only the recording driver, plus the config selecting it.
pub fn double_registry(script: Script) -> (DriverRegistry, DatabaseConfig, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let factory_calls = Arc::clone(&calls);
    let mut registry = DriverRegistry::new();
    registry.register(DOUBLE_ENGINE, move |_config| {
        Box::new(RecordingDriver::new(Arc::clone(&factory_calls), script.clone()))
    });
    let config = DatabaseConfig {
        db_driver: DOUBLE_ENGINE.to_string(),
        ..DatabaseConfig::default()
    };
    (registry, config, calls)
}
