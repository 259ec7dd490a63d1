use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use super::{ENGINE, params::Params, query};
use crate::config::DatabaseConfig;
use crate::driver::Driver;
use crate::error::DbError;
use crate::results::Row;
use crate::statement::StatementKind;
use crate::translation::translate_placeholders;
use crate::types::RowValues;

/// Driver over a single `rusqlite` connection.
///
/// `db_name` is the path of an existing database file; the network settings
/// are ignored. Every call runs on tokio's blocking pool: the connection is
/// moved into the blocking task and put back once it finishes. `$N`
/// placeholders are rewritten to `?N` so they bind by number.
pub struct SqliteDriver {
    config: DatabaseConfig,
    conn: Option<Connection>,
}

impl SqliteDriver {
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config, conn: None }
    }

    async fn with_conn<T, F>(&mut self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.take().ok_or(DbError::NotConnected)?;
        let (conn, result) = tokio::task::spawn_blocking(move || {
            let result = f(&conn);
            (conn, result)
        })
        .await
        .map_err(|e| {
            // The connection went down with the task.
            warn!(error = %e, "sqlite blocking task failed; connection lost");
            DbError::from(e)
        })?;
        self.conn = Some(conn);
        result
    }
}

#[async_trait]
impl Driver for SqliteDriver {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn connect(&mut self) -> Result<(), DbError> {
        let path = self.config.db_name.clone();
        debug!(path = %path, "sqlite connect start");

        let conn = tokio::task::spawn_blocking(move || {
            // No SQLITE_OPEN_CREATE: a mistyped path fails here instead of
            // yielding an empty database.
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            Connection::open_with_flags(&path, flags)
                .map_err(|e| DbError::ConnectionError(format!("sqlite open {path} failed: {e}")))
        })
        .await
        .map_err(|e| DbError::ConnectionError(format!("sqlite open task failed: {e}")))??;

        // Replacing the handle drops (and closes) any previous connection.
        self.conn = Some(conn);
        Ok(())
    }

    async fn select(&mut self, sql: &str, params: &[RowValues]) -> Result<Vec<Row>, DbError> {
        let sql = translate_placeholders(sql).into_owned();
        let params = Params::convert(params);
        self.with_conn(move |conn| query::select_rows(conn, &sql, params.as_values()))
            .await
    }

    async fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<i64, DbError> {
        let kind = StatementKind::classify(sql)?;
        let sql = translate_placeholders(sql).into_owned();
        let params = Params::convert(params);

        self.with_conn(move |conn| {
            let changed = query::execute(conn, &sql, params.as_values())?;
            match kind {
                StatementKind::Insert => Ok(conn.last_insert_rowid()),
                StatementKind::Update | StatementKind::Delete => i64::try_from(changed)
                    .map_err(|e| DbError::QueryError(format!("sqlite change count overflow: {e}"))),
            }
        })
        .await
    }

    async fn disconnect(&mut self) -> Result<(), DbError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        let result = tokio::task::spawn_blocking(move || conn.close())
            .await
            .map_err(|e| DbError::DisconnectError(format!("sqlite close task failed: {e}")))?;

        match result {
            Ok(()) => Ok(()),
            Err((conn, e)) => {
                // Keep the handle so the caller can retry.
                self.conn = Some(conn);
                Err(DbError::DisconnectError(format!("sqlite close failed: {e}")))
            }
        }
    }
}
