use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

use super::{ENGINE, params, query};
use crate::config::DatabaseConfig;
use crate::driver::Driver;
use crate::error::DbError;
use crate::results::Row;
use crate::statement::StatementKind;
use crate::types::RowValues;

/// A live client plus the task driving its socket.
struct PgHandle {
    client: Client,
    connection: JoinHandle<Result<(), tokio_postgres::Error>>,
}

/// Driver over a single `tokio_postgres` client.
pub struct PostgresDriver {
    config: DatabaseConfig,
    handle: Option<PgHandle>,
}

impl PostgresDriver {
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    fn pg_config(&self) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.config.db_hostname)
            .port(self.config.db_port)
            .dbname(&self.config.db_name)
            .user(&self.config.db_username)
            .password(&self.config.db_password);
        cfg
    }

    fn client(&self) -> Result<&Client, DbError> {
        self.handle
            .as_ref()
            .map(|h| &h.client)
            .ok_or(DbError::NotConnected)
    }

    async fn close(handle: PgHandle) -> Result<(), DbError> {
        let PgHandle { client, connection } = handle;
        // Dropping the last client makes the connection task send Terminate and exit.
        drop(client);
        match connection.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DbError::DisconnectError(format!(
                "postgres connection closed with error: {e}"
            ))),
            Err(e) => Err(DbError::DisconnectError(format!(
                "postgres connection task failed: {e}"
            ))),
        }
    }
}

#[async_trait]
impl Driver for PostgresDriver {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    async fn connect(&mut self) -> Result<(), DbError> {
        if let Some(previous) = self.handle.take() {
            if let Err(err) = Self::close(previous).await {
                warn!(error = %err, "closing previous postgres connection failed");
            }
        }

        let cfg = self.pg_config();
        debug!(
            host = %self.config.db_hostname,
            port = self.config.db_port,
            db = %self.config.db_name,
            "postgres connect start"
        );
        let (client, connection) = cfg.connect(NoTls).await.map_err(|e| {
            DbError::ConnectionError(format!(
                "postgres connect to {}:{} failed: {e}",
                self.config.db_hostname, self.config.db_port
            ))
        })?;
        let connection = tokio::spawn(connection);

        self.handle = Some(PgHandle { client, connection });
        Ok(())
    }

    async fn select(&mut self, sql: &str, params: &[RowValues]) -> Result<Vec<Row>, DbError> {
        let client = self.client()?;
        let rows = client
            .query(sql, &params::as_refs(params))
            .await
            .map_err(|e| params::map_error(&e, "select"))?;
        query::build_rows(&rows)
    }

    /// The INSERT effect is `SELECT lastval()` on the same session, i.e. the
    /// last value any sequence produced here. An INSERT that advances no
    /// sequence (explicit id, table without one) reports a stale id from an
    /// earlier insert, or a `QueryError` if none happened yet. In the latter
    /// case the row has already been written under autocommit.
    async fn run(&mut self, sql: &str, params: &[RowValues]) -> Result<i64, DbError> {
        let kind = StatementKind::classify(sql)?;
        let client = self.client()?;

        let affected = client
            .execute(sql, &params::as_refs(params))
            .await
            .map_err(|e| params::map_error(&e, kind.keyword()))?;

        match kind {
            StatementKind::Insert => {
                // Session-local: the value of the last sequence advanced on this connection.
                let row = client
                    .query_one("SELECT lastval()", &[])
                    .await
                    .map_err(|e| {
                        DbError::QueryError(format!("postgres last insert id unavailable: {e}"))
                    })?;
                row.try_get::<_, i64>(0)
                    .map_err(|e| DbError::QueryError(format!("postgres lastval decode error: {e}")))
            }
            StatementKind::Update | StatementKind::Delete => i64::try_from(affected).map_err(|e| {
                DbError::QueryError(format!("postgres affected rows conversion error: {e}"))
            }),
        }
    }

    async fn disconnect(&mut self) -> Result<(), DbError> {
        match self.handle.take() {
            Some(handle) => Self::close(handle).await,
            None => Ok(()),
        }
    }
}
