use thiserror::Error;

/// Errors surfaced by drivers and the [`Database`](crate::database::Database) facade.
#[derive(Debug, Error)]
pub enum DbError {
    /// The configured engine name has no registered driver. Raised at facade
    /// construction, before any connection attempt.
    #[error("Unrecognised database driver: {0}")]
    UnknownDriver(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A parameter could not be converted to the type its slot expects.
    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    QueryError(String),

    /// A query was attempted without an active connection.
    #[error("Database is not connected.")]
    NotConnected,

    /// `run` was handed something other than INSERT, UPDATE or DELETE.
    #[error("Unsupported statement for run(): {0}")]
    UnsupportedStatement(String),

    #[error("Disconnect error: {0}")]
    DisconnectError(String),
}

impl From<tokio::task::JoinError> for DbError {
    fn from(err: tokio::task::JoinError) -> Self {
        DbError::QueryError(format!("blocking database task failed: {err}"))
    }
}
