use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::error::DbError;
use crate::results::{Columns, Row};
use crate::types::RowValues;

fn query_error(e: rusqlite::Error) -> DbError {
    DbError::QueryError(format!("sqlite error: {e}"))
}

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
/// Returns `DbError::QueryError` if the value cannot be read.
pub fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<RowValues, DbError> {
    let value: Value = row.get(idx).map_err(query_error)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Prepare and run a read statement, collecting every row.
///
/// # Errors
/// Returns `DbError::QueryError` if preparation, execution or extraction fails.
pub fn select_rows(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
    let mut stmt = conn.prepare(sql).map_err(query_error)?;
    let columns = Columns::new(
        stmt.column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect(),
    );

    let mut rows = stmt.query(params_from_iter(params.iter())).map_err(query_error)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(query_error)? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(extract_value(row, idx)?);
        }
        out.push(Row::new(Arc::clone(&columns), values));
    }
    Ok(out)
}

/// Run a write statement and return the number of rows it changed.
///
/// # Errors
/// Returns `DbError::QueryError` if execution fails.
pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<usize, DbError> {
    conn.execute(sql, params_from_iter(params.iter()))
        .map_err(query_error)
}
