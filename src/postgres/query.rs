use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio_postgres::types::Type;

use crate::error::DbError;
use crate::results::{Columns, Row};
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` row at the given index.
///
/// # Errors
/// Returns `DbError::QueryError` if the column cannot be decoded.
pub fn extract_value(row: &tokio_postgres::Row, idx: usize) -> Result<RowValues, DbError> {
    let ty = row.columns()[idx].type_();
    let decode = |e: tokio_postgres::Error| {
        DbError::QueryError(format!("postgres column {idx} ({}) decode error: {e}", ty.name()))
    };

    let value = match *ty {
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)
            .map_err(decode)?
            .map(RowValues::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Float(f64::from(v))),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)
            .map_err(decode)?
            .map(RowValues::Float),
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .map_err(decode)?
            .map(RowValues::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(decode)?
            .map(RowValues::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
            .map_err(decode)?
            .map(|v| RowValues::Timestamp(v.naive_utc())),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<Value>>(idx)
            .map_err(decode)?
            .map(RowValues::JSON),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .map_err(decode)?
            .map(RowValues::Blob),
        // text, varchar, bpchar, name and anything else that decodes as a string
        _ => row
            .try_get::<_, Option<String>>(idx)
            .map_err(decode)?
            .map(RowValues::Text),
    };

    Ok(value.unwrap_or(RowValues::Null))
}

/// Convert raw rows into `Row`s sharing one set of column names.
///
/// # Errors
/// Returns errors from value extraction.
pub fn build_rows(rows: &[tokio_postgres::Row]) -> Result<Vec<Row>, DbError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns = Columns::new(
        first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    );

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(extract_value(row, idx)?);
        }
        out.push(Row::new(Arc::clone(&columns), values));
    }
    Ok(out)
}
