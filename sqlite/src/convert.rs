//! Conversion between JSON rows and SQLite values.
//!
//! Rows travel through the store as [`Row`]s of JSON scalars. This module
//! maps them onto SQLite storage classes and back:
//!
//! | JSON            | SQLite                       |
//! |-----------------|------------------------------|
//! | `null`          | NULL                         |
//! | `true`/`false`  | INTEGER 1/0                  |
//! | integer number  | INTEGER                      |
//! | other number    | REAL                         |
//! | string          | TEXT                         |
//! | array/object    | TEXT holding the JSON text   |
//!
//! Reading back, INTEGER and REAL become numbers and TEXT becomes a string,
//! so booleans come back as `0`/`1`. BLOBs, which the store never writes,
//! are read as an array of byte values.
//!
//! The row-level helpers take a plain `&Connection` so they can run inside a
//! caller's transaction.

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use serde_json::{Number, Value};
use stock_store_core::Row;
use tracing::debug;

use crate::error::{Result, SqliteError};
use crate::schema::{insert_sql, update_sql};

/// Converts a JSON value to the SQLite value bound for it.
pub(crate) fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Converts a stored SQLite value back to JSON.
pub(crate) fn from_sql_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

/// Reads one result row into a [`Row`] keyed by `names`.
pub(crate) fn read_row(row: &rusqlite::Row<'_>, names: &[String]) -> rusqlite::Result<Row> {
    let mut out = Row::new();
    for (i, name) in names.iter().enumerate() {
        out.insert(name.clone(), from_sql_ref(row.get_ref(i)?));
    }
    Ok(out)
}

/// Inserts `row` into `table`, binding every value.
///
/// # Errors
///
/// Returns [`SqliteError::EmptyRow`] for a row with no columns,
/// [`SqliteError::InvalidIdentifier`] for a bad column name and
/// [`SqliteError::WriteError`] if SQLite rejects the statement.
pub(crate) fn insert_row(conn: &Connection, table: &str, row: &Row) -> Result<()> {
    let columns: Vec<&str> = row.columns().collect();
    let sql = insert_sql(table, &columns)?;
    let values: Vec<SqlValue> = row.iter().map(|(_, v)| to_sql_value(v)).collect();

    conn.execute(&sql, params_from_iter(values.iter()))
        .map_err(|e| SqliteError::write(table, e))?;
    debug!(table, columns = columns.len(), "inserted row");
    Ok(())
}

/// Sets every column of `row` on the rows whose `key_column` equals
/// `key_value`. Returns the number of rows changed.
pub(crate) fn update_row(
    conn: &Connection,
    table: &str,
    row: &Row,
    key_column: &str,
    key_value: &Value,
) -> Result<usize> {
    let columns: Vec<&str> = row.columns().collect();
    let sql = update_sql(table, &columns, key_column)?;
    let mut values: Vec<SqlValue> = row.iter().map(|(_, v)| to_sql_value(v)).collect();
    values.push(to_sql_value(key_value));

    let changed = conn
        .execute(&sql, params_from_iter(values.iter()))
        .map_err(|e| SqliteError::write(table, e))?;
    debug!(table, key_column, changed, "updated rows");
    Ok(changed)
}
