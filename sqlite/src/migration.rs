//! Additive schema reconciliation.
//!
//! [`Reconciler`] brings the stock table in line with a [`SchemaConfig`]:
//! it creates the table when it does not exist and otherwise adds every
//! configured column the table lacks. It never drops, renames or retypes a
//! column, so existing rows survive any config change.
//!
//! All statements of one reconciliation run in a single transaction.
//!
//! # Example
//!
//! ```no_run
//! use rusqlite::Connection;
//! use stock_store_core::SchemaConfig;
//! use stock_store_sqlite::Reconciler;
//!
//! let conn = Connection::open("stocks.db").unwrap();
//! let schema = SchemaConfig::new()
//!     .with_column("isin", "TEXT")
//!     .with_column("watchlist", "INTEGER");
//!
//! let report = Reconciler::new(&conn, "stocks").unwrap().reconcile(&schema).unwrap();
//! println!("created: {}, added: {:?}", report.created, report.added_columns);
//! ```

use rusqlite::{Connection, params};
use stock_store_core::SchemaConfig;
use tracing::info;

use crate::error::{Result, SqliteError};
use crate::schema::{generate_add_column_sql, generate_create_sql, validate_identifier};

/// Reconciles one table against a schema config.
pub struct Reconciler<'a> {
    conn: &'a Connection,
    table: String,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler for `table` on `conn`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidIdentifier`] if the table name is not a
    /// plain identifier.
    pub fn new(conn: &'a Connection, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self { conn, table })
    }

    /// Returns `true` if the table exists.
    pub fn table_exists(&self) -> Result<bool> {
        table_exists(self.conn, &self.table)
    }

    /// Returns the table's column names in table order; empty if the table
    /// does not exist.
    pub fn columns(&self) -> Result<Vec<String>> {
        columns(self.conn, &self.table)
    }

    /// Creates the table or adds missing columns so that every column of
    /// `schema` exists.
    ///
    /// Column names are matched ASCII case-insensitively, as SQLite does.
    /// Columns present in the table but not in `schema` are left alone.
    /// Calling this again with the same schema changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidIdentifier`] or
    /// [`SqliteError::InvalidColumnType`] before touching the database if
    /// the config is unusable, and [`SqliteError::SchemaError`] if a
    /// statement fails. On error nothing is changed.
    pub fn reconcile(&self, schema: &SchemaConfig) -> Result<ReconcileReport> {
        let create_sql = generate_create_sql(&self.table, schema)?;
        let schema_err = |e| SqliteError::schema(&self.table, e);

        let tx = self.conn.unchecked_transaction().map_err(schema_err)?;
        let mut report = ReconcileReport::default();

        if !table_exists(&tx, &self.table)? {
            tx.execute(&create_sql, []).map_err(schema_err)?;
            tx.commit().map_err(schema_err)?;
            info!(table = %self.table, columns = schema.len(), "created table");
            report.created = true;
            return Ok(report);
        }

        let existing = columns(&tx, &self.table)?;
        for column in schema.columns() {
            if existing.iter().any(|e| e.eq_ignore_ascii_case(&column.name)) {
                continue;
            }
            let sql = generate_add_column_sql(&self.table, &column.name, &column.sql_type)?;
            tx.execute(&sql, []).map_err(schema_err)?;
            report.added_columns.push(column.name.clone());
        }
        tx.commit().map_err(schema_err)?;

        for column in &report.added_columns {
            info!(
                table = %self.table,
                column = %column,
                sql_type = schema.get(column).unwrap_or_default(),
                "added column"
            );
        }
        Ok(report)
    }
}

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The table did not exist and was created.
    pub created: bool,
    /// Columns added to an existing table, in schema order.
    pub added_columns: Vec<String>,
}

impl ReconcileReport {
    /// `true` if the table already matched the schema.
    pub fn is_unchanged(&self) -> bool {
        !self.created && self.added_columns.is_empty()
    }
}

/// Table names resolve case-insensitively in SQLite, so `Stocks` is the
/// same table as `stocks`.
fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt
        .query_map(params![table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}
