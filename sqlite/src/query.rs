//! Row access on the stock table.
//!
//! [`StockTable`] reads rows with exact-match [`Filter`]s and writes rows
//! through parameterized statements. Every write runs in its own
//! transaction, which rolls back when an error propagates out of it.
//!
//! # Example
//!
//! ```no_run
//! use rusqlite::Connection;
//! use serde_json::json;
//! use stock_store_core::{Filter, Row};
//! use stock_store_sqlite::StockTable;
//!
//! let conn = Connection::open("stocks.db").unwrap();
//! let table = StockTable::new(&conn, "stocks").unwrap();
//!
//! let row: Row = [("isin", json!("DE0007164600")), ("sym", json!("SAP"))]
//!     .into_iter()
//!     .collect();
//! table.insert(&row).unwrap();
//!
//! let found = table.select_one(&Filter::new().eq("isin", "DE0007164600")).unwrap();
//! assert!(found.is_some());
//! ```

use rusqlite::{Connection, params_from_iter};
use serde_json::Value;
use stock_store_core::{Filter, Row};
use tracing::debug;

use crate::convert::{self, to_sql_value};
use crate::error::{Result, SqliteError};
use crate::schema::{select_sql, validate_identifier};

/// Read and write access to one table.
///
/// Wraps a borrowed connection so several tables (or a reconciler) can share
/// it.
pub struct StockTable<'a> {
    conn: &'a Connection,
    table: String,
}

impl<'a> StockTable<'a> {
    /// Creates an accessor for `table` on `conn`.
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

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns every row matching `filter`, in insertion order.
    pub fn select(&self, filter: &Filter) -> Result<Vec<Row>> {
        self.query(filter, None)
    }

    /// Returns the first row matching `filter`, if any.
    pub fn select_one(&self, filter: &Filter) -> Result<Option<Row>> {
        Ok(self.query(filter, Some(1))?.into_iter().next())
    }

    /// Counts the rows matching `filter`.
    pub fn count(&self, filter: &Filter) -> Result<usize> {
        let columns: Vec<&str> = filter.columns().collect();
        let sql = format!("SELECT COUNT(*) FROM ({})", select_sql(&self.table, &columns, None)?);
        let values: Vec<_> = filter.iter().map(|(_, v)| to_sql_value(v)).collect();

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn query(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<Row>> {
        let columns: Vec<&str> = filter.columns().collect();
        let sql = select_sql(&self.table, &columns, limit)?;
        let values: Vec<_> = filter.iter().map(|(_, v)| to_sql_value(v)).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                convert::read_row(row, &names)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(table = %self.table, conditions = filter.len(), rows = rows.len(), "selected rows");
        Ok(rows)
    }

    /// Inserts `row` as a new record.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::EmptyRow`] for a row without columns and
    /// [`SqliteError::WriteError`] if SQLite rejects the insert. Nothing is
    /// written on error.
    pub fn insert(&self, row: &Row) -> Result<()> {
        let tx = self.begin()?;
        convert::insert_row(&tx, &self.table, row)?;
        tx.commit().map_err(|e| SqliteError::write(&self.table, e))
    }

    /// Overwrites the columns in `row` on the record whose `key_column`
    /// equals `key_value`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::RowNotFound`] if no record matches, in which
    /// case nothing is committed.
    pub fn update(&self, row: &Row, key_column: &str, key_value: &Value) -> Result<usize> {
        let tx = self.begin()?;
        let changed = self.update_existing(&tx, row, key_column, key_value)?;
        tx.commit().map_err(|e| SqliteError::write(&self.table, e))?;
        Ok(changed)
    }

    /// Sets a single column on the record whose `key_column` equals
    /// `key_value`.
    pub fn set_column(
        &self,
        key_column: &str,
        key_value: &Value,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<usize> {
        let mut row = Row::new();
        row.insert(column, value);
        self.update(&row, key_column, key_value)
    }

    /// Applies several keyed updates in one transaction.
    ///
    /// Either every update is committed or none is: the first failure,
    /// including a key that matches no record, rolls the whole batch back.
    /// Returns the total number of records changed.
    pub fn update_batch(&self, key_column: &str, updates: &[(Value, Row)]) -> Result<usize> {
        let tx = self.begin()?;
        let mut changed = 0;
        for (key_value, row) in updates {
            changed += self.update_existing(&tx, row, key_column, key_value)?;
        }
        tx.commit().map_err(|e| SqliteError::write(&self.table, e))?;
        debug!(table = %self.table, updates = updates.len(), changed, "committed batch");
        Ok(changed)
    }

    fn begin(&self) -> Result<rusqlite::Transaction<'a>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| SqliteError::write(&self.table, e))
    }

    fn update_existing(
        &self,
        conn: &Connection,
        row: &Row,
        key_column: &str,
        key_value: &Value,
    ) -> Result<usize> {
        let changed = convert::update_row(conn, &self.table, row, key_column, key_value)?;
        if changed == 0 {
            return Err(SqliteError::RowNotFound {
                column: key_column.to_string(),
                value: key_text(key_value),
            });
        }
        Ok(changed)
    }
}

fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE stocks (isin TEXT, sym TEXT, watchlist INTEGER);
             INSERT INTO stocks VALUES ('A1', 'AAA', 1);
             INSERT INTO stocks VALUES ('B2', 'BBB', NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_stock_table_validates_name() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(StockTable::new(&conn, "stocks").is_ok());
        assert!(StockTable::new(&conn, "x y").is_err());
    }

    #[test]
    fn test_select_in_insertion_order() {
        let conn = setup();
        let table = StockTable::new(&conn, "stocks").unwrap();
        let rows = table.select(&Filter::new()).unwrap();
        let isins: Vec<_> = rows.iter().filter_map(|r| r.get_str("isin")).collect();
        assert_eq!(isins, vec!["A1", "B2"]);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["isin", "sym", "watchlist"]);
    }

    #[test]
    fn test_null_filter_matches_null() {
        let conn = setup();
        let table = StockTable::new(&conn, "stocks").unwrap();
        let rows = table.select(&Filter::new().eq("watchlist", Value::Null)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("isin"), Some("B2"));
    }

    #[test]
    fn test_count() {
        let conn = setup();
        let table = StockTable::new(&conn, "stocks").unwrap();
        assert_eq!(table.count(&Filter::new()).unwrap(), 2);
        assert_eq!(table.count(&Filter::new().eq("watchlist", 1)).unwrap(), 1);
        assert_eq!(table.count(&Filter::new().eq("isin", "ZZ")).unwrap(), 0);
    }

    #[test]
    fn test_update_missing_row() {
        let conn = setup();
        let table = StockTable::new(&conn, "stocks").unwrap();
        let row: Row = [("sym", json!("ZZZ"))].into_iter().collect();
        let err = table.update(&row, "isin", &json!("ZZ")).unwrap_err();
        match err {
            SqliteError::RowNotFound { column, value } => {
                assert_eq!(column, "isin");
                assert_eq!(value, "ZZ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_column() {
        let conn = setup();
        let table = StockTable::new(&conn, "stocks").unwrap();
        table.set_column("isin", &json!("B2"), "watchlist", true).unwrap();
        assert_eq!(table.count(&Filter::new().eq("watchlist", 1)).unwrap(), 2);
    }
}
