//! SQLite storage backend for the stock store.
//!
//! This crate owns the single stock table: it keeps the physical schema in
//! line with the configured [`SchemaConfig`](stock_store_core::SchemaConfig)
//! and reads and writes [`Row`](stock_store_core::Row)s through
//! parameterized statements.
//!
//! # Architecture
//!
//! - **`schema`**: identifier validation and SQL generation
//! - **`migration`**: additive reconciliation (create table / add columns)
//! - **`convert`**: JSON ↔ SQLite value conversion and row-level writes
//! - **`query`**: filtered reads and transactional writes
//!
//! # Quick start
//!
//! ```no_run
//! use rusqlite::Connection;
//! use stock_store_core::{Filter, SchemaConfig};
//! use stock_store_sqlite::{Reconciler, StockTable};
//!
//! let conn = Connection::open("stocks.db").unwrap();
//! let schema = SchemaConfig::new()
//!     .with_column("isin", "TEXT")
//!     .with_column("sym", "TEXT")
//!     .with_column("watchlist", "INTEGER");
//! Reconciler::new(&conn, "stocks").unwrap().reconcile(&schema).unwrap();
//!
//! let table = StockTable::new(&conn, "stocks").unwrap();
//! for row in table.select(&Filter::new().eq("watchlist", 1)).unwrap() {
//!     println!("{:?}", row.get_str("sym"));
//! }
//! ```
//!
//! Table and column names must be plain identifiers; they are double-quoted
//! in generated SQL.

mod convert;
mod error;
mod migration;
mod query;
mod schema;

pub use error::{Result, SqliteError};
pub use migration::{ReconcileReport, Reconciler};
pub use query::StockTable;
pub use schema::{generate_add_column_sql, generate_create_sql};
