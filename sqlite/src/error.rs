//! Error types for SQLite table operations.
//!
//! Provides a unified error type covering reconciliation, writes, reads and
//! identifier validation failures.

use thiserror::Error;

/// Errors that can occur during SQLite table operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite operation failure outside reconciliation and writes (reads,
    /// introspection).
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Creating or altering the table failed.
    #[error("schema error on table '{table}': {source}")]
    SchemaError {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Inserting or updating a row failed; nothing was written.
    #[error("write to table '{table}' failed: {source}")]
    WriteError {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Table or column name is not a plain identifier.
    #[error("invalid identifier '{0}': must start with a letter or underscore and contain only alphanumerics and underscores")]
    InvalidIdentifier(String),

    /// Column type is not a usable type token.
    #[error("invalid column type '{sql_type}' for column '{column}'")]
    InvalidColumnType { column: String, sql_type: String },

    /// A write was attempted with no columns.
    #[error("cannot write an empty row to table '{0}'")]
    EmptyRow(String),

    /// A keyed update matched no row.
    #[error("no row with {column} = {value}")]
    RowNotFound { column: String, value: String },
}

impl SqliteError {
    pub(crate) fn schema(table: &str, source: rusqlite::Error) -> Self {
        Self::SchemaError {
            table: table.to_string(),
            source,
        }
    }

    pub(crate) fn write(table: &str, source: rusqlite::Error) -> Self {
        Self::WriteError {
            table: table.to_string(),
            source,
        }
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
