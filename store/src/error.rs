//! Error type of the store facade.

use stock_store_config::ConfigError;
use stock_store_core::ValidationError;
use stock_store_provider::ProviderError;
use stock_store_sqlite::SqliteError;
use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) operations.
///
/// Construction fails with `Config`, `Validation`, `Provider` or `Storage`;
/// per-call failures leave the stored data unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(SqliteError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No stored row has this ISIN.
    #[error("no stock with isin {0}")]
    NotFound(String),

    /// `add_isin` was called for an ISIN that is already stored.
    #[error("isin {0} is already stored")]
    DuplicateIsin(String),

    /// A filter names a column the schema config does not define.
    #[error("unknown column in filter: {0}")]
    UnknownColumn(String),

    /// A bulk update payload mapped to no usable `isin`.
    #[error("payload for api {api} does not map an isin")]
    MissingIsin { api: String },
}

impl From<SqliteError> for StoreError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::RowNotFound { value, .. } => Self::NotFound(value),
            other => Self::Storage(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(SqliteError::DatabaseError(err))
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_becomes_not_found() {
        let err: StoreError = SqliteError::RowNotFound {
            column: "isin".into(),
            value: "DE0007164600".into(),
        }
        .into();
        assert!(matches!(err, StoreError::NotFound(ref isin) if isin == "DE0007164600"));
    }

    #[test]
    fn test_other_sqlite_errors_stay_storage() {
        let err: StoreError = SqliteError::EmptyRow("stocks".into()).into();
        assert!(matches!(err, StoreError::Storage(SqliteError::EmptyRow(_))));
    }
}
