//! Store settings passed explicitly to the store constructor.
//!
//! [`StoreConfig`] replaces process-wide configuration: every path, name and
//! limit the store needs at startup is a field here, with defaults matching
//! the conventional file layout.
//!
//! ```
//! use std::time::Duration;
//! use stock_store_config::{CredentialSource, StoreConfig};
//!
//! let config = StoreConfig::new("stocks.db")
//!     .with_schema_config("conf/db_config.json")
//!     .with_request_timeout(Duration::from_secs(10));
//!
//! assert_eq!(config.table, "stocks");
//! assert_eq!(config.credential, CredentialSource::Env("FMP_API".into()));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default schema config file name.
pub const DEFAULT_SCHEMA_CONFIG: &str = "db_config.json";
/// Default field-mapping config file name.
pub const DEFAULT_MAPPING_CONFIG: &str = "api_field_mapping.json";
/// Default table name.
pub const DEFAULT_TABLE: &str = "stocks";
/// API used by `add_isin` unless configured otherwise.
pub const DEFAULT_SEARCH_API: &str = "search_isin";
/// Environment variable holding the provider API key.
pub const DEFAULT_CREDENTIAL_VAR: &str = "FMP_API";
/// Outbound request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the provider API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read from the named environment variable at construction time.
    Env(String),
    /// Supplied directly.
    Value(String),
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::Env(DEFAULT_CREDENTIAL_VAR.to_string())
    }
}

impl CredentialSource {
    /// Resolves the API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if the variable is unset,
    /// not valid unicode, or empty, or if a directly supplied key is empty.
    pub fn resolve(&self) -> Result<String> {
        let (var, value) = match self {
            Self::Env(var) => (var.as_str(), std::env::var(var).ok()),
            Self::Value(key) => ("<explicit>", Some(key.clone())),
        };
        value
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var: var.to_string(),
            })
    }
}

/// Everything the store needs to start.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Schema config document.
    pub schema_config: PathBuf,
    /// Field-mapping config document.
    pub mapping_config: PathBuf,
    /// Name of the stock table.
    pub table: String,
    /// API used to resolve ISINs in `add_isin`.
    pub search_api: String,
    /// Provider API key source.
    pub credential: CredentialSource,
    /// Upper bound for a single provider request.
    pub request_timeout: Duration,
}

impl StoreConfig {
    /// Creates a config for `db_path` with every other setting defaulted.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            schema_config: PathBuf::from(DEFAULT_SCHEMA_CONFIG),
            mapping_config: PathBuf::from(DEFAULT_MAPPING_CONFIG),
            table: DEFAULT_TABLE.to_string(),
            search_api: DEFAULT_SEARCH_API.to_string(),
            credential: CredentialSource::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_schema_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_config = path.into();
        self
    }

    pub fn with_mapping_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_config = path.into();
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_search_api(mut self, api: impl Into<String>) -> Self {
        self.search_api = api.into();
        self
    }

    pub fn with_credential(mut self, credential: CredentialSource) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
