//! Configuration loading for the stock store.
//!
//! Two kinds of configuration feed the store:
//!
//! - the JSON documents describing the table schema and the provider field
//!   mappings, read by [`load_schema_config`] and [`load_mapping_config`];
//! - the [`StoreConfig`] settings struct naming those documents, the
//!   database file, the table, and the API credential source.
//!
//! # Quick start
//!
//! ```no_run
//! use stock_store_config::{StoreConfig, load_mapping_config, load_schema_config};
//!
//! let config = StoreConfig::new("stocks.db");
//! let schema = load_schema_config(&config.schema_config).unwrap();
//! let mapping = load_mapping_config(&config.mapping_config).unwrap();
//! let api_key = config.credential.resolve().unwrap();
//! # let _ = (schema, mapping, api_key);
//! ```

mod error;
mod loader;
mod settings;

pub use error::{ConfigError, Result};
pub use loader::{load_document, load_mapping_config, load_schema_config};
pub use settings::{
    CredentialSource, DEFAULT_CREDENTIAL_VAR, DEFAULT_MAPPING_CONFIG, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SCHEMA_CONFIG, DEFAULT_SEARCH_API, DEFAULT_TABLE, StoreConfig,
};
