//! Configuration-driven stock metadata store.
//!
//! A [`Store`] keeps one SQLite table of securities keyed by ISIN. The
//! table's columns come from a JSON schema config, and a second JSON config
//! describes, per external API, how to request data and which response field
//! lands in which column. Both configs are checked against each other before
//! any request is made, and the table is migrated additively at startup.
//!
//! # Quick start
//!
//! ```no_run
//! use stock_store::{CredentialSource, Filter, Store, StoreConfig};
//!
//! let config = StoreConfig::new("stocks.db")
//!     .with_schema_config("config/db_config.json")
//!     .with_mapping_config("config/api_field_mapping.json")
//!     .with_credential(CredentialSource::Env("FMP_API".into()));
//!
//! let store = Store::open(&config).unwrap();
//! store.add_isin("US0378331005").unwrap();
//!
//! let usd = Filter::new().eq("currency", "USD");
//! for row in store.get_all(Some(&usd)).unwrap() {
//!     println!("{:?} {:?}", row.get_str("isin"), row.get_str("symbol"));
//! }
//! ```
//!
//! # Config files
//!
//! Schema config (`db_config.json`), column name to SQL type:
//!
//! ```json
//! { "isin": "TEXT", "symbol": "TEXT", "price": "REAL", "watchlist": "INTEGER" }
//! ```
//!
//! Field-mapping config (`api_field_mapping.json`), one entry per API:
//!
//! ```json
//! {
//!   "search_isin": {
//!     "base_url": "https://financialmodelingprep.com/api/v4/search/isin",
//!     "search_param": "isin",
//!     "default_params": {},
//!     "first_entry": "0",
//!     "mapping": { "symbol": "symbol", "isin": "isin", "price": "price" }
//!   }
//! }
//! ```
//!
//! The API key is read from the `FMP_API` environment variable unless
//! [`StoreConfig::credential`] says otherwise.

mod error;
mod store;

pub use error::{Result, StoreError};
pub use store::{ISIN_COLUMN, Store, UpdateReport, WATCHLIST_COLUMN};

pub use stock_store_config::{ConfigError, CredentialSource, StoreConfig};
pub use stock_store_core::{Filter, Row, SchemaConfig, ValidationError};
pub use stock_store_provider::{HttpResponse, ProviderError, Transport};
pub use stock_store_sqlite::{ReconcileReport, SqliteError};
