//! External stock-data API access.
//!
//! This crate resolves a configured API ([`ApiDescriptor`]) and a search key
//! into a provider request, executes it over a [`Transport`], and projects
//! the JSON response into a [`Row`] through the API's field mapping.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use stock_store_core::{ApiDescriptor, FieldMapping, FieldMappingConfig};
//! use stock_store_provider::{ApiTranslator, HttpTransport};
//!
//! let apis = FieldMappingConfig::new().with_api(
//!     "search_isin",
//!     ApiDescriptor::new("https://financialmodelingprep.com/api/v4/search/isin", "0")
//!         .with_search_param("isin")
//!         .with_mapping(FieldMapping::new().with_rule("symbol", "symbol")),
//! );
//!
//! let transport = HttpTransport::new(Duration::from_secs(30)).unwrap();
//! let translator = ApiTranslator::new(apis, "my-api-key", Box::new(transport));
//! let row = translator.fetch_and_map("search_isin", "DE0007164600").unwrap();
//! println!("{:?}", row.get_str("symbol"));
//! ```
//!
//! [`ApiDescriptor`]: stock_store_core::ApiDescriptor
//! [`Row`]: stock_store_core::Row

mod error;
mod translate;
mod transport;

pub use error::{ProviderError, Result};
pub use translate::{API_KEY_PARAM, ApiRequest, ApiTranslator, extract_entry, map_fields};
pub use transport::{HttpResponse, HttpTransport, Transport};
