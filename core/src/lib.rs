//! Core types and validation for the configuration-driven stock store.
//!
//! This crate defines the data model shared by the loader, the provider
//! translator and the SQLite backend:
//!
//! - [`SchemaConfig`]: ordered column name → SQL type declarations that
//!   define the stock table.
//! - [`FieldMappingConfig`]: per-API request description
//!   ([`ApiDescriptor`]) and response field → column translation
//!   ([`FieldMapping`]).
//! - [`Row`]: one stored security as an ordered column → value container.
//! - [`Filter`]: exact-match column conditions for reads.
//!
//! Validation ([`validate_schema_config`], [`validate_mapping`]) is the
//! startup gate that keeps a mapping from targeting a column the schema
//! does not define.
//!
//! # Example
//!
//! ```
//! use stock_store_core::*;
//!
//! let schema = SchemaConfig::new()
//!     .with_column("isin", "TEXT")
//!     .with_column("sym", "TEXT")
//!     .with_column("watchlist", "INTEGER");
//!
//! let mapping = FieldMappingConfig::new().with_api(
//!     "search_isin",
//!     ApiDescriptor::new("https://example.test/search", "result")
//!         .with_search_param("isin")
//!         .with_mapping(FieldMapping::new().with_rule("symbol", "sym")),
//! );
//!
//! assert!(validate_schema_config(&schema).is_ok());
//! assert!(validate_mapping(&mapping, &schema).is_ok());
//! ```

mod row;
mod types;
mod validate;

pub use row::{Filter, Row};
pub use types::*;
pub use validate::{
    ValidationError, is_identifier, is_type_token, require_columns, validate_mapping,
    validate_schema_config,
};
