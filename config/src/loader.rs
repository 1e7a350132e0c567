//! JSON document loading for the schema and field-mapping configs.
//!
//! Each document is read once at startup. Object member order is kept
//! (`serde_json` is built with `preserve_order`), so schema columns are
//! created in the order they are written.
//!
//! ```no_run
//! use stock_store_config::{load_mapping_config, load_schema_config};
//!
//! let schema = load_schema_config("db_config.json").unwrap();
//! let mapping = load_mapping_config("api_field_mapping.json").unwrap();
//! println!("{} columns, {} apis", schema.len(), mapping.len());
//! ```

use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use stock_store_core::{FieldMappingConfig, SchemaConfig};
use tracing::{error, info};

use crate::error::{ConfigError, Result};

/// Loads any JSON document as a generic value tree.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when `path` does not exist and
/// [`ConfigError::Malformed`] when it does not contain valid JSON.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value> {
    load(path.as_ref())
}

/// Loads the schema config (`{ "<column>": "<sql type>", ... }`).
///
/// # Errors
///
/// As [`load_document`]; a document whose values are not strings is
/// reported as [`ConfigError::Malformed`].
pub fn load_schema_config(path: impl AsRef<Path>) -> Result<SchemaConfig> {
    load(path.as_ref())
}

/// Loads the field-mapping config (`{ "<api>": { ...descriptor... }, ... }`).
///
/// # Errors
///
/// As [`load_document`]; a descriptor of the wrong shape is reported as
/// [`ConfigError::Malformed`].
pub fn load_mapping_config(path: impl AsRef<Path>) -> Result<FieldMappingConfig> {
    load(path.as_ref())
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            error!(path = %path.display(), "configuration file not found");
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        error!(path = %path.display(), %source, "error decoding configuration");
        ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(path = %path.display(), "loaded configuration");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.json", "{ \"isin\": ");
        let err = load_schema_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "schema.json", r#"["isin", "TEXT"]"#);
        let err = load_schema_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_schema_config_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "db_config.json",
            r#"{"symbol": "TEXT", "isin": "TEXT", "price": "REAL", "watchlist": "INTEGER"}"#,
        );
        let schema = load_schema_config(&path).unwrap();
        assert_eq!(
            schema.names().collect::<Vec<_>>(),
            vec!["symbol", "isin", "price", "watchlist"]
        );
    }

    #[test]
    fn test_document_loads_any_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.json", r#"{"a": [1, 2, 3]}"#);
        let doc = load_document(&path).unwrap();
        assert_eq!(doc["a"][2], 3);
    }
}
