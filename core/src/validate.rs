//! Startup validation of the schema and field-mapping configs.
//!
//! Both checks are fail-fast gates: the first violation is returned and the
//! store must refuse to initialize. Catching a mapping that targets an
//! undefined column here keeps ingestion from failing halfway through a
//! write later on.
//!
//! # Examples
//!
//! ```
//! use stock_store_core::*;
//!
//! let schema = SchemaConfig::new().with_column("isin", "TEXT");
//! let good = FieldMappingConfig::new().with_api(
//!     "search_isin",
//!     ApiDescriptor::new("https://example.test/", "0")
//!         .with_mapping(FieldMapping::new().with_rule("isin", "isin")),
//! );
//! assert!(validate_mapping(&good, &schema).is_ok());
//!
//! let bad = FieldMappingConfig::new().with_api(
//!     "search_isin",
//!     ApiDescriptor::new("https://example.test/", "0")
//!         .with_mapping(FieldMapping::new().with_rule("symbol", "sym")),
//! );
//! assert!(matches!(
//!     validate_mapping(&bad, &schema),
//!     Err(ValidationError::MappingInconsistent { .. })
//! ));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{FieldMappingConfig, SchemaConfig};

/// Config validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The schema config defines no columns.
    #[error("schema config must define at least one column")]
    EmptySchema,
    /// A column name is not a plain SQL identifier.
    #[error("invalid column name: {0:?}")]
    InvalidColumnName(String),
    /// A column type is empty or contains characters outside a type token.
    #[error("invalid type {sql_type:?} for column '{column}'")]
    InvalidColumnType { column: String, sql_type: String },
    /// A column the store depends on is absent from the schema config.
    #[error("schema config is missing required column: {0}")]
    MissingKeyColumn(String),
    /// A mapping writes to a column the schema config does not define.
    #[error("no database column for api mapping: {api} - {field} : {column}")]
    MappingInconsistent {
        api: String,
        field: String,
        column: String,
    },
}

/// Returns `true` if `name` is a plain SQL identifier: an ASCII letter or
/// underscore followed by ASCII alphanumerics or underscores.
///
/// ```
/// use stock_store_core::is_identifier;
///
/// assert!(is_identifier("market_cap"));
/// assert!(!is_identifier("1st"));
/// assert!(!is_identifier("name; DROP TABLE stocks"));
/// ```
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns `true` if `token` looks like a column type declaration such as
/// `TEXT`, `VARCHAR(12)`, `NUMERIC(10, 2)` or `INTEGER DEFAULT 0`.
///
/// Parentheses and single quotes must balance, and a comma is only
/// accepted inside parentheses or quotes, so a token can never declare a
/// second column.
pub fn is_type_token(token: &str) -> bool {
    if token.trim().is_empty() {
        return false;
    }

    let mut depth = 0usize;
    let mut quoted = false;
    for c in token.chars() {
        match c {
            '\'' => quoted = !quoted,
            _ if quoted => {
                if !(c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || "_(),.-".contains(c)) {
                    return false;
                }
            }
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            ',' if depth == 0 => return false,
            _ if c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || "_,.-".contains(c) => {}
            _ => return false,
        }
    }
    depth == 0 && !quoted
}

/// Validates the schema config on its own.
///
/// # Errors
///
/// Returns [`ValidationError::EmptySchema`] for an empty config, or the
/// first [`InvalidColumnName`](ValidationError::InvalidColumnName) /
/// [`InvalidColumnType`](ValidationError::InvalidColumnType) found in
/// document order.
pub fn validate_schema_config(schema: &SchemaConfig) -> Result<(), ValidationError> {
    if schema.is_empty() {
        return Err(ValidationError::EmptySchema);
    }
    for column in schema.columns() {
        if !is_identifier(&column.name) {
            return Err(ValidationError::InvalidColumnName(column.name.clone()));
        }
        if !is_type_token(&column.sql_type) {
            return Err(ValidationError::InvalidColumnType {
                column: column.name.clone(),
                sql_type: column.sql_type.clone(),
            });
        }
    }
    Ok(())
}

/// Checks that every name in `required` is a column of `schema`.
pub fn require_columns(schema: &SchemaConfig, required: &[&str]) -> Result<(), ValidationError> {
    match required.iter().find(|name| !schema.contains(name)) {
        Some(missing) => Err(ValidationError::MissingKeyColumn(missing.to_string())),
        None => Ok(()),
    }
}

/// Cross-checks every mapping target against the schema config.
///
/// APIs and their rules are visited in document order; the first rule whose
/// column is not defined by `schema` fails the check.
///
/// # Errors
///
/// Returns [`ValidationError::MappingInconsistent`] naming the API, the
/// provider field and the undefined column.
pub fn validate_mapping(
    mapping: &FieldMappingConfig,
    schema: &SchemaConfig,
) -> Result<(), ValidationError> {
    let columns: HashSet<&str> = schema.names().collect();

    for (api, descriptor) in mapping.iter() {
        for rule in descriptor.mapping.rules() {
            if !columns.contains(rule.column.as_str()) {
                return Err(ValidationError::MappingInconsistent {
                    api: api.to_string(),
                    field: rule.api_field.clone(),
                    column: rule.column.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{ApiDescriptor, FieldMapping};

    use super::*;

    fn api(rules: &[(&str, &str)]) -> ApiDescriptor {
        let mapping = rules
            .iter()
            .fold(FieldMapping::new(), |m, (field, column)| m.with_rule(*field, *column));
        ApiDescriptor::new("https://example.test/", "0").with_mapping(mapping)
    }

    #[test]
    fn test_validate_mapping_names_offender() {
        let schema = SchemaConfig::new().with_column("c2", "TEXT");
        let mapping = FieldMappingConfig::new().with_api("apiX", api(&[("f1", "c1")]));

        assert_eq!(
            validate_mapping(&mapping, &schema),
            Err(ValidationError::MappingInconsistent {
                api: "apiX".to_string(),
                field: "f1".to_string(),
                column: "c1".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_mapping_stops_at_first_violation() {
        let schema = SchemaConfig::new().with_column("isin", "TEXT");
        let mapping = FieldMappingConfig::new()
            .with_api("first", api(&[("isin", "isin"), ("a", "missing_a")]))
            .with_api("second", api(&[("b", "missing_b")]));

        let err = validate_mapping(&mapping, &schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no database column for api mapping: first - a : missing_a"
        );
    }

    #[test]
    fn test_validate_mapping_accepts_consistent_config() {
        let schema = SchemaConfig::new()
            .with_column("isin", "TEXT")
            .with_column("sym", "TEXT");
        let mapping = FieldMappingConfig::new()
            .with_api("search_isin", api(&[("symbol", "sym"), ("isin", "isin")]))
            .with_api("quote", api(&[("symbol", "sym")]));

        assert!(validate_mapping(&mapping, &schema).is_ok());
    }

    #[test]
    fn test_validate_schema_config_rejects_empty() {
        assert_eq!(
            validate_schema_config(&SchemaConfig::new()),
            Err(ValidationError::EmptySchema)
        );
    }

    #[test]
    fn test_validate_schema_config_rejects_bad_names_and_types() {
        let schema = SchemaConfig::new().with_column("price value", "REAL");
        assert_eq!(
            validate_schema_config(&schema),
            Err(ValidationError::InvalidColumnName("price value".to_string()))
        );

        let schema = SchemaConfig::new().with_column("price", "REAL; DROP TABLE stocks");
        assert!(matches!(
            validate_schema_config(&schema),
            Err(ValidationError::InvalidColumnType { .. })
        ));
    }

    #[test]
    fn test_type_tokens() {
        assert!(is_type_token("TEXT"));
        assert!(is_type_token("NUMERIC(10, 2)"));
        assert!(is_type_token("TEXT DEFAULT 'none'"));
        assert!(is_type_token("INTEGER DEFAULT 0"));
        assert!(!is_type_token("   "));
        assert!(!is_type_token("TEXT; --"));
    }

    #[test]
    fn test_type_token_cannot_declare_extra_column() {
        assert!(!is_type_token("TEXT, extra TEXT"));
        assert!(!is_type_token("TEXT DEFAULT 'open"));
        assert!(!is_type_token("NUMERIC(10, 2"));
        assert!(!is_type_token("TEXT)"));
        assert!(is_type_token("TEXT DEFAULT 'a, b'"));
        assert!(is_type_token("REAL NOT NULL DEFAULT -10.0"));
    }

    #[test]
    fn test_require_columns() {
        let schema = SchemaConfig::new().with_column("isin", "TEXT");
        assert!(require_columns(&schema, &["isin"]).is_ok());
        assert_eq!(
            require_columns(&schema, &["isin", "watchlist"]),
            Err(ValidationError::MissingKeyColumn("watchlist".to_string()))
        );
    }
}
