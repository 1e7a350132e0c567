//! Configuration type definitions for the stock store.
//!
//! This module defines the two declarative documents the store is driven
//! by: the [`SchemaConfig`] (column name → SQL type) and the
//! [`FieldMappingConfig`] (API name → [`ApiDescriptor`]). Both preserve the
//! insertion order of the JSON documents they are read from.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A single column definition from the schema config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name (a plain SQL identifier).
    pub name: String,
    /// Storage type token, e.g. `TEXT`, `REAL`, `INTEGER`.
    pub sql_type: String,
}

/// Ordered set of table columns derived from the schema config document.
///
/// Serialized as a JSON object `{ "<column>": "<sql type>", ... }`. Column
/// order is the document order and only matters when the table is first
/// created.
///
/// # Examples
///
/// ```
/// use stock_store_core::SchemaConfig;
///
/// let schema = SchemaConfig::new()
///     .with_column("isin", "TEXT")
///     .with_column("price", "REAL");
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.get("price"), Some("REAL"));
/// assert!(!schema.contains("volume"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct SchemaConfig {
    columns: Vec<ColumnDef>,
}

impl SchemaConfig {
    /// Creates an empty schema config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, builder style. See [`push`](Self::push).
    pub fn with_column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.push(name, sql_type);
        self
    }

    /// Adds a column, replacing the type of an existing column of the same
    /// name in place.
    pub fn push(&mut self, name: impl Into<String>, sql_type: impl Into<String>) {
        let name = name.into();
        let sql_type = sql_type.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.sql_type = sql_type,
            None => self.columns.push(ColumnDef { name, sql_type }),
        }
    }

    /// Returns the columns in document order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the column names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the configured type of `column`, if defined.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.sql_type.as_str())
    }

    /// Returns `true` if `column` is defined.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column)
    }

    /// Number of configured columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if no columns are configured.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for SchemaConfig {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut schema = SchemaConfig::new();
        for (name, value) in map {
            let Value::String(sql_type) = value else {
                return Err(format!(
                    "column '{name}' must map to a type string, found {value}"
                ));
            };
            schema.push(name, sql_type);
        }
        Ok(schema)
    }
}

impl From<SchemaConfig> for Map<String, Value> {
    fn from(schema: SchemaConfig) -> Self {
        schema
            .columns
            .into_iter()
            .map(|c| (c.name, Value::String(c.sql_type)))
            .collect()
    }
}

/// One `api_field → column` translation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name in the provider's response entry.
    pub api_field: String,
    /// Local column the field's value is written to.
    pub column: String,
}

/// Ordered translation table from provider response fields to columns.
///
/// Serialized as `{ "<api_field>": "<column>", ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct FieldMapping {
    rules: Vec<FieldRule>,
}

impl FieldMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, builder style.
    pub fn with_rule(mut self, api_field: impl Into<String>, column: impl Into<String>) -> Self {
        self.rules.push(FieldRule {
            api_field: api_field.into(),
            column: column.into(),
        });
        self
    }

    /// Returns the rules in document order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Returns the column `api_field` is mapped to, if any.
    pub fn column_for(&self, api_field: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.api_field == api_field)
            .map(|r| r.column.as_str())
    }

    /// Returns `true` if some rule writes to `column`.
    pub fn targets(&self, column: &str) -> bool {
        self.rules.iter().any(|r| r.column == column)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for FieldMapping {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut mapping = FieldMapping::new();
        for (api_field, value) in map {
            let Value::String(column) = value else {
                return Err(format!(
                    "mapping for '{api_field}' must name a column, found {value}"
                ));
            };
            mapping = mapping.with_rule(api_field, column);
        }
        Ok(mapping)
    }
}

impl From<FieldMapping> for Map<String, Value> {
    fn from(mapping: FieldMapping) -> Self {
        mapping
            .rules
            .into_iter()
            .map(|r| (r.api_field, Value::String(r.column)))
            .collect()
    }
}

/// Request and response description of one external API.
///
/// # Examples
///
/// ```
/// use stock_store_core::ApiDescriptor;
///
/// let api: ApiDescriptor = serde_json::from_str(r#"{
///     "base_url": "https://example.test/search",
///     "search_param": "isin",
///     "default_params": { "limit": 1 },
///     "first_entry": "result",
///     "mapping": { "symbol": "sym" }
/// }"#).unwrap();
///
/// assert_eq!(api.search_param.as_deref(), Some("isin"));
/// assert_eq!(api.mapping.column_for("symbol"), Some("sym"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    /// Request URL. When [`search_param`](Self::search_param) is unset the
    /// search key is appended to it verbatim.
    #[serde(default)]
    pub base_url: String,
    /// Name of the query parameter carrying the search key. Empty strings
    /// and `null` are read as "not set".
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub search_param: Option<String>,
    /// Query parameters sent with every request.
    #[serde(default)]
    pub default_params: Map<String, Value>,
    /// Response element holding the primary result. Empty selects the
    /// response root.
    #[serde(default)]
    pub first_entry: String,
    /// Response field → column translation.
    #[serde(default)]
    pub mapping: FieldMapping,
}

impl ApiDescriptor {
    /// Creates a descriptor with no parameters and an empty mapping.
    pub fn new(base_url: impl Into<String>, first_entry: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            search_param: None,
            default_params: Map::new(),
            first_entry: first_entry.into(),
            mapping: FieldMapping::new(),
        }
    }

    /// Sets the search parameter name, builder style.
    pub fn with_search_param(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.search_param = (!name.is_empty()).then_some(name);
        self
    }

    /// Adds a default query parameter, builder style.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_params.insert(name.into(), value.into());
        self
    }

    /// Replaces the field mapping, builder style.
    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Ordered set of API descriptors keyed by API name.
///
/// Serialized as `{ "<api_name>": { ...descriptor... }, ... }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMappingConfig {
    apis: Vec<(String, ApiDescriptor)>,
}

impl FieldMappingConfig {
    /// Creates an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an API, builder style.
    pub fn with_api(mut self, name: impl Into<String>, api: ApiDescriptor) -> Self {
        self.insert(name, api);
        self
    }

    /// Adds an API, replacing an existing descriptor of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, api: ApiDescriptor) {
        let name = name.into();
        match self.apis.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = api,
            None => self.apis.push((name, api)),
        }
    }

    /// Looks up an API by name.
    pub fn get(&self, name: &str) -> Option<&ApiDescriptor> {
        self.apis.iter().find(|(n, _)| n == name).map(|(_, api)| api)
    }

    /// Iterates `(name, descriptor)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ApiDescriptor)> {
        self.apis.iter().map(|(n, api)| (n.as_str(), api))
    }

    /// Returns the API names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.apis.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }
}

impl Serialize for FieldMappingConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.apis.len()))?;
        for (name, api) in &self.apis {
            map.serialize_entry(name, api)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMappingConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut config = FieldMappingConfig::new();
        for (name, value) in raw {
            let api = serde_json::from_value::<ApiDescriptor>(value)
                .map_err(|e| serde::de::Error::custom(format!("api '{name}': {e}")))?;
            config.insert(name, api);
        }
        Ok(config)
    }
}
