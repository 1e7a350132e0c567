//! Row and filter containers.
//!
//! A [`Row`] is one security as stored in the table: an ordered mapping
//! from column name to a JSON scalar. The key set is not fixed at compile
//! time; it is whatever the schema config declares, checked at the
//! boundary by the field-mapping validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One table row, keyed by column name.
///
/// # Examples
///
/// ```
/// use stock_store_core::Row;
///
/// let mut row = Row::new();
/// row.insert("isin", "DE0007164600");
/// row.insert("sym", "SAP");
///
/// assert_eq!(row.get_str("sym"), Some("SAP"));
/// assert_eq!(row.columns().collect::<Vec<_>>(), vec!["isin", "sym"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`, returning the previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(column.into(), value.into())
    }

    /// Sets `column` only if it has no value yet.
    pub fn insert_if_absent(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.entry(column.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Returns the value of `column` if it is a string.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Returns a copy of this row without `column`, keeping column order.
    pub fn without(&self, column: &str) -> Row {
        self.iter()
            .filter(|(c, _)| *c != column)
            .map(|(c, v)| (c.to_string(), v.clone()))
            .collect()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the row, returning the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Exact-match conditions on columns, combined with AND.
///
/// An empty filter matches every row.
///
/// # Examples
///
/// ```
/// use stock_store_core::Filter;
///
/// let filter = Filter::new().eq("currency", "EUR").eq("exchange", "XETRA");
/// assert_eq!(filter.len(), 2);
/// assert_eq!(filter.columns().collect::<Vec<_>>(), vec!["currency", "exchange"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `column = value` condition, builder style.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    /// Adds a `column = value` condition.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.conditions.push((column.into(), value.into()));
    }

    /// Returns a new filter holding this filter's conditions followed by
    /// `other`'s.
    pub fn and(&self, other: &Filter) -> Filter {
        let mut combined = self.clone();
        combined.conditions.extend(other.conditions.iter().cloned());
        combined
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Columns referenced by the filter, in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            conditions: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
