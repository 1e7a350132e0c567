//! Provider request building and response → row translation.
//!
//! [`ApiTranslator`] turns an API name and a search key into a [`Row`]:
//!
//! 1. look up the [`ApiDescriptor`];
//! 2. build the request, either as `base_url + key` or with the key in the
//!    configured search parameter, and inject the API key as `apikey`;
//! 3. GET it through the [`Transport`];
//! 4. parse the body and pick the entry at `first_entry`
//!    ([`extract_entry`]);
//! 5. copy every mapped field into the row ([`map_fields`]).
//!
//! Every step has its own [`ProviderError`] variant. Nothing is retried.

use std::fmt;

use serde_json::Value;
use stock_store_core::{ApiDescriptor, FieldMapping, FieldMappingConfig, Row};
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::transport::Transport;

/// Query parameter the API key is sent in.
pub const API_KEY_PARAM: &str = "apikey";

/// A fully resolved provider request.
///
/// The `Debug` output masks the API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    /// Returns the value of query parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(n, v)| {
                let shown = if n == API_KEY_PARAM { "***" } else { v.as_str() };
                (n.as_str(), shown)
            })
            .collect();
        f.debug_struct("ApiRequest")
            .field("url", &self.url)
            .field("params", &params)
            .finish()
    }
}

/// Fetches provider data and projects it through the configured mappings.
pub struct ApiTranslator {
    apis: FieldMappingConfig,
    api_key: String,
    transport: Box<dyn Transport + Send>,
}

impl ApiTranslator {
    pub fn new(
        apis: FieldMappingConfig,
        api_key: impl Into<String>,
        transport: Box<dyn Transport + Send>,
    ) -> Self {
        Self {
            apis,
            api_key: api_key.into(),
            transport,
        }
    }

    /// The field-mapping config this translator works from.
    pub fn apis(&self) -> &FieldMappingConfig {
        &self.apis
    }

    /// Looks up the descriptor for `api_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownApi`] if no such API is configured.
    pub fn descriptor(&self, api_name: &str) -> Result<&ApiDescriptor> {
        self.apis
            .get(api_name)
            .ok_or_else(|| ProviderError::UnknownApi(api_name.to_string()))
    }

    /// Builds the request `fetch_and_map` would send, without sending it.
    ///
    /// The configured default parameters are copied, never modified.
    pub fn request_for(&self, api_name: &str, search_key: &str) -> Result<ApiRequest> {
        let descriptor = self.descriptor(api_name)?;

        let mut params: Vec<(String, String)> = descriptor
            .default_params
            .iter()
            .filter_map(|(name, value)| param_text(value).map(|text| (name.clone(), text)))
            .collect();

        let url = match descriptor.search_param.as_deref() {
            Some(param) => {
                set_param(&mut params, param, search_key);
                descriptor.base_url.clone()
            }
            None => format!("{}{}", descriptor.base_url, search_key),
        };

        set_param(&mut params, API_KEY_PARAM, &self.api_key);
        Ok(ApiRequest { url, params })
    }

    /// Fetches `search_key` from `api_name` and maps the primary entry of
    /// the response into a row.
    ///
    /// # Errors
    ///
    /// [`UnknownApi`](ProviderError::UnknownApi),
    /// [`Network`](ProviderError::Network), [`Http`](ProviderError::Http),
    /// [`ResponseMalformed`](ProviderError::ResponseMalformed),
    /// [`ResponseShapeMismatch`](ProviderError::ResponseShapeMismatch) or
    /// [`FieldMissing`](ProviderError::FieldMissing), depending on the step
    /// that failed.
    pub fn fetch_and_map(&self, api_name: &str, search_key: &str) -> Result<Row> {
        let descriptor = self.descriptor(api_name)?;
        let request = self.request_for(api_name, search_key)?;
        debug!(api = api_name, request = ?request, "api request");

        let response = self.transport.get(&request.url, &request.params)?;
        if !response.is_success() {
            return Err(ProviderError::Http {
                url: request.url,
                status: response.status,
            });
        }

        let body: Value =
            serde_json::from_str(&response.body).map_err(|source| {
                ProviderError::ResponseMalformed {
                    url: request.url.clone(),
                    source,
                }
            })?;

        let entry = extract_entry(&descriptor.first_entry, &body)?;
        let row = map_fields(&descriptor.mapping, entry)?;
        debug!(api = api_name, columns = row.len(), "mapped api response");
        Ok(row)
    }

    /// Maps an already extracted provider entry through `api_name`'s
    /// mapping. No request is made.
    pub fn map_entry(&self, api_name: &str, entry: &Value) -> Result<Row> {
        let descriptor = self.descriptor(api_name)?;
        if !entry.is_object() {
            return Err(ProviderError::ResponseShapeMismatch {
                entry: api_name.to_string(),
                reason: format!("payload is {}, expected an object", kind(entry)),
            });
        }
        map_fields(&descriptor.mapping, entry)
    }
}

/// Selects the primary result object of a provider response.
///
/// - an empty `first_entry` selects the response itself;
/// - on an object response, `first_entry` names a member;
/// - on an array response, `first_entry` must be a decimal index;
/// - a selected array yields its first element.
///
/// The selected entry must be a JSON object.
///
/// # Errors
///
/// Returns [`ProviderError::ResponseShapeMismatch`] if any step does not
/// apply to the response.
pub fn extract_entry<'a>(first_entry: &str, response: &'a Value) -> Result<&'a Value> {
    let mismatch = |reason: String| ProviderError::ResponseShapeMismatch {
        entry: first_entry.to_string(),
        reason,
    };

    let selected = if first_entry.is_empty() {
        response
    } else {
        match response {
            Value::Object(members) => members
                .get(first_entry)
                .ok_or_else(|| mismatch("key not present in response".to_string()))?,
            Value::Array(items) => {
                let index: usize = first_entry.parse().map_err(|_| {
                    mismatch("response is an array and entry is not an index".to_string())
                })?;
                items.get(index).ok_or_else(|| {
                    mismatch(format!("index out of range for {} results", items.len()))
                })?
            }
            other => return Err(mismatch(format!("response is {}", kind(other)))),
        }
    };

    let entry = match selected {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| mismatch("result list is empty".to_string()))?,
        other => other,
    };

    if entry.is_object() {
        Ok(entry)
    } else {
        Err(mismatch(format!("entry is {}, expected an object", kind(entry))))
    }
}

/// Copies every mapped field of `entry` into a new row, in mapping order.
///
/// An explicit JSON `null` counts as present.
///
/// # Errors
///
/// Returns [`ProviderError::FieldMissing`] naming the first mapped field
/// that `entry` does not have.
pub fn map_fields(mapping: &FieldMapping, entry: &Value) -> Result<Row> {
    let mut row = Row::new();
    for rule in mapping.rules() {
        let value = entry
            .get(rule.api_field.as_str())
            .ok_or_else(|| ProviderError::FieldMissing(rule.api_field.clone()))?;
        row.insert(rule.column.clone(), value.clone());
    }
    Ok(row)
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn set_param(params: &mut Vec<(String, String)>, name: &str, value: &str) {
    match params.iter_mut().find(|(n, _)| n == name) {
        Some((_, existing)) => *existing = value.to_string(),
        None => params.push((name.to_string(), value.to_string())),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::transport::HttpResponse;

    type Calls = Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>;

    struct CannedTransport {
        response: HttpResponse,
        calls: Calls,
    }

    impl Transport for CannedTransport {
        fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), query.to_vec()));
            Ok(self.response.clone())
        }
    }

    fn apis() -> FieldMappingConfig {
        FieldMappingConfig::new()
            .with_api(
                "search_isin",
                ApiDescriptor::new("https://example.test/search", "result")
                    .with_search_param("isin")
                    .with_param("limit", 1)
                    .with_mapping(
                        FieldMapping::new()
                            .with_rule("symbol", "sym")
                            .with_rule("isin", "isin"),
                    ),
            )
            .with_api(
                "profile",
                ApiDescriptor::new("https://example.test/profile/", "0")
                    .with_param("exchange", "XETRA")
                    .with_mapping(FieldMapping::new().with_rule("companyName", "company")),
            )
    }

    fn translator(status: u16, body: &str) -> (ApiTranslator, Calls) {
        let calls = Calls::default();
        let transport = CannedTransport {
            response: HttpResponse::new(status, body),
            calls: Arc::clone(&calls),
        };
        (ApiTranslator::new(apis(), "k3y", Box::new(transport)), calls)
    }

    #[test]
    fn test_request_with_search_param() {
        let (translator, _) = translator(200, "{}");
        let request = translator.request_for("search_isin", "DE0007164600").unwrap();
        assert_eq!(request.url, "https://example.test/search");
        assert_eq!(request.param("limit"), Some("1"));
        assert_eq!(request.param("isin"), Some("DE0007164600"));
        assert_eq!(request.param(API_KEY_PARAM), Some("k3y"));
    }

    #[test]
    fn test_request_with_key_in_url() {
        let (translator, _) = translator(200, "[]");
        let request = translator.request_for("profile", "SAP").unwrap();
        assert_eq!(request.url, "https://example.test/profile/SAP");
        assert_eq!(
            request.params,
            vec![
                ("exchange".to_string(), "XETRA".to_string()),
                ("apikey".to_string(), "k3y".to_string()),
            ]
        );
    }

    #[test]
    fn test_defaults_not_mutated_between_requests() {
        let (translator, _) = translator(200, "{}");
        translator.request_for("search_isin", "FIRST").unwrap();
        let second = translator.request_for("search_isin", "SECOND").unwrap();
        assert_eq!(second.param("isin"), Some("SECOND"));
        assert!(translator.apis().get("search_isin").unwrap().default_params.get("isin").is_none());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let (translator, _) = translator(200, "{}");
        let request = translator.request_for("search_isin", "X").unwrap();
        let shown = format!("{request:?}");
        assert!(!shown.contains("k3y"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn test_unknown_api() {
        let (translator, calls) = translator(200, "{}");
        let err = translator.fetch_and_map("nope", "X").unwrap_err();
        assert!(matches!(err, ProviderError::UnknownApi(name) if name == "nope"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fetch_and_map_envelope_array() {
        let (translator, calls) = translator(
            200,
            r#"{"result":[{"symbol":"SAP","isin":"DE0007164600","extra":1}]}"#,
        );
        let row = translator.fetch_and_map("search_isin", "DE0007164600").unwrap();
        assert_eq!(row.get_str("sym"), Some("SAP"));
        assert_eq!(row.get_str("isin"), Some("DE0007164600"));
        assert_eq!(row.len(), 2);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains(&("apikey".to_string(), "k3y".to_string())));
    }

    #[test]
    fn test_fetch_and_map_top_level_array_index() {
        let (translator, _) = translator(200, r#"[{"companyName":"SAP SE"}]"#);
        let row = translator.fetch_and_map("profile", "SAP").unwrap();
        assert_eq!(row.get_str("company"), Some("SAP SE"));
    }

    #[test]
    fn test_http_error_status() {
        let (translator, _) = translator(401, r#"{"Error Message":"Invalid API KEY"}"#);
        let err = translator.fetch_and_map("search_isin", "X").unwrap_err();
        match err {
            ProviderError::Http { url, status } => {
                assert_eq!(status, 401);
                assert_eq!(url, "https://example.test/search");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body() {
        let (translator, _) = translator(200, "<html>busy</html>");
        let err = translator.fetch_and_map("search_isin", "X").unwrap_err();
        assert!(matches!(err, ProviderError::ResponseMalformed { .. }));
    }

    #[test]
    fn test_missing_field() {
        let (translator, _) = translator(200, r#"{"result":[{"isin":"DE0007164600"}]}"#);
        let err = translator.fetch_and_map("search_isin", "X").unwrap_err();
        assert!(matches!(err, ProviderError::FieldMissing(field) if field == "symbol"));
    }

    #[test]
    fn test_extract_entry_shapes() {
        let response = json!({"result": [{"a": 1}], "single": {"b": 2}, "scalar": 3, "none": []});
        assert_eq!(extract_entry("result", &response).unwrap(), &json!({"a": 1}));
        assert_eq!(extract_entry("single", &response).unwrap(), &json!({"b": 2}));
        assert!(extract_entry("missing", &response).is_err());
        assert!(extract_entry("scalar", &response).is_err());
        assert!(extract_entry("none", &response).is_err());

        let list = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(extract_entry("1", &list).unwrap(), &json!({"a": 2}));
        assert_eq!(extract_entry("", &list).unwrap(), &json!({"a": 1}));
        assert!(extract_entry("5", &list).is_err());
        assert!(extract_entry("result", &list).is_err());
    }

    #[test]
    fn test_map_fields_keeps_null() {
        let mapping = FieldMapping::new().with_rule("price", "price");
        let row = map_fields(&mapping, &json!({"price": null})).unwrap();
        assert_eq!(row.get("price"), Some(&Value::Null));
    }

    #[test]
    fn test_map_entry_requires_object() {
        let (translator, calls) = translator(200, "{}");
        let row = translator
            .map_entry("search_isin", &json!({"symbol": "SAP", "isin": "DE0007164600"}))
            .unwrap();
        assert_eq!(row.get_str("sym"), Some("SAP"));
        assert!(translator.map_entry("search_isin", &json!(["SAP"])).is_err());
        assert!(calls.lock().unwrap().is_empty());
    }
}
