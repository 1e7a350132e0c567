//! Error types for provider requests and response mapping.
//!
//! URLs carried by these errors never include the query string, so the API
//! key cannot end up in logs or error messages.

use thiserror::Error;

/// Errors that can occur while fetching or mapping provider data.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API with this name is configured.
    #[error("unknown api: {0}")]
    UnknownApi(String),

    /// The HTTP client could not be constructed.
    #[error("cannot build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection failure or timeout.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    /// The response body is not valid JSON.
    #[error("response from {url} is not valid JSON: {source}")]
    ResponseMalformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response does not hold an entry at the configured `first_entry`.
    #[error("response has no usable entry at '{entry}': {reason}")]
    ResponseShapeMismatch { entry: String, reason: String },

    /// A mapped field is absent from the response entry.
    #[error("field missing from api response: {0}")]
    FieldMissing(String),
}

/// Convenience alias for results with [`ProviderError`].
pub type Result<T> = std::result::Result<T, ProviderError>;
