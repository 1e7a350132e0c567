//! Outbound HTTP seam.
//!
//! The translator talks to the provider through [`Transport`]. Production
//! code uses [`HttpTransport`], a blocking `reqwest` client with a bounded
//! timeout; tests plug in canned responses.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{ProviderError, Result};

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a GET request with query parameters.
///
/// Implementations report connection-level failures as
/// [`ProviderError::Network`]; status handling is left to the caller.
pub trait Transport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse>;
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Client`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Client)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        let network = |source: reqwest::Error| ProviderError::Network {
            url: url.to_string(),
            source: source.without_url(),
        };

        let response = self.client.get(url).query(query).send().map_err(network)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(network)?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(429, "").is_success());
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/search");

        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .get(&url, &[("apikey".into(), "secret".into())])
            .unwrap_err();
        match err {
            ProviderError::Network { url: reported, source } => {
                assert_eq!(reported, url);
                assert!(!source.to_string().contains("secret"));
            }
            other => panic!("expected Network, got {other:?}"),
        }
    }
}
