//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client and the fixed request header set
//! - The `Transport` seam the walker fetches through
//! - Classifying each GET as success or a walk-ending failure
//!
//! No retry happens here. A failed page ends the current walk and the next
//! scheduled cycle starts again from the category start URL.

use crate::config::HttpConfig;
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Browser-like User-Agent; the catalog site rejects non-browser clients
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Raw response from a transport GET
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Failure below the HTTP status level (connect, timeout, body decode)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read body: {0}")]
    Body(String),
}

/// Outbound GET primitive
pub trait Transport: Send + Sync {
    /// Performs one GET with the given headers
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// `Transport` backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the transport from the HTTP section of the configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// HTTP 200 with the page body
    Success {
        /// Page body content
        body: String,
    },

    /// Any status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The request never produced a usable response
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Human-readable reason for a failed fetch
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed with reqwest's default policy; the User-Agent is
/// carried by the per-request header set rather than the client.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the fixed header set sent with every page request
pub fn build_headers(config: &HttpConfig) -> Result<HeaderMap, ConfigError> {
    let user_agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|e| ConfigError::InvalidHeader(format!("user_agent: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, user_agent);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ru-RU,ru;q=0.9,en;q=0.8"));
    Ok(headers)
}

/// Fetches one page and classifies the outcome
///
/// | Condition        | Result         |
/// |------------------|----------------|
/// | HTTP 200         | `Success`      |
/// | Any other status | `HttpError`    |
/// | Transport error  | `NetworkError` |
pub async fn fetch_page<T: Transport>(transport: &T, url: &str, headers: &HeaderMap) -> FetchResult {
    match transport.get(url, headers).await {
        Ok(response) if response.status == StatusCode::OK.as_u16() => FetchResult::Success {
            body: response.body,
        },
        Ok(response) => FetchResult::HttpError {
            status_code: response.status,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticTransport {
        result: fn() -> Result<TransportResponse, TransportError>,
    }

    impl Transport for StaticTransport {
        async fn get(
            &self,
            _url: &str,
            _headers: &HeaderMap,
        ) -> Result<TransportResponse, TransportError> {
            (self.result)()
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_headers_carry_user_agent() {
        let config = HttpConfig {
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 5,
        };
        let headers = build_headers(&config).unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "Mozilla/5.0");
        assert!(headers.contains_key(ACCEPT));
    }

    #[test]
    fn test_headers_reject_control_characters() {
        let config = HttpConfig {
            user_agent: "bad\r\nagent".to_string(),
            timeout_secs: 5,
        };
        assert!(build_headers(&config).is_err());
    }

    #[tokio::test]
    async fn test_ok_status_is_success() {
        let transport = StaticTransport {
            result: || {
                Ok(TransportResponse {
                    status: 200,
                    body: "<html></html>".to_string(),
                })
            },
        };
        let result = fetch_page(&transport, "https://example.com/", &HeaderMap::new()).await;
        assert!(matches!(result, FetchResult::Success { ref body } if body == "<html></html>"));
        assert_eq!(result.failure_reason(), None);
    }

    #[tokio::test]
    async fn test_non_ok_status_is_terminal() {
        let transport = StaticTransport {
            result: || {
                Ok(TransportResponse {
                    status: 503,
                    body: String::new(),
                })
            },
        };
        let result = fetch_page(&transport, "https://example.com/", &HeaderMap::new()).await;
        assert!(matches!(result, FetchResult::HttpError { status_code: 503 }));
        assert_eq!(result.failure_reason().as_deref(), Some("HTTP 503"));
    }

    #[tokio::test]
    async fn test_no_content_status_is_terminal() {
        let transport = StaticTransport {
            result: || {
                Ok(TransportResponse {
                    status: 204,
                    body: String::new(),
                })
            },
        };
        let result = fetch_page(&transport, "https://example.com/", &HeaderMap::new()).await;
        assert!(result.failure_reason().is_some());
    }

    #[tokio::test]
    async fn test_transport_error_is_terminal() {
        let transport = StaticTransport {
            result: || Err(TransportError::Timeout),
        };
        let result = fetch_page(&transport, "https://example.com/", &HeaderMap::new()).await;
        assert!(matches!(result, FetchResult::NetworkError { .. }));
        assert_eq!(result.failure_reason().as_deref(), Some("request timed out"));
    }
}
