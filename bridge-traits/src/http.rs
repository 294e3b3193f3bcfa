//! HTTP Client Abstraction
//!
//! Provides async HTTP operations behind a platform-agnostic trait.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: &HashMap<String, String>) -> Self {
        for (key, value) in headers {
            self.headers.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON serialization failed: {}", e))
        })?;
        self.body = Some(Bytes::from(json));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response status indicates stale credentials
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Async HTTP client trait
///
/// The export engine performs two kinds of network operations: small JSON
/// exchanges against the catalog API, and large binary downloads (audio,
/// cover art). The former go through [`execute`](HttpClient::execute), which
/// returns the response for any HTTP status so callers can distinguish 401
/// from other failures; only network-level problems (timeout, connect, IO)
/// surface as errors. The latter go through
/// [`download_to_file`](HttpClient::download_to_file), which streams the body
/// to disk without buffering it in memory and treats a non-2xx status as an
/// error.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response regardless of status.
    ///
    /// # Errors
    ///
    /// Returns an error only for network-level failures:
    /// - Connection failure or TLS error
    /// - Request timeout
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Stream a large binary body to `dest`.
    ///
    /// The file is fully written on success. On failure the destination may
    /// not exist or may be partial; callers are expected to clean up.
    async fn download_to_file(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        dest: &Path,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com")
            .header("User-Agent", "test")
            .header("Authorization", "Bearer secret")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.headers.get("User-Agent"), Some(&"test".to_string()));
        assert!(request.headers.contains_key("Authorization"));
    }

    #[test]
    fn test_http_request_merges_header_map() {
        let mut common = HashMap::new();
        common.insert("Cookie".to_string(), "session=abc".to_string());
        common.insert("Accept".to_string(), "application/json".to_string());

        let request = HttpRequest::new(HttpMethod::Get, "https://example.com").headers(&common);

        assert_eq!(request.headers.get("Cookie"), Some(&"session=abc".to_string()));
        assert_eq!(request.headers.len(), 2);
    }

    #[test]
    fn test_http_request_json_body() {
        let request = HttpRequest::new(HttpMethod::Post, "https://example.com")
            .json(&serde_json::json!({"pageSize": 500}))
            .unwrap();

        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert!(request.body.is_some());
    }

    #[test]
    fn test_http_response_json_parsing() {
        let response = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(r#"{"data": [1, 2, 3]}"#),
        };

        let parsed: serde_json::Value = response.json().unwrap();
        assert_eq!(parsed["data"][2], serde_json::json!(3));

        let garbled = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from("<html>not json</html>"),
        };

        assert!(garbled.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_http_response_status_checks() {
        let response = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from("test"),
        };

        assert!(response.is_success());
        assert!(!response.is_unauthorized());

        let stale = HttpResponse {
            status: 401,
            headers: HashMap::new(),
            body: Bytes::new(),
        };

        assert!(!stale.is_success());
        assert!(stale.is_unauthorized());
    }
}
