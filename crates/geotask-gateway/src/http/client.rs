/*
[INPUT]:  HTTP configuration (base URL, timeouts)
[OUTPUT]: Configured reqwest client ready for task API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::http::{GatewayError, Result};

/// Default base URL of the task backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the task REST API
#[derive(Debug, Clone)]
pub struct GeotaskClient {
    http_client: Client,
    base_url: Url,
    timeout: Duration,
}

impl GeotaskClient {
    /// Create a new client against the default backend
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client with custom configuration and backend URL
    pub fn with_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "base URL cannot carry paths: {base_url}"
            )));
        }
        // Relative joins drop the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
            timeout: config.timeout,
        })
    }

    /// Backend URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an API endpoint (relative path, e.g. `api/tasks`)
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build request builder for an API endpoint
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        tracing::debug!(method = %method, url = %url, "task api request");
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and turn non-success statuses into `GatewayError::Api`
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|err| self.map_transport(err))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| String::from("unknown error"));
        tracing::warn!(status = status.as_u16(), %message, "task api returned error status");
        Err(GatewayError::api_error(status, message))
    }

    /// Send a request and decode the JSON response body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(|err| self.map_transport(err))?;
        serde_json::from_slice(&bytes).map_err(|err| {
            tracing::warn!(error = %err, "failed to decode task api response");
            GatewayError::Serialization(err)
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            tracing::warn!(timeout_secs = self.timeout.as_secs(), "task api request timed out");
            GatewayError::Timeout {
                duration: self.timeout.as_secs(),
            }
        } else {
            tracing::warn!(error = %err, "task api request failed");
            GatewayError::Http(err)
        }
    }
}

/// Pull a human readable message out of an error body
///
/// The backend answers errors with `{"message": ...}` or `{"error": ...}`;
/// anything else is passed through verbatim.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error", "description"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    Some(trimmed.to_string())
}
