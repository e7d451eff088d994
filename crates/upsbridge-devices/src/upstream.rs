//! HTTP client for the UPS network card.
//!
//! One GET per [`UpstreamClient::fetch`], no retries. The card serves a
//! self-signed certificate, so invalid certificates are accepted unless
//! [`UpstreamConfig::insecure_tls`] is turned off.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ParseFailure;
use crate::parser::screen_payload;

/// Synoptic measurement script served by Network-MS cards.
pub const DEFAULT_ENDPOINT: &str = "/html/synoptic/ups_measure_11_simple.js";

/// Default fetch timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Upstream fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Client construction or transport failure.
    #[error("UPS request failed: {0}")]
    Request(String),

    /// No response within the configured timeout.
    #[error("UPS request timed out after {0}s")]
    Timeout(u64),

    /// The card answered with a non-success status.
    #[error("UPS returned HTTP {0}")]
    Status(u16),

    /// The body is not a synoptic payload.
    #[error(transparent)]
    Payload(#[from] ParseFailure),
}

/// Where and how to reach the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Card address, optionally with a port (`192.168.1.50`, `ups.lan:8443`).
    pub host: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_insecure_tls")]
    pub insecure_tls: bool,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_insecure_tls() -> bool {
    true
}

impl UpstreamConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            scheme: default_scheme(),
            endpoint: default_endpoint(),
            username: None,
            password: None,
            timeout: default_timeout(),
            insecure_tls: default_insecure_tls(),
        }
    }

    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    /// Full URL of the measurement endpoint.
    ///
    /// A host that already carries a scheme is used as-is.
    pub fn url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        let base = if host.contains("://") {
            host.to_string()
        } else {
            format!("{}://{}", self.scheme, host)
        };
        if self.endpoint.starts_with('/') {
            format!("{}{}", base, self.endpoint)
        } else {
            format!("{}/{}", base, self.endpoint)
        }
    }

    /// Basic-auth pair, only when both parts are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Fetches the raw payload from the card.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    config: UpstreamConfig,
    url: String,
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure_tls)
            .timeout(Duration::from_secs(config.timeout))
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| FetchError::Request(format!("failed to build HTTP client: {}", e)))?;

        let url = config.url();
        Ok(Self {
            config,
            url,
            client,
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the measurement script and screen it.
    ///
    /// The body is returned unmodified for the parser.
    pub async fn fetch(&self) -> Result<String, FetchError> {
        let mut request = self.client.get(&self.url);
        if let Some((username, password)) = self.config.credentials() {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, status = status.as_u16(), "UPS returned an error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(
            url = %self.url,
            bytes = body.len(),
            content_type = content_type.as_deref().unwrap_or("-"),
            "Fetched UPS payload"
        );

        screen_payload(content_type.as_deref(), &body)?;
        Ok(body)
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            warn!(url = %self.url, timeout = self.config.timeout, "UPS request timed out");
            FetchError::Timeout(self.config.timeout)
        } else {
            warn!(url = %self.url, "UPS request failed: {}", error);
            FetchError::Request(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let config = UpstreamConfig::new("192.168.1.50");
        assert_eq!(
            config.url(),
            "https://192.168.1.50/html/synoptic/ups_measure_11_simple.js"
        );

        let mut config = UpstreamConfig::new("http://127.0.0.1:8080/");
        config.endpoint = "data.js".to_string();
        assert_eq!(config.url(), "http://127.0.0.1:8080/data.js");
    }

    #[test]
    fn test_credentials_need_both_parts() {
        let config = UpstreamConfig::new("ups");
        assert!(config.credentials().is_none());

        let config = UpstreamConfig::new("ups").with_credentials(Some("admin".into()), None);
        assert!(config.credentials().is_none());

        let config =
            UpstreamConfig::new("ups").with_credentials(Some("admin".into()), Some("secret".into()));
        assert_eq!(config.credentials(), Some(("admin", "secret")));
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: UpstreamConfig = serde_json::from_str(r#"{"host": "ups.lan"}"#).unwrap();
        assert_eq!(config, UpstreamConfig::new("ups.lan"));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT_SECS);
        assert!(config.insecure_tls);
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(503).to_string(), "UPS returned HTTP 503");
        assert_eq!(FetchError::Timeout(5).to_string(), "UPS request timed out after 5s");
        let payload = FetchError::from(ParseFailure::malformed_payload("empty body"));
        assert_eq!(payload.to_string(), "malformed payload: empty body");
    }
}
