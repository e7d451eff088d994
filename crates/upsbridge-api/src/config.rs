//! Server configuration.
//!
//! Every setting is resolved through [`ServerConfig::from_lookup`], keyed by
//! its environment variable name. The CLI feeds it flag values that fall back
//! to the process environment.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use upsbridge_devices::upstream::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use upsbridge_devices::UpstreamConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CACHE_TTL_MS: u64 = 2000;

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to run.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub api_key: Option<String>,
    /// Payload cache lifetime, zero disables caching.
    pub cache_ttl: Duration,
}

impl ServerConfig {
    /// Config for a card at `ups_ip` with every other setting defaulted.
    pub fn new(ups_ip: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upstream: UpstreamConfig::new(ups_ip),
            api_key: None,
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
        }
    }

    /// Load using a lookup keyed by environment variable name. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let ups_ip = var("UPS_IP").ok_or(ConfigError::Missing("UPS_IP"))?;
        let mut config = Self::new(ups_ip);

        config.upstream.username = var("UPS_USERNAME");
        config.upstream.password = var("UPS_PASSWORD");
        config.api_key = var("SERVER_API_KEY");

        if let Some(host) = var("SERVER_HOST") {
            config.host = host;
        }
        if let Some(port) = var("SERVER_PORT") {
            config.port = parse_number("SERVER_PORT", &port)?;
        }
        if let Some(scheme) = var("UPS_SCHEME") {
            config.upstream.scheme = scheme;
        }
        if let Some(endpoint) = var("UPS_ENDPOINT") {
            config.upstream.endpoint = endpoint;
        }
        if let Some(timeout) = var("UPS_TIMEOUT") {
            config.upstream.timeout = parse_number("UPS_TIMEOUT", &timeout)?;
        }
        if let Some(insecure) = var("UPS_INSECURE_TLS") {
            config.upstream.insecure_tls = parse_bool("UPS_INSECURE_TLS", &insecure)?;
        }
        if let Some(ttl) = var("SNAPSHOT_CACHE_TTL_MS") {
            config.cache_ttl =
                Duration::from_millis(parse_number("SNAPSHOT_CACHE_TTL_MS", &ttl)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.host.trim().is_empty() {
            return Err(ConfigError::Missing("UPS_IP"));
        }
        match self.upstream.scheme.as_str() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Invalid {
                    name: "UPS_SCHEME",
                    value: other.to_string(),
                    reason: "expected http or https".to_string(),
                })
            }
        }
        if self.upstream.timeout == 0 {
            return Err(ConfigError::Invalid {
                name: "UPS_TIMEOUT",
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }
        self.bind_addr().map(|_| ())
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                name: "SERVER_HOST",
                value: self.host.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
