//! Shared server state.

use std::sync::Arc;

use upsbridge_devices::{FetchError, TelemetryParser, UpstreamClient};

use crate::auth::AuthState;
use crate::cache::PayloadCache;
use crate::config::ServerConfig;

/// Server state shared across all handlers.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub upstream: Arc<UpstreamClient>,
    pub cache: Arc<PayloadCache>,
    pub parser: TelemetryParser,
    pub auth: Arc<AuthState>,
    /// Unix timestamp of server start.
    pub started_at: i64,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Result<Self, FetchError> {
        let upstream = UpstreamClient::new(config.upstream.clone())?;
        let auth = AuthState::new(config.api_key.as_deref());
        let cache = PayloadCache::new(config.cache_ttl);

        Ok(Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
            cache: Arc::new(cache),
            parser: TelemetryParser::new(),
            auth: Arc::new(auth),
            started_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Current payload, through the single-flight cache.
    pub async fn payload(&self) -> Result<Arc<str>, FetchError> {
        let upstream = Arc::clone(&self.upstream);
        self.cache
            .get_or_fetch(|| async move { upstream.fetch().await })
            .await
    }

    pub fn uptime_secs(&self) -> u64 {
        (chrono::Utc::now().timestamp() - self.started_at).max(0) as u64
    }
}
