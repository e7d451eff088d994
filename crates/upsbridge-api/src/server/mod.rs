//! HTTP server for UPS telemetry.

pub mod router;
pub mod state;

pub use router::{create_router, MAX_REQUEST_BODY_SIZE};
pub use state::ServerState;

use crate::config::ServerConfig;

/// Start the web server and run until Ctrl+C or SIGTERM.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    use crate::startup::{ServiceStatus, StartupLogger};

    let mut startup = StartupLogger::new();
    startup.banner();

    startup.phase_config();
    config.validate()?;
    let bind = config.bind_addr()?;
    startup.detail(&format!("UPS endpoint: {}", config.upstream.url()));
    startup.detail(&format!("Fetch timeout: {}s", config.upstream.timeout));
    if config.upstream.insecure_tls {
        startup.warning("TLS certificate verification is disabled for the UPS card");
    }
    if config.api_key.is_none() {
        startup.warning("SERVER_API_KEY is not set, the API is open to everyone");
    }

    startup.phase_services();
    let state = ServerState::new(config)?;
    startup.service("UPS client", ServiceStatus::Started);
    if state.cache.ttl().is_zero() {
        startup.service("Payload cache", ServiceStatus::Disabled);
    } else {
        startup.service("Payload cache", ServiceStatus::Started);
    }
    let auth_status = if state.auth.is_enabled() {
        ServiceStatus::Started
    } else {
        ServiceStatus::Disabled
    };
    startup.service("API key authentication", auth_status);

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;

    startup.phase_ready();
    startup.ready_info(&listener.local_addr()?.to_string());

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::shutdown::shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
