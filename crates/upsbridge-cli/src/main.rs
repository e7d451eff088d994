//! Command-line interface for UPS Bridge.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use upsbridge_api::ServerConfig;
use upsbridge_devices::{
    Dialect, FieldCatalog, OutputMode, TelemetryParser, TelemetrySnapshot, UpstreamClient,
    UpstreamConfig,
};

/// UPS Bridge - Serve Network-MS UPS telemetry as JSON.
#[derive(Parser, Debug)]
#[command(name = "upsbridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web server.
    Serve {
        #[command(flatten)]
        upstream: UpstreamArgs,
        /// Host to bind to (default 0.0.0.0).
        #[arg(long, env = "SERVER_HOST")]
        host: Option<String>,
        /// Port to bind to (default 5000).
        #[arg(short, long, env = "SERVER_PORT")]
        port: Option<String>,
        /// API key required by the telemetry routes. Open access when unset.
        #[arg(long, env = "SERVER_API_KEY", hide_env_values = true)]
        server_api_key: Option<String>,
        /// How long one upstream payload is reused, in milliseconds (0 disables).
        #[arg(long, env = "SNAPSHOT_CACHE_TTL_MS")]
        cache_ttl_ms: Option<String>,
    },
    /// Parse a saved payload file (or `-` for stdin) and print the snapshot.
    Parse {
        /// Payload file.
        #[arg(required = true)]
        path: PathBuf,
        /// Output format (json|raw).
        #[arg(short, long, default_value = "json")]
        format: OutputMode,
        /// Payload dialect (auto|script|table).
        #[arg(short, long, default_value = "auto")]
        dialect: Dialect,
    },
    /// Fetch once from the UPS card and print the snapshot.
    Fetch {
        #[command(flatten)]
        upstream: UpstreamArgs,
        /// Output format (json|raw).
        #[arg(short, long, default_value = "json")]
        format: OutputMode,
    },
    /// Print the field catalog.
    Catalog,
}

/// Connection settings for the UPS network card.
///
/// Values stay untyped here; [`ServerConfig::from_lookup`] owns defaults,
/// empty-value handling and validation.
#[derive(ClapArgs, Debug)]
struct UpstreamArgs {
    /// Address of the UPS network card (required).
    #[arg(long, env = "UPS_IP")]
    ups_ip: Option<String>,
    /// Username for HTTP basic auth.
    #[arg(long, env = "UPS_USERNAME")]
    ups_username: Option<String>,
    /// Password for HTTP basic auth.
    #[arg(long, env = "UPS_PASSWORD", hide_env_values = true)]
    ups_password: Option<String>,
    /// Scheme used to reach the card, http or https (default https).
    #[arg(long, env = "UPS_SCHEME")]
    ups_scheme: Option<String>,
    /// Path of the measurement payload on the card.
    #[arg(long, env = "UPS_ENDPOINT")]
    ups_endpoint: Option<String>,
    /// Fetch timeout in seconds (default 5).
    #[arg(long, env = "UPS_TIMEOUT")]
    ups_timeout: Option<String>,
    /// Accept the card's self-signed certificate, true or false (default true).
    #[arg(long, env = "UPS_INSECURE_TLS")]
    ups_insecure_tls: Option<String>,
}

/// Setting values keyed by environment variable name.
#[derive(Debug, Default)]
struct Settings(HashMap<&'static str, String>);

impl Settings {
    fn set(&mut self, name: &'static str, value: Option<String>) {
        if let Some(value) = value {
            self.0.insert(name, value);
        }
    }

    fn resolve(&self) -> Result<ServerConfig> {
        Ok(ServerConfig::from_lookup(|name| self.0.get(name).cloned())?)
    }
}

impl UpstreamArgs {
    fn into_settings(self) -> Settings {
        let mut settings = Settings::default();
        settings.set("UPS_IP", self.ups_ip);
        settings.set("UPS_USERNAME", self.ups_username);
        settings.set("UPS_PASSWORD", self.ups_password);
        settings.set("UPS_SCHEME", self.ups_scheme);
        settings.set("UPS_ENDPOINT", self.ups_endpoint);
        settings.set("UPS_TIMEOUT", self.ups_timeout);
        settings.set("UPS_INSECURE_TLS", self.ups_insecure_tls);
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Serve {
            upstream,
            host,
            port,
            server_api_key,
            cache_ttl_ms,
        } => {
            let mut settings = upstream.into_settings();
            settings.set("SERVER_HOST", host);
            settings.set("SERVER_PORT", port);
            settings.set("SERVER_API_KEY", server_api_key);
            settings.set("SNAPSHOT_CACHE_TTL_MS", cache_ttl_ms);
            upsbridge_api::run(settings.resolve()?).await
        }
        Command::Parse {
            path,
            format,
            dialect,
        } => run_parse(&path, format, dialect),
        Command::Fetch { upstream, format } => {
            let config = upstream.into_settings().resolve()?;
            run_fetch(config.upstream, format).await
        }
        Command::Catalog => {
            print_catalog();
            Ok(())
        }
    }
}

/// Logs go to stderr so `parse` and `fetch` output stays pipeable.
fn init_tracing(verbose: bool) {
    let json_logging = std::env::var("UPSBRIDGE_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_directive = if verbose { "upsbridge=debug" } else { "upsbridge=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn read_payload(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read payload from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload from {}", path.display()))
}

fn run_parse(path: &Path, format: OutputMode, dialect: Dialect) -> Result<()> {
    let text = read_payload(path)?;
    let snapshot = TelemetryParser::with_dialect(dialect).parse(&text, format)?;
    print_snapshot(&snapshot)
}

async fn run_fetch(config: UpstreamConfig, format: OutputMode) -> Result<()> {
    tracing::debug!(url = %config.url(), "Fetching UPS payload");
    let client = UpstreamClient::new(config)?;
    let body = client.fetch().await?;
    let snapshot = TelemetryParser::new().parse(&body, format)?;
    print_snapshot(&snapshot)
}

fn print_snapshot(snapshot: &TelemetrySnapshot) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

fn print_catalog() {
    println!(
        "{:<28} {:<12} {:<24} {:<20} {:<8} {}",
        "RAW KEY", "GROUP", "LABEL", "KIND", "UNIT", "SCALE"
    );
    for spec in FieldCatalog::global().iter() {
        println!(
            "{:<28} {:<12} {:<24} {:<20} {:<8} {}",
            spec.raw_key,
            spec.group,
            spec.label,
            spec.kind.to_string(),
            spec.unit.unwrap_or("-"),
            spec.scale
        );
    }
}
