use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use release_radar_server::catalog_client::{CatalogClient, HttpCatalogClient};
use release_radar_server::config::{AppConfig, CliConfig, FileConfig};
use release_radar_server::new_releases::NewReleasesService;
use release_radar_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().context("Error resolving current directory")?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Genre-bucketed new releases over an upstream music catalog")]
struct CliArgs {
    /// Path to an optional TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The max-age advertised to clients for new releases responses, in seconds.
    #[clap(long, default_value_t = 60)]
    pub content_cache_age_sec: usize,

    /// Base URL of the upstream catalog API.
    #[clap(long)]
    pub catalog_api_url: Option<String>,

    /// Token endpoint used for the client-credentials exchange.
    #[clap(long)]
    pub catalog_auth_url: Option<String>,

    /// Upstream client id.
    #[clap(long, env = "CATALOG_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Upstream client secret.
    #[clap(long, env = "CATALOG_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Timeout in seconds for each upstream request.
    #[clap(long, default_value_t = 10)]
    pub catalog_timeout_sec: u64,

    /// Market used when a request doesn't name one.
    #[clap(long)]
    pub default_market: Option<String>,

    /// Day window used when a request doesn't name one.
    #[clap(long)]
    pub default_days: Option<u32>,

    /// Lifetime of cached new releases responses, in seconds.
    #[clap(long, default_value_t = 60)]
    pub cache_ttl_sec: u64,

    /// Maximum number of cached new releases responses.
    #[clap(long, default_value_t = 256)]
    pub cache_capacity: usize,

    /// Time budget of a single uncached request, in seconds.
    #[clap(long, default_value_t = 20)]
    pub request_deadline_sec: u64,

    /// Maximum concurrent upstream calls per fan-out stage.
    #[clap(long, default_value_t = 4)]
    pub fetch_concurrency: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            content_cache_age_sec: self.content_cache_age_sec,
            catalog_api_url: self.catalog_api_url.clone(),
            catalog_auth_url: self.catalog_auth_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            catalog_timeout_sec: self.catalog_timeout_sec,
            default_market: self.default_market.clone(),
            default_days: self.default_days,
            cache_ttl_sec: self.cache_ttl_sec,
            cache_capacity: self.cache_capacity,
            request_deadline_sec: self.request_deadline_sec,
            fetch_concurrency: self.fetch_concurrency,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)
        .context("Invalid configuration")?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    info!("Using upstream catalog at {}", config.catalog.api_url);
    let client: Arc<dyn CatalogClient> = Arc::new(HttpCatalogClient::new(
        config.catalog.api_url.clone(),
        config.catalog.auth_url.clone(),
        config.catalog.client_id.clone(),
        config.catalog.client_secret.clone(),
        config.catalog.timeout_sec,
    )?);

    info!(
        default_market = %config.new_releases.default_market,
        default_days = config.new_releases.default_days,
        cache_capacity = config.new_releases.cache_capacity,
        cache_ttl_sec = config.new_releases.cache_ttl.as_secs(),
        "New releases service configured"
    );
    let service = Arc::new(NewReleasesService::new(client, &config.new_releases));

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level,
        port: config.port,
        metrics_port: config.metrics_port,
        content_cache_age_sec: config.content_cache_age_sec,
    };
    run_server(server_config, service).await
}
