mod file_config;

pub use file_config::{CatalogConfig, FileConfig, NewReleasesConfig};

use crate::new_releases::request::{parse_market, DEFAULT_DAYS, DEFAULT_MARKET};
use crate::new_releases::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_FETCH_CONCURRENCY, DEFAULT_REQUEST_DEADLINE,
};
use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_CATALOG_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_CATALOG_AUTH_URL: &str = "https://accounts.spotify.com/api/token";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub catalog_api_url: Option<String>,
    pub catalog_auth_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub catalog_timeout_sec: u64,
    pub default_market: Option<String>,
    pub default_days: Option<u32>,
    pub cache_ttl_sec: u64,
    pub cache_capacity: usize,
    pub request_deadline_sec: u64,
    pub fetch_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,

    // Feature configs
    pub catalog: CatalogSettings,
    pub new_releases: NewReleasesSettings,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub api_url: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct NewReleasesSettings {
    /// Already normalized, e.g. `UK` resolves to `GB`.
    pub default_market: String,
    pub default_days: u32,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub request_deadline: Duration,
    pub fetch_concurrency: usize,
}

impl Default for NewReleasesSettings {
    fn default() -> Self {
        Self {
            default_market: DEFAULT_MARKET.to_string(),
            default_days: DEFAULT_DAYS,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            request_deadline: DEFAULT_REQUEST_DEADLINE,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ, both are {}", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);

        let catalog_file = file.catalog.unwrap_or_default();
        let client_id = catalog_file
            .client_id
            .or_else(|| cli.client_id.clone())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("client_id must be specified via --client-id, CATALOG_CLIENT_ID or in config file")
            })?;
        let client_secret = catalog_file
            .client_secret
            .or_else(|| cli.client_secret.clone())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("client_secret must be specified via --client-secret, CATALOG_CLIENT_SECRET or in config file")
            })?;
        let catalog = CatalogSettings {
            api_url: catalog_file
                .api_url
                .or_else(|| cli.catalog_api_url.clone())
                .unwrap_or_else(|| DEFAULT_CATALOG_API_URL.to_string()),
            auth_url: catalog_file
                .auth_url
                .or_else(|| cli.catalog_auth_url.clone())
                .unwrap_or_else(|| DEFAULT_CATALOG_AUTH_URL.to_string()),
            client_id,
            client_secret,
            timeout_sec: catalog_file.timeout_sec.unwrap_or(cli.catalog_timeout_sec),
        };
        if catalog.timeout_sec == 0 {
            bail!("catalog timeout_sec must be greater than 0");
        }

        let nr_file = file.new_releases.unwrap_or_default();
        let defaults = NewReleasesSettings::default();

        let raw_market = nr_file
            .default_market
            .or_else(|| cli.default_market.clone())
            .unwrap_or(defaults.default_market);
        let default_market = parse_market(&raw_market)
            .map_err(|e| anyhow!("Invalid default_market: {}", e))?;

        let default_days = nr_file
            .default_days
            .or(cli.default_days)
            .unwrap_or(defaults.default_days);
        if default_days == 0 {
            bail!("default_days must be greater than 0");
        }

        let fetch_concurrency = nr_file.fetch_concurrency.unwrap_or(cli.fetch_concurrency);
        if fetch_concurrency == 0 {
            bail!("fetch_concurrency must be greater than 0");
        }

        let request_deadline_sec = nr_file
            .request_deadline_sec
            .unwrap_or(cli.request_deadline_sec);
        if request_deadline_sec == 0 {
            bail!("request_deadline_sec must be greater than 0");
        }

        let new_releases = NewReleasesSettings {
            default_market,
            default_days,
            cache_ttl: Duration::from_secs(nr_file.cache_ttl_sec.unwrap_or(cli.cache_ttl_sec)),
            cache_capacity: nr_file.cache_capacity.unwrap_or(cli.cache_capacity),
            request_deadline: Duration::from_secs(request_deadline_sec),
            fetch_concurrency,
        };

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            content_cache_age_sec,
            catalog,
            new_releases,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
