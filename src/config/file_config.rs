use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub content_cache_age_sec: Option<usize>,

    // Feature configs
    pub catalog: Option<CatalogConfig>,
    pub new_releases: Option<NewReleasesConfig>,
}

/// `[catalog]` table: upstream API location and client credentials.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_url: Option<String>,
    pub auth_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub timeout_sec: Option<u64>,
}

/// `[new_releases]` table.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct NewReleasesConfig {
    pub default_market: Option<String>,
    pub default_days: Option<u32>,
    pub cache_ttl_sec: Option<u64>,
    pub cache_capacity: Option<usize>,
    pub request_deadline_sec: Option<u64>,
    pub fetch_concurrency: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
