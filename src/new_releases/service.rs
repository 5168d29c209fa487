//! Entry point used by the HTTP layer: cache lookup, orchestration on miss,
//! serialization.

use super::cache::ResultCache;
use super::models::Buckets;
use super::orchestrator::{FetchOrchestrator, OrchestratorSettings};
use super::request::{RequestDefaults, RequestSignature};
use crate::catalog_client::{CatalogClient, CatalogError};
use crate::config::NewReleasesSettings;
use crate::server::metrics::record_cache_lookup;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NewReleasesError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct NewReleasesBody<'a> {
    market: &'a str,
    days: u32,
    buckets: &'a Buckets,
}

pub struct NewReleasesService {
    orchestrator: FetchOrchestrator,
    cache: ResultCache,
    defaults: RequestDefaults,
}

impl NewReleasesService {
    pub fn new(client: Arc<dyn CatalogClient>, settings: &NewReleasesSettings) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(
                client,
                OrchestratorSettings {
                    fetch_concurrency: settings.fetch_concurrency,
                    request_deadline: settings.request_deadline,
                },
            ),
            cache: ResultCache::new(settings.cache_capacity, settings.cache_ttl),
            defaults: RequestDefaults {
                market: settings.default_market.clone(),
                days: settings.default_days,
            },
        }
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Returns the serialized response body for `sig`.
    pub async fn get(&self, sig: &RequestSignature) -> Result<String, NewReleasesError> {
        self.get_for_date(sig, Utc::now().date_naive()).await
    }

    /// Same as [`Self::get`], with ages measured against `today`.
    pub async fn get_for_date(
        &self,
        sig: &RequestSignature,
        today: NaiveDate,
    ) -> Result<String, NewReleasesError> {
        let key = sig.cache_key();
        if let Some(body) = self.cache.get(&key) {
            record_cache_lookup(true);
            debug!(key = %key, "New releases cache hit");
            return Ok(body);
        }
        record_cache_lookup(false);
        debug!(key = %key, "New releases cache miss");

        let buckets = self.orchestrator.run(sig, today).await?;
        let body = serde_json::to_string(&NewReleasesBody {
            market: &sig.market,
            days: sig.days,
            buckets: &buckets,
        })?;

        self.cache.put(key, body.clone());
        Ok(body)
    }
}
