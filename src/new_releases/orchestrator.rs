//! Cascading fetch: primary listing, window widening, year search and
//! artist backfill.
//!
//! Stages run in order and each one only works on what the previous stages
//! left sparse. Strict requests stop after the primary fetch; light requests
//! additionally skip the year search and the backfill. Once the request
//! deadline passes, remaining stages are skipped and the buckets populated
//! so far are returned.
//!
//! Only credential failures abort a run. Every other upstream error is
//! logged and the stage falls through to the previous result.

use super::backfill::Backfiller;
use super::bucketing::{
    all_empty, bucketize, classify_releases, core_is_stale, has_fresh, project, tracked_keys,
    ClassifiedRelease, ScoringContext,
};
use super::models::{BucketKey, Buckets};
use super::ranking::rank_with_cap;
use super::request::{FetchMode, RequestSignature};
use super::scoring::PRIMARY_HALF_LIFE_DAYS;
use crate::catalog_client::{
    ArtistMetadata, CatalogAlbum, CatalogClient, CatalogError, SearchType, MAX_IDS_PER_BATCH,
    MAX_PAGE_SIZE,
};
use crate::server::metrics::record_fallback_stage;
use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Pages of the new releases listing read by the primary fetch.
pub const PRIMARY_PAGE_COUNT: u32 = 4;

/// Pages read per `year:` query.
pub const YEAR_SEARCH_PAGE_COUNT: u32 = 2;

/// A requested bucket below this size triggers the year search.
pub const YEAR_SEARCH_TRIGGER: usize = 8;

/// Size cap of a sparse bucket after merging year-search results into it.
pub const YEAR_MERGE_CAP: usize = 50;

pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Width of the bounded pools used for metadata batches and backfills.
    pub fetch_concurrency: usize,
    pub request_deadline: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            request_deadline: DEFAULT_REQUEST_DEADLINE,
        }
    }
}

/// Day windows tried, in order, when the requested window yields nothing.
pub fn widening_windows(days: u32) -> [u32; 4] {
    [days, days.max(45), days.max(90), days.max(180)]
}

/// Whether the year search should run on top of `buckets`.
pub fn needs_year_search(buckets: &Buckets, requested: &[BucketKey], days: u32) -> bool {
    let sparse = requested.iter().any(|key| {
        buckets
            .get(key)
            .map_or(true, |bucket| bucket.len() < YEAR_SEARCH_TRIGGER)
    });
    sparse || core_is_stale(buckets, days)
}

/// Folds year-search buckets into the current ones.
///
/// When the current result is wholly empty or its core is stale, every
/// bucket without a fresh item is replaced by its year-search counterpart.
/// Sparse requested buckets that still hold fresh items get the year
/// results merged in. Buckets with enough items are never touched.
pub fn merge_year_results(
    buckets: &mut Buckets,
    year: Buckets,
    requested: &[BucketKey],
    days: u32,
) {
    if all_empty(&year, requested) {
        return;
    }

    let replace_stale = all_empty(buckets, requested) || core_is_stale(buckets, days);
    if replace_stale {
        debug!("Primary result empty or stale, replacing stale buckets with year search result");
    }

    for (key, additions) in year {
        if additions.is_empty() {
            continue;
        }
        let current = buckets.entry(key).or_default();
        if replace_stale && !has_fresh(current, days) {
            *current = additions;
            continue;
        }
        if !requested.contains(&key) || current.len() >= YEAR_SEARCH_TRIGGER {
            continue;
        }
        let mut union = std::mem::take(current);
        union.extend(additions);
        *current = rank_with_cap(union, YEAR_MERGE_CAP);
    }
}

/// Drives the catalog client through the fetch stages for one request.
pub struct FetchOrchestrator {
    client: Arc<dyn CatalogClient>,
    settings: OrchestratorSettings,
}

impl FetchOrchestrator {
    pub fn new(client: Arc<dyn CatalogClient>, settings: OrchestratorSettings) -> Self {
        Self { client, settings }
    }

    /// Builds the buckets for `sig` as of `today`. The result holds exactly
    /// the requested keys.
    pub async fn run(
        &self,
        sig: &RequestSignature,
        today: NaiveDate,
    ) -> Result<Buckets, CatalogError> {
        let deadline = Instant::now() + self.settings.request_deadline;
        let keys = tracked_keys(&sig.genres);
        let ctx = ScoringContext {
            market: &sig.market,
            today,
            half_life_days: PRIMARY_HALF_LIFE_DAYS,
        };

        let pool = match timeout_at(deadline, self.primary_pool(&ctx)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(market = %sig.market, "Primary fetch abandoned at request deadline");
                Vec::new()
            }
        };

        let mut window = sig.days;
        let mut buckets = bucketize(&pool, &keys, window);

        if sig.strict {
            return Ok(project(buckets, &sig.genres));
        }

        if all_empty(&buckets, &sig.genres) {
            record_fallback_stage("widening");
            for candidate_window in widening_windows(sig.days).into_iter().skip(1) {
                if candidate_window == window {
                    continue;
                }
                window = candidate_window;
                buckets = bucketize(&pool, &keys, window);
                debug!(window, "Widened day window");
                if !all_empty(&buckets, &sig.genres) {
                    break;
                }
            }
        }

        if sig.mode == FetchMode::Light {
            return Ok(project(buckets, &sig.genres));
        }

        if needs_year_search(&buckets, &sig.genres, sig.days) {
            if Instant::now() >= deadline {
                debug!("Request deadline reached, skipping year search");
            } else {
                record_fallback_stage("year_search");
                match timeout_at(deadline, self.year_search(&ctx, &keys, window)).await {
                    Ok(Ok(year)) => merge_year_results(&mut buckets, year, &sig.genres, sig.days),
                    Ok(Err(err)) if err.is_fatal() => return Err(err),
                    Ok(Err(err)) => {
                        warn!(error = %err, "Year search failed, keeping previous result");
                    }
                    Err(_) => warn!("Year search abandoned at request deadline"),
                }
            }
        }

        let backfiller = Backfiller::new(
            self.client.as_ref(),
            &sig.market,
            today,
            window,
            self.settings.fetch_concurrency,
            deadline,
        );
        backfiller.run(&mut buckets, &sig.genres).await?;

        let buckets = project(buckets, &sig.genres);
        info!(
            market = %sig.market,
            days = sig.days,
            effective_window = window,
            releases = buckets.values().map(Vec::len).sum::<usize>(),
            "Built new releases buckets"
        );
        Ok(buckets)
    }

    /// Reads the new releases listing and classifies it. Listing and metadata
    /// are fetched once per run; widening only re-filters the result.
    async fn primary_pool(
        &self,
        ctx: &ScoringContext<'_>,
    ) -> Result<Vec<ClassifiedRelease>, CatalogError> {
        let mut albums = Vec::new();
        for page in 0..PRIMARY_PAGE_COUNT {
            match self
                .client
                .new_releases(ctx.market, MAX_PAGE_SIZE, page * MAX_PAGE_SIZE)
                .await
            {
                Ok(items) => {
                    let count = items.len();
                    albums.extend(items);
                    if count < MAX_PAGE_SIZE as usize {
                        break;
                    }
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(page, error = %err, "New releases page failed");
                    break;
                }
            }
        }

        albums.retain(|album| !album.is_compilation());
        let metadata = self.fetch_metadata(&albums).await?;
        Ok(classify_releases(&albums, &metadata, ctx))
    }

    async fn year_search(
        &self,
        ctx: &ScoringContext<'_>,
        keys: &[BucketKey],
        window: u32,
    ) -> Result<Buckets, CatalogError> {
        let year = ctx.today.year();
        let mut albums = Vec::new();

        for query_year in [year, year - 1] {
            let query = format!("year:{}", query_year);
            for page in 0..YEAR_SEARCH_PAGE_COUNT {
                match self
                    .client
                    .search(
                        &query,
                        SearchType::Album,
                        ctx.market,
                        MAX_PAGE_SIZE,
                        page * MAX_PAGE_SIZE,
                    )
                    .await
                {
                    Ok(result) => {
                        let count = result.albums.len();
                        albums.extend(result.albums);
                        if count < MAX_PAGE_SIZE as usize {
                            break;
                        }
                    }
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        warn!(query = %query, page, error = %err, "Year search page failed");
                        break;
                    }
                }
            }
        }

        albums.retain(|album| !album.is_compilation());
        let metadata = self.fetch_metadata(&albums).await?;
        let releases = classify_releases(&albums, &metadata, ctx);
        Ok(bucketize(&releases, keys, window))
    }

    /// Fetches metadata for every credited artist in batches, on a bounded
    /// pool. A failed batch leaves its artists unenriched.
    async fn fetch_metadata(
        &self,
        albums: &[CatalogAlbum],
    ) -> Result<HashMap<String, ArtistMetadata>, CatalogError> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = albums
            .iter()
            .flat_map(|album| album.artists.iter())
            .filter(|artist| !artist.id.is_empty() && seen.insert(artist.id.as_str()))
            .map(|artist| artist.id.clone())
            .collect();

        let batches: Vec<Vec<String>> = ids
            .chunks(MAX_IDS_PER_BATCH)
            .map(<[String]>::to_vec)
            .collect();

        let client = self.client.as_ref();
        let results: Vec<Result<HashMap<String, ArtistMetadata>, CatalogError>> =
            stream::iter(batches)
                .map(|batch| async move { client.get_artists(&batch).await })
                .buffer_unordered(self.settings.fetch_concurrency.max(1))
                .collect()
                .await;

        let mut metadata = HashMap::with_capacity(ids.len());
        for result in results {
            match result {
                Ok(batch) => metadata.extend(batch),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => warn!(error = %err, "Artist metadata batch failed"),
            }
        }
        Ok(metadata)
    }
}
