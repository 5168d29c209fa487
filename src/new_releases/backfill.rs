//! Last-resort, artist-driven backfill for sparse buckets.
//!
//! For each sparse bucket the artists matching a static per-bucket query are
//! looked up, their recent albums and singles listed and scored on the short
//! half-life, then appended in tiers of widening windows:
//!
//! | tier | target | window             | buckets      |
//! |------|--------|--------------------|--------------|
//! | 1    | 60     | effective window   | all          |
//! | 2    | 80     | at least 90 days   | all          |
//! | 3    | 100    | at least 365 days  | niche only   |
//!
//! A tier is only entered while the bucket holds fewer than
//! [`BACKFILL_THRESHOLD`] releases.

use super::bucketing::{build_candidate, within_window, ScoringContext};
use super::models::{BucketKey, Buckets, ReleaseCandidate, MAX_BUCKET_SIZE};
use super::ranking::{dedup_and_cap, rank};
use super::scoring::SECONDARY_HALF_LIFE_DAYS;
use crate::catalog_client::{CatalogAlbum, CatalogArtist, CatalogClient, CatalogError, SearchType};
use crate::server::metrics::record_fallback_stage;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Buckets below this size are backfilled.
pub const BACKFILL_THRESHOLD: usize = 24;

/// Artists taken from each bucket's artist search.
pub const BACKFILL_ARTIST_LIMIT: u32 = 10;

/// Albums listed per artist.
pub const ARTIST_ALBUM_LIMIT: u32 = 20;

const INCLUDE_GROUPS: &str = "album,single";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillTier {
    pub target: usize,
    pub min_window_days: u32,
    pub niche_only: bool,
}

pub const BACKFILL_TIERS: [BackfillTier; 3] = [
    BackfillTier {
        target: 60,
        min_window_days: 0,
        niche_only: false,
    },
    BackfillTier {
        target: 80,
        min_window_days: 90,
        niche_only: false,
    },
    BackfillTier {
        target: 100,
        min_window_days: 365,
        niche_only: true,
    },
];

const BACKFILL_QUERIES: &[(BucketKey, &str)] = &[
    (BucketKey::Rap, "genre:\"hip hop\""),
    (BucketKey::Rnb, "genre:\"r&b\""),
    (BucketKey::Pop, "genre:pop"),
    (BucketKey::Latin, "genre:reggaeton"),
    (BucketKey::Edm, "genre:edm"),
    (BucketKey::Rock, "genre:rock"),
    (BucketKey::Country, "genre:country"),
    (BucketKey::Kpop, "genre:k-pop"),
    (BucketKey::Afrobeats, "genre:afrobeats"),
    (BucketKey::Jazz, "genre:jazz"),
    (BucketKey::Dancehall, "genre:dancehall"),
    (BucketKey::Reggae, "genre:reggae"),
    (BucketKey::Indie, "genre:indie"),
    (BucketKey::Metal, "genre:metal"),
    (BucketKey::Punk, "genre:punk"),
    (BucketKey::Folk, "genre:folk"),
    (BucketKey::Blues, "genre:blues"),
    (BucketKey::Classical, "genre:classical"),
    (BucketKey::Soundtrack, "genre:soundtrack"),
    (BucketKey::Ambient, "genre:ambient"),
    (BucketKey::Jpop, "genre:j-pop"),
    (BucketKey::Desi, "genre:bollywood"),
];

/// Artist search query used to backfill `key`.
pub fn backfill_query(key: BucketKey) -> &'static str {
    BACKFILL_QUERIES
        .iter()
        .find(|(bucket, _)| *bucket == key)
        .map(|(_, query)| *query)
        .unwrap_or("genre:pop")
}

/// Appends releases from `pool` to `existing` tier by tier.
pub fn apply_tiers(
    key: BucketKey,
    existing: Vec<ReleaseCandidate>,
    pool: &[ReleaseCandidate],
    window_days: u32,
) -> Vec<ReleaseCandidate> {
    let mut bucket = existing;
    for tier in BACKFILL_TIERS.iter() {
        if bucket.len() >= BACKFILL_THRESHOLD {
            break;
        }
        if tier.niche_only && !key.is_niche() {
            continue;
        }

        let window = window_days.max(tier.min_window_days);
        let additions = {
            let present: HashSet<&str> = bucket.iter().map(|c| c.id.as_str()).collect();
            rank(
                pool.iter()
                    .filter(|c| within_window(c, window) && !present.contains(c.id.as_str()))
                    .cloned()
                    .collect(),
            )
        };

        let room = tier.target.saturating_sub(bucket.len());
        debug!(
            bucket = %key,
            window,
            available = additions.len(),
            room,
            "Applying backfill tier"
        );
        bucket.extend(additions.into_iter().take(room));
    }
    dedup_and_cap(bucket, MAX_BUCKET_SIZE)
}

/// Runs the backfill for one request.
///
/// Artist album listings are cached for the lifetime of this value, so an
/// artist appearing under several buckets is listed once.
pub struct Backfiller<'a> {
    client: &'a dyn CatalogClient,
    market: &'a str,
    today: NaiveDate,
    window_days: u32,
    concurrency: usize,
    deadline: Instant,
    listings: Mutex<HashMap<String, Vec<CatalogAlbum>>>,
}

impl<'a> Backfiller<'a> {
    pub fn new(
        client: &'a dyn CatalogClient,
        market: &'a str,
        today: NaiveDate,
        window_days: u32,
        concurrency: usize,
        deadline: Instant,
    ) -> Self {
        Self {
            client,
            market,
            today,
            window_days,
            concurrency: concurrency.max(1),
            deadline,
            listings: Mutex::new(HashMap::new()),
        }
    }

    /// Backfills every requested bucket below [`BACKFILL_THRESHOLD`].
    ///
    /// Each bucket writes only its own slot. A bucket whose backfill fails or
    /// runs past the deadline keeps its previous content.
    pub async fn run(&self, buckets: &mut Buckets, requested: &[BucketKey]) -> Result<(), CatalogError> {
        let sparse: Vec<(BucketKey, Vec<ReleaseCandidate>)> = requested
            .iter()
            .map(|key| (*key, buckets.get(key).cloned().unwrap_or_default()))
            .filter(|(_, bucket)| bucket.len() < BACKFILL_THRESHOLD)
            .collect();

        if sparse.is_empty() {
            return Ok(());
        }
        if Instant::now() >= self.deadline {
            debug!("Request deadline reached, skipping backfill");
            return Ok(());
        }

        record_fallback_stage("backfill");
        debug!(buckets = sparse.len(), "Backfilling sparse buckets");

        let outcomes: Vec<_> = stream::iter(sparse)
            .map(|(key, existing)| async move {
                let outcome = timeout_at(self.deadline, self.fill_bucket(key, existing)).await;
                (key, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (key, outcome) in outcomes {
            match outcome {
                Ok(Ok(filled)) => {
                    buckets.insert(key, filled);
                }
                Ok(Err(err)) if err.is_fatal() => return Err(err),
                Ok(Err(err)) => {
                    warn!(bucket = %key, error = %err, "Backfill failed, keeping previous result");
                }
                Err(_) => {
                    warn!(bucket = %key, "Backfill abandoned at request deadline");
                }
            }
        }
        Ok(())
    }

    async fn fill_bucket(
        &self,
        key: BucketKey,
        existing: Vec<ReleaseCandidate>,
    ) -> Result<Vec<ReleaseCandidate>, CatalogError> {
        let pool = self.candidate_pool(key).await?;
        Ok(apply_tiers(key, existing, &pool, self.window_days))
    }

    async fn candidate_pool(&self, key: BucketKey) -> Result<Vec<ReleaseCandidate>, CatalogError> {
        let page = self
            .client
            .search(
                backfill_query(key),
                SearchType::Artist,
                self.market,
                BACKFILL_ARTIST_LIMIT,
                0,
            )
            .await?;

        let listings: Vec<(CatalogArtist, Result<Vec<CatalogAlbum>, CatalogError>)> =
            stream::iter(page.artists)
                .map(|artist| async move {
                    let albums = self.artist_albums(&artist.id).await;
                    (artist, albums)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let ctx = ScoringContext {
            market: self.market,
            today: self.today,
            half_life_days: SECONDARY_HALF_LIFE_DAYS,
        };

        let mut pool = Vec::new();
        for (artist, albums) in listings {
            let albums = match albums {
                Ok(albums) => albums,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(artist = %artist.id, error = %err, "Failed to list artist albums");
                    continue;
                }
            };
            pool.extend(
                albums
                    .iter()
                    .filter(|album| !album.is_compilation())
                    .map(|album| {
                        build_candidate(album, Some(&artist.metadata), &artist.metadata.genres, &ctx)
                    }),
            );
        }
        Ok(pool)
    }

    async fn artist_albums(&self, artist_id: &str) -> Result<Vec<CatalogAlbum>, CatalogError> {
        let cached = self.lock_listings().get(artist_id).cloned();
        if let Some(albums) = cached {
            return Ok(albums);
        }

        let albums = self
            .client
            .get_artist_albums(artist_id, INCLUDE_GROUPS, self.market, ARTIST_ALBUM_LIMIT)
            .await?;
        self.lock_listings()
            .insert(artist_id.to_string(), albums.clone());
        Ok(albums)
    }

    fn lock_listings(&self) -> MutexGuard<'_, HashMap<String, Vec<CatalogAlbum>>> {
        self.listings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
