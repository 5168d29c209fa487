//! Turns upstream albums into ranked genre buckets.

use super::genre::{classify, tagged_artist};
use super::models::{
    age_in_days, normalize_release_date, BucketKey, Buckets, ReleaseCandidate, ReleaseKind,
};
use super::ranking::rank;
use super::scoring::{composite_score, ScoreInput};
use crate::catalog_client::{ArtistMetadata, CatalogAlbum};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Scoring parameters shared by every release of one run.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub market: &'a str,
    pub today: NaiveDate,
    pub half_life_days: f64,
}

/// A release that has been classified and scored but not yet filtered to a
/// day window.
#[derive(Debug, Clone)]
pub struct ClassifiedRelease {
    pub bucket: BucketKey,
    pub candidate: ReleaseCandidate,
}

/// Builds a scored candidate for `album`.
///
/// `signal` supplies popularity and followers, `genres` the tags checked for
/// the market boost. Either may be absent, in which case it contributes zero.
pub fn build_candidate(
    album: &CatalogAlbum,
    signal: Option<&ArtistMetadata>,
    genres: &[String],
    ctx: &ScoringContext<'_>,
) -> ReleaseCandidate {
    let raw_date = album.release_date.clone().unwrap_or_default();
    let released_on = normalize_release_date(&raw_date);
    let age_days = age_in_days(released_on, ctx.today);
    let popularity = signal.map(|m| m.popularity);

    let score = composite_score(&ScoreInput {
        popularity,
        followers: signal.map(|m| m.followers),
        age_days,
        genres,
        market: ctx.market,
        half_life_days: ctx.half_life_days,
    });

    ReleaseCandidate {
        id: album.id.clone(),
        title: album.name.clone(),
        primary_artist: album.primary_artist_name().to_string(),
        release_date: raw_date,
        external_url: album.external_urls.spotify.clone(),
        image_url: album.image_url(),
        kind: ReleaseKind::from_track_count(album.total_tracks.unwrap_or(0), &album.album_type),
        released_on,
        score,
        popularity: popularity.unwrap_or(0),
        age_days,
    }
}

/// Classifies and scores albums, dropping compilations and releases whose
/// credited artists carry no usable genre tags.
pub fn classify_releases(
    albums: &[CatalogAlbum],
    metadata: &HashMap<String, ArtistMetadata>,
    ctx: &ScoringContext<'_>,
) -> Vec<ClassifiedRelease> {
    albums
        .iter()
        .filter(|album| !album.is_compilation())
        .filter_map(|album| {
            let artist_ids = album.artist_ids();
            let tagged = tagged_artist(&artist_ids, metadata)?;
            let bucket = classify(&tagged.genres)?;
            let primary = album.primary_artist_id().and_then(|id| metadata.get(id));
            Some(ClassifiedRelease {
                bucket,
                candidate: build_candidate(album, primary, &tagged.genres, ctx),
            })
        })
        .collect()
}

/// Undated releases have no age to compare and are never excluded.
pub fn within_window(candidate: &ReleaseCandidate, window_days: u32) -> bool {
    candidate.released_on.is_none() || candidate.age_days <= i64::from(window_days)
}

/// Groups releases inside `window_days` into ranked buckets. Every key in
/// `keys` is present in the result, possibly empty.
pub fn bucketize(releases: &[ClassifiedRelease], keys: &[BucketKey], window_days: u32) -> Buckets {
    let mut grouped: Buckets = keys.iter().map(|key| (*key, Vec::new())).collect();
    for release in releases {
        if !within_window(&release.candidate, window_days) {
            continue;
        }
        if let Some(bucket) = grouped.get_mut(&release.bucket) {
            bucket.push(release.candidate.clone());
        }
    }
    grouped
        .into_iter()
        .map(|(key, candidates)| (key, rank(candidates)))
        .collect()
}

/// Requested keys plus the core keys needed for the staleness check.
pub fn tracked_keys(requested: &[BucketKey]) -> Vec<BucketKey> {
    let mut keys: Vec<BucketKey> = requested
        .iter()
        .chain(BucketKey::CORE.iter())
        .copied()
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

pub fn all_empty(buckets: &Buckets, keys: &[BucketKey]) -> bool {
    keys.iter()
        .all(|key| buckets.get(key).map_or(true, |b| b.is_empty()))
}

/// True when no core bucket holds a dated release younger than `window_days`.
pub fn core_is_stale(buckets: &Buckets, window_days: u32) -> bool {
    !BucketKey::CORE.iter().any(|key| {
        buckets
            .get(key)
            .is_some_and(|bucket| has_fresh(bucket, window_days))
    })
}

/// Whether any dated candidate in `bucket` falls inside the window.
pub fn has_fresh(bucket: &[ReleaseCandidate], window_days: u32) -> bool {
    bucket
        .iter()
        .any(|c| c.released_on.is_some() && c.age_days <= i64::from(window_days))
}

/// Keeps only the requested keys, adding empty buckets for missing ones.
pub fn project(mut buckets: Buckets, requested: &[BucketKey]) -> Buckets {
    requested
        .iter()
        .map(|key| (*key, buckets.remove(key).unwrap_or_default()))
        .collect()
}
