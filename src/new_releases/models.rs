//! Core types shared by the classification, scoring and ranking stages.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum number of releases a bucket may hold after any stage.
pub const MAX_BUCKET_SIZE: usize = 100;

/// Effective age given to releases whose date is missing or unparseable.
pub const UNDATED_AGE_DAYS: i64 = 9999;

/// Canonical genre bucket.
///
/// Declaration order is the classifier's priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKey {
    Rap,
    Rnb,
    Pop,
    Latin,
    Edm,
    Rock,
    Country,
    Kpop,
    Afrobeats,
    Jazz,
    Dancehall,
    Reggae,
    Indie,
    Metal,
    Punk,
    Folk,
    Blues,
    Classical,
    Soundtrack,
    Ambient,
    Jpop,
    Desi,
}

impl BucketKey {
    pub const ALL: [BucketKey; 22] = [
        BucketKey::Rap,
        BucketKey::Rnb,
        BucketKey::Pop,
        BucketKey::Latin,
        BucketKey::Edm,
        BucketKey::Rock,
        BucketKey::Country,
        BucketKey::Kpop,
        BucketKey::Afrobeats,
        BucketKey::Jazz,
        BucketKey::Dancehall,
        BucketKey::Reggae,
        BucketKey::Indie,
        BucketKey::Metal,
        BucketKey::Punk,
        BucketKey::Folk,
        BucketKey::Blues,
        BucketKey::Classical,
        BucketKey::Soundtrack,
        BucketKey::Ambient,
        BucketKey::Jpop,
        BucketKey::Desi,
    ];

    /// Buckets whose staleness decides whether the primary result is usable at all.
    pub const CORE: [BucketKey; 4] = [BucketKey::Rap, BucketKey::Rnb, BucketKey::Pop, BucketKey::Rock];

    /// Buckets served when a request names no genres.
    pub const DEFAULT: [BucketKey; 10] = [
        BucketKey::Rap,
        BucketKey::Rnb,
        BucketKey::Pop,
        BucketKey::Rock,
        BucketKey::Latin,
        BucketKey::Edm,
        BucketKey::Country,
        BucketKey::Kpop,
        BucketKey::Afrobeats,
        BucketKey::Indie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKey::Rap => "rap",
            BucketKey::Rnb => "rnb",
            BucketKey::Pop => "pop",
            BucketKey::Latin => "latin",
            BucketKey::Edm => "edm",
            BucketKey::Rock => "rock",
            BucketKey::Country => "country",
            BucketKey::Kpop => "kpop",
            BucketKey::Afrobeats => "afrobeats",
            BucketKey::Jazz => "jazz",
            BucketKey::Dancehall => "dancehall",
            BucketKey::Reggae => "reggae",
            BucketKey::Indie => "indie",
            BucketKey::Metal => "metal",
            BucketKey::Punk => "punk",
            BucketKey::Folk => "folk",
            BucketKey::Blues => "blues",
            BucketKey::Classical => "classical",
            BucketKey::Soundtrack => "soundtrack",
            BucketKey::Ambient => "ambient",
            BucketKey::Jpop => "jpop",
            BucketKey::Desi => "desi",
        }
    }

    /// Niche buckets get one extra backfill tier with a much wider window.
    pub fn is_niche(&self) -> bool {
        matches!(
            self,
            BucketKey::Jazz
                | BucketKey::Blues
                | BucketKey::Classical
                | BucketKey::Soundtrack
                | BucketKey::Ambient
                | BucketKey::Folk
                | BucketKey::Reggae
                | BucketKey::Dancehall
                | BucketKey::Jpop
                | BucketKey::Desi
        )
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        BucketKey::ALL
            .iter()
            .find(|key| key.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown genre bucket '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    Single,
    Ep,
    Album,
}

impl ReleaseKind {
    /// Derives the kind from the upstream track count, falling back to the
    /// declared type when the count is unknown.
    pub fn from_track_count(total_tracks: u32, declared_type: &str) -> Self {
        match total_tracks {
            0 if declared_type.eq_ignore_ascii_case("single") => ReleaseKind::Single,
            0 => ReleaseKind::Album,
            1..=2 => ReleaseKind::Single,
            3..=6 => ReleaseKind::Ep,
            _ => ReleaseKind::Album,
        }
    }
}

/// One catalog item competing for a place in a bucket.
///
/// Only the identifying and display fields are serialized; score, popularity
/// and age exist for ranking and never leave the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseCandidate {
    pub id: String,
    pub title: String,
    #[serde(rename = "artist")]
    pub primary_artist: String,
    pub release_date: String,
    #[serde(rename = "spotifyUrl")]
    pub external_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: ReleaseKind,
    #[serde(skip)]
    pub released_on: Option<NaiveDate>,
    #[serde(skip)]
    pub score: f64,
    #[serde(skip)]
    pub popularity: u8,
    #[serde(skip)]
    pub age_days: i64,
}

/// Ranked buckets keyed by genre.
pub type Buckets = BTreeMap<BucketKey, Vec<ReleaseCandidate>>;

/// Parses a full or partial release date.
///
/// Year-only dates land on July 1 and year-month dates on the 15th.
pub fn normalize_release_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.trim().split('-').collect();
    let year: i32 = parts.first()?.parse().ok()?;
    match parts.len() {
        1 => NaiveDate::from_ymd_opt(year, 7, 1),
        2 => NaiveDate::from_ymd_opt(year, parts[1].parse().ok()?, 15),
        3 => NaiveDate::from_ymd_opt(year, parts[1].parse().ok()?, parts[2].parse().ok()?),
        _ => None,
    }
}

/// Days between `released_on` and `today`, never negative.
pub fn age_in_days(released_on: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match released_on {
        Some(date) => (today - date).num_days().max(0),
        None => UNDATED_AGE_DAYS,
    }
}
