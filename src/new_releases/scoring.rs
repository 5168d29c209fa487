//! Composite popularity/recency/follower scoring.
//!
//! ```text
//! score = 100 * (0.60 * pop + 0.30 * recency + 0.10 * followers) + 0.1 * boost
//! ```
//!
//! All inputs are normalized to `[0, 1]` before weighting; the market boost
//! is a flat bonus applied after scaling.

use std::f64::consts::LN_2;

const POPULARITY_WEIGHT: f64 = 0.60;
const RECENCY_WEIGHT: f64 = 0.30;
const FOLLOWERS_WEIGHT: f64 = 0.10;
const BOOST_WEIGHT: f64 = 0.1;

/// Bonus (before weighting) for releases matching the market's affinity tags.
pub const MARKET_BOOST: f64 = 15.0;

/// Half-life used for day-level rankings.
pub const PRIMARY_HALF_LIFE_DAYS: f64 = 7.0;

/// Half-life used by the artist backfill and [`decay_score`].
pub const SECONDARY_HALF_LIFE_DAYS: f64 = 5.0;

/// log10 of the follower count that saturates the follower signal (1M).
const FOLLOWERS_SATURATION_LOG: f64 = 6.0;

/// Affinity tags per storefront. Matching is a case-insensitive substring test.
const MARKET_AFFINITIES: &[(&str, &[&str])] = &[
    ("GB", &["grime", "uk ", "british", "drill", "britpop", "london"]),
    ("US", &["country", "alt-country", "trap"]),
    ("CA", &["canadian", "toronto"]),
    ("AU", &["australian", "aussie"]),
    ("FR", &["french", "francais", "rap fr"]),
    ("DE", &["german", "deutsch"]),
    ("BR", &["brazilian", "funk carioca", "sertanejo", "mpb"]),
    ("MX", &["mexican", "corrido", "regional mexican"]),
    ("JP", &["j-pop", "japanese", "anime"]),
    ("KR", &["k-pop", "korean"]),
    ("NG", &["afrobeats", "nigerian", "naija"]),
    ("IN", &["desi", "bollywood", "indian", "punjabi"]),
];

/// Inputs to [`composite_score`] for a single release.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub popularity: Option<u8>,
    pub followers: Option<u64>,
    pub age_days: i64,
    pub genres: &'a [String],
    pub market: &'a str,
    pub half_life_days: f64,
}

pub fn popularity_norm(popularity: Option<u8>) -> f64 {
    (popularity.unwrap_or(0) as f64 / 100.0).clamp(0.0, 1.0)
}

/// Logarithmic compression so follower count can't dominate the score.
pub fn followers_norm(followers: Option<u64>) -> f64 {
    let followers = followers.unwrap_or(0).max(1) as f64;
    (followers.log10() / FOLLOWERS_SATURATION_LOG).min(1.0)
}

/// Exponential decay in `[0, 1]`; halves every `half_life_days`.
pub fn recency(age_days: i64, half_life_days: f64) -> f64 {
    let age = age_days.max(0) as f64;
    (-(LN_2 / half_life_days) * age).exp()
}

/// Recency alone on the secondary half-life.
pub fn decay_score(age_days: i64) -> f64 {
    recency(age_days, SECONDARY_HALF_LIFE_DAYS)
}

/// Returns [`MARKET_BOOST`] when any tag matches the market's affinity list.
pub fn market_boost(genres: &[String], market: &str) -> f64 {
    let affinities = MARKET_AFFINITIES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(market))
        .map(|(_, tags)| *tags);

    let Some(affinities) = affinities else {
        return 0.0;
    };

    let matched = genres.iter().any(|genre| {
        let genre = genre.to_lowercase();
        affinities.iter().any(|needle| genre.contains(needle))
    });

    if matched {
        MARKET_BOOST
    } else {
        0.0
    }
}

pub fn composite_score(input: &ScoreInput<'_>) -> f64 {
    let weighted = POPULARITY_WEIGHT * popularity_norm(input.popularity)
        + RECENCY_WEIGHT * recency(input.age_days, input.half_life_days)
        + FOLLOWERS_WEIGHT * followers_norm(input.followers);
    100.0 * weighted + BOOST_WEIGHT * market_boost(input.genres, input.market)
}
