//! Query parameter parsing for the new releases endpoint.

use super::models::BucketKey;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_MARKET: &str = "GB";
pub const DEFAULT_DAYS: u32 = 28;

/// Raw query string, validated by [`RequestSignature::from_query`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NewReleasesQuery {
    pub market: Option<String>,
    pub days: Option<String>,
    pub genres: Option<String>,
    pub strict: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("invalid market '{0}': expected a 2-letter country code")]
    InvalidMarket(String),

    #[error("invalid days '{0}': expected a positive integer")]
    InvalidDays(String),

    #[error("{0}")]
    UnknownGenre(String),

    #[error("invalid strict flag '{0}': expected true/false/1/0/yes/no")]
    InvalidStrict(String),

    #[error("invalid mode '{0}': expected 'full' or 'light'")]
    InvalidMode(String),
}

/// How much work a cache miss may spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Primary fetch, widening, year search and artist backfill.
    #[default]
    Full,
    /// Primary fetch and widening only.
    Light,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Full => "full",
            FetchMode::Light => "light",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side defaults applied when a parameter is absent.
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub market: String,
    pub days: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            market: DEFAULT_MARKET.to_string(),
            days: DEFAULT_DAYS,
        }
    }
}

/// Normalized request identity. Two requests with equal signatures get the
/// same cached response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    pub market: String,
    pub days: u32,
    pub strict: bool,
    /// Sorted, without duplicates.
    pub genres: Vec<BucketKey>,
    pub mode: FetchMode,
}

impl RequestSignature {
    pub fn from_query(
        query: &NewReleasesQuery,
        defaults: &RequestDefaults,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            market: parse_market(non_empty(&query.market).unwrap_or(&defaults.market))?,
            days: match non_empty(&query.days) {
                Some(raw) => parse_days(raw)?,
                None => defaults.days,
            },
            strict: match non_empty(&query.strict) {
                Some(raw) => parse_flag(raw)?,
                None => false,
            },
            genres: parse_genres(non_empty(&query.genres))?,
            mode: match non_empty(&query.mode) {
                Some(raw) => parse_mode(raw)?,
                None => FetchMode::Full,
            },
        })
    }

    /// `market|days|strict|genres|mode`, e.g. `GB|28|false|pop,rap|full`.
    pub fn cache_key(&self) -> String {
        let genres: Vec<&str> = self.genres.iter().map(|g| g.as_str()).collect();
        format!(
            "{}|{}|{}|{}|{}",
            self.market,
            self.days,
            self.strict,
            genres.join(","),
            self.mode
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn parse_market(raw: &str) -> Result<String, RequestError> {
    let market = raw.trim().to_ascii_uppercase();
    if market.len() != 2 || !market.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RequestError::InvalidMarket(raw.trim().to_string()));
    }
    if market == "UK" {
        return Ok("GB".to_string());
    }
    Ok(market)
}

fn parse_days(raw: &str) -> Result<u32, RequestError> {
    match raw.parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(RequestError::InvalidDays(raw.to_string())),
    }
}

fn parse_flag(raw: &str) -> Result<bool, RequestError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(RequestError::InvalidStrict(raw.to_string())),
    }
}

fn parse_mode(raw: &str) -> Result<FetchMode, RequestError> {
    match raw.to_ascii_lowercase().as_str() {
        "full" => Ok(FetchMode::Full),
        "light" => Ok(FetchMode::Light),
        _ => Err(RequestError::InvalidMode(raw.to_string())),
    }
}

fn parse_genres(raw: Option<&str>) -> Result<Vec<BucketKey>, RequestError> {
    let mut genres = Vec::new();
    if let Some(raw) = raw {
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            genres.push(part.parse::<BucketKey>().map_err(RequestError::UnknownGenre)?);
        }
    }
    if genres.is_empty() {
        genres.extend_from_slice(&BucketKey::DEFAULT);
    }
    genres.sort();
    genres.dedup();
    Ok(genres)
}
