//! CatalogClient trait definition.
//!
//! Defines the upstream operations the ranking pipeline depends on, so the
//! HTTP client can be swapped for in-process doubles in tests.

use super::error::CatalogError;
use super::models::{ArtistMetadata, CatalogAlbum, SearchPage};
use async_trait::async_trait;
use std::collections::HashMap;

/// Upper bound on ids per batched artist lookup.
pub const MAX_IDS_PER_BATCH: usize = 50;

/// Upper bound on items per listing or search page.
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Album,
    Artist,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Album => "album",
            SearchType::Artist => "artist",
        }
    }
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Market-scoped new releases listing.
    async fn new_releases(
        &self,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CatalogAlbum>, CatalogError>;

    /// Free-text search for a single entity type.
    async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, CatalogError>;

    /// Batched artist lookup keyed by artist id.
    ///
    /// Callers pass at most [`MAX_IDS_PER_BATCH`] ids. Unknown ids are simply
    /// absent from the result.
    async fn get_artists(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, ArtistMetadata>, CatalogError>;

    /// Albums of one artist, filtered by `include_groups` (e.g. `album,single`).
    async fn get_artist_albums(
        &self,
        artist_id: &str,
        include_groups: &str,
        market: &str,
        limit: u32,
    ) -> Result<Vec<CatalogAlbum>, CatalogError>;
}
