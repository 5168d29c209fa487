//! In-process upstream catalog
//!
//! Serves canned fixture data through the public `CatalogClient` trait and
//! counts calls per operation, so tests can assert on cache hits and on
//! which fallback stages touched the upstream.

use async_trait::async_trait;
use release_radar_server::catalog_client::{
    ArtistMetadata, CatalogAlbum, CatalogArtist, CatalogClient, CatalogError, SearchPage,
    SearchType,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct StubCatalog {
    pub new_releases: Vec<CatalogAlbum>,
    pub album_search: HashMap<String, Vec<CatalogAlbum>>,
    pub artist_search: HashMap<String, Vec<CatalogArtist>>,
    pub artists: HashMap<String, ArtistMetadata>,
    pub artist_albums: HashMap<String, Vec<CatalogAlbum>>,
    /// When set, every call fails the way a rejected credential exchange does.
    pub reject_credentials: AtomicBool,

    new_releases_calls: AtomicUsize,
    search_calls: AtomicUsize,
    artists_calls: AtomicUsize,
    artist_albums_calls: AtomicUsize,
}

impl StubCatalog {
    pub fn add_artist(&mut self, id: &str, metadata: ArtistMetadata) {
        self.artists.insert(id.to_string(), metadata);
    }

    pub fn add_searchable_artist(&mut self, query: &str, id: &str, metadata: ArtistMetadata) {
        self.artist_search
            .entry(query.to_string())
            .or_default()
            .push(CatalogArtist {
                id: id.to_string(),
                name: format!("Name of {}", id),
                metadata,
            });
    }

    pub fn new_releases_calls(&self) -> usize {
        self.new_releases_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn artist_albums_calls(&self) -> usize {
        self.artist_albums_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.new_releases_calls()
            + self.search_calls()
            + self.artists_calls.load(Ordering::SeqCst)
            + self.artist_albums_calls()
    }

    fn check_credentials(&self) -> Result<(), CatalogError> {
        if self.reject_credentials.load(Ordering::SeqCst) {
            return Err(CatalogError::Credentials(
                "token endpoint responded with status 401".to_string(),
            ));
        }
        Ok(())
    }
}

fn page<T: Clone>(items: &[T], limit: u32, offset: u32) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn new_releases(
        &self,
        _market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CatalogAlbum>, CatalogError> {
        self.new_releases_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credentials()?;
        Ok(page(&self.new_releases, limit, offset))
    }

    async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        _market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credentials()?;
        let mut result = SearchPage::default();
        match search_type {
            SearchType::Album => {
                if let Some(albums) = self.album_search.get(query) {
                    result.albums = page(albums, limit, offset);
                }
            }
            SearchType::Artist => {
                if let Some(artists) = self.artist_search.get(query) {
                    result.artists = page(artists, limit, offset);
                }
            }
        }
        Ok(result)
    }

    async fn get_artists(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, ArtistMetadata>, CatalogError> {
        self.artists_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credentials()?;
        Ok(ids
            .iter()
            .filter_map(|id| self.artists.get(id).map(|m| (id.clone(), m.clone())))
            .collect())
    }

    async fn get_artist_albums(
        &self,
        artist_id: &str,
        _include_groups: &str,
        _market: &str,
        limit: u32,
    ) -> Result<Vec<CatalogAlbum>, CatalogError> {
        self.artist_albums_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credentials()?;
        Ok(self
            .artist_albums
            .get(artist_id)
            .map(|albums| page(albums, limit, 0))
            .unwrap_or_default())
    }
}
