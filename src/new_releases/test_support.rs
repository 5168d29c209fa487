//! In-process catalog double for pipeline unit tests.

use crate::catalog_client::{
    ArtistMetadata, ArtistRef, CatalogAlbum, CatalogArtist, CatalogClient, CatalogError,
    ExternalUrls, SearchPage, SearchType,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn days_ago(today: NaiveDate, days: i64) -> String {
    (today - chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn album(id: &str, release_date: &str, artist_ids: &[&str]) -> CatalogAlbum {
    CatalogAlbum {
        id: id.to_string(),
        name: format!("Release {}", id),
        album_type: "single".to_string(),
        total_tracks: Some(1),
        release_date: Some(release_date.to_string()),
        images: vec![],
        external_urls: ExternalUrls {
            spotify: Some(format!("https://open.spotify.com/album/{}", id)),
        },
        artists: artist_ids
            .iter()
            .map(|id| ArtistRef {
                id: id.to_string(),
                name: format!("Artist {}", id),
            })
            .collect(),
    }
}

pub fn meta(genres: &[&str], popularity: u8) -> ArtistMetadata {
    ArtistMetadata {
        genres: genres.iter().map(|g| g.to_string()).collect(),
        popularity,
        followers: 50_000,
    }
}

/// Serves canned data and counts calls per operation.
#[derive(Default)]
pub struct StubCatalog {
    pub new_releases: Vec<CatalogAlbum>,
    pub album_search: HashMap<String, Vec<CatalogAlbum>>,
    pub artist_search: HashMap<String, Vec<CatalogArtist>>,
    pub artists: HashMap<String, ArtistMetadata>,
    pub artist_albums: HashMap<String, Vec<CatalogAlbum>>,
    pub reject_credentials: bool,
    pub fail_artist_lookups: bool,
    pub search_delay: Option<Duration>,

    pub new_releases_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub artists_calls: AtomicUsize,
    pub artist_albums_calls: AtomicUsize,
}

impl StubCatalog {
    pub fn with_artist(mut self, id: &str, metadata: ArtistMetadata) -> Self {
        self.artists.insert(id.to_string(), metadata);
        self
    }

    pub fn searchable_artist(mut self, query: &str, id: &str, metadata: ArtistMetadata) -> Self {
        self.artist_search
            .entry(query.to_string())
            .or_default()
            .push(CatalogArtist {
                id: id.to_string(),
                name: format!("Artist {}", id),
                metadata,
            });
        self
    }

    pub fn total_calls(&self) -> usize {
        self.new_releases_calls.load(Ordering::SeqCst)
            + self.search_calls.load(Ordering::SeqCst)
            + self.artists_calls.load(Ordering::SeqCst)
            + self.artist_albums_calls.load(Ordering::SeqCst)
    }

    fn check_credentials(&self) -> Result<(), CatalogError> {
        if self.reject_credentials {
            return Err(CatalogError::Credentials("rejected".to_string()));
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
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
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
        if self.fail_artist_lookups {
            return Err(CatalogError::Status {
                endpoint: "artists",
                status: 503,
            });
        }
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
