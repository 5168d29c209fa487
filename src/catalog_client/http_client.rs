//! HTTP client for the upstream catalog web API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use super::credentials::TokenProvider;
use super::error::CatalogError;
use super::models::{
    ArtistMetadata, ArtistsResponse, CatalogAlbum, CatalogArtist, NewReleasesResponse, Paging,
    SearchPage, SearchResponse,
};
use super::trait_def::{CatalogClient, SearchType, MAX_IDS_PER_BATCH};
use crate::server::metrics::record_upstream_call;

/// Catalog client backed by the real web API.
pub struct HttpCatalogClient {
    client: Client,
    api_url: String,
    tokens: TokenProvider,
}

impl HttpCatalogClient {
    /// Create a new catalog client.
    ///
    /// # Arguments
    /// * `api_url` - Base URL of the catalog API (e.g., "https://api.spotify.com/v1")
    /// * `auth_url` - Token endpoint for the client-credentials exchange
    /// * `timeout_sec` - Per-request timeout in seconds
    pub fn new(
        api_url: String,
        auth_url: String,
        client_id: String,
        client_secret: String,
        timeout_sec: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        let api_url = api_url.trim_end_matches('/').to_string();
        let tokens = TokenProvider::new(client.clone(), auth_url, client_id, client_secret);

        Ok(Self {
            client,
            api_url,
            tokens,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let start = Instant::now();
        let result = self.send_get(endpoint, path, query).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind(),
        };
        record_upstream_call(endpoint, outcome, start.elapsed());
        result
    }

    async fn send_get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let token = self.tokens.bearer().await?;
        let url = format!("{}{}", self.api_url, path);

        debug!(endpoint, url = %url, "Calling catalog API");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(format!("{}: {}", endpoint, e)))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn new_releases(
        &self,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CatalogAlbum>, CatalogError> {
        let response: NewReleasesResponse = self
            .get_json(
                "new_releases",
                "/browse/new-releases",
                &[
                    ("country", market.to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;
        Ok(response.albums.items)
    }

    async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchPage, CatalogError> {
        let response: SearchResponse = self
            .get_json(
                "search",
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", search_type.as_str().to_string()),
                    ("market", market.to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        Ok(SearchPage {
            albums: response.albums.map(|p| p.items).unwrap_or_default(),
            artists: response
                .artists
                .map(|p| p.items.into_iter().map(CatalogArtist::from).collect())
                .unwrap_or_default(),
        })
    }

    async fn get_artists(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, ArtistMetadata>, CatalogError> {
        let mut metadata = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_BATCH) {
            let response: ArtistsResponse = self
                .get_json("artists", "/artists", &[("ids", chunk.join(","))])
                .await?;
            for artist in response.artists {
                metadata.insert(artist.id.clone(), artist.metadata());
            }
        }
        Ok(metadata)
    }

    async fn get_artist_albums(
        &self,
        artist_id: &str,
        include_groups: &str,
        market: &str,
        limit: u32,
    ) -> Result<Vec<CatalogAlbum>, CatalogError> {
        let path = format!("/artists/{}/albums", urlencoding::encode(artist_id));
        let response: Paging<CatalogAlbum> = self
            .get_json(
                "artist_albums",
                &path,
                &[
                    ("include_groups", include_groups.to_string()),
                    ("market", market.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(response.items)
    }
}
