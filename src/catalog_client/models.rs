//! Upstream catalog API types.
//!
//! These types match the JSON returned by the catalog web API. Arrays in that
//! API may contain `null` entries (removed or region-locked items), which are
//! dropped during deserialization.

use serde::{Deserialize, Deserializer};

/// Enrichment data for one artist.
///
/// A missing entry is treated as zero signal: no genres, popularity 0 and no
/// followers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistMetadata {
    pub genres: Vec<String>,
    pub popularity: u8,
    pub followers: u64,
}

/// Deserializes `[a, null, b]` (or `null`) into `[a, b]`.
fn skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Artist credit as it appears on an album.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArtistRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Simplified album object as returned by listings and searches.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogAlbum {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default)]
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "skip_nulls")]
    pub images: Vec<CatalogImage>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default, deserialize_with = "skip_nulls")]
    pub artists: Vec<ArtistRef>,
}

impl CatalogAlbum {
    pub fn is_compilation(&self) -> bool {
        self.album_type.eq_ignore_ascii_case("compilation")
    }

    pub fn artist_ids(&self) -> Vec<String> {
        self.artists.iter().map(|a| a.id.clone()).collect()
    }

    pub fn primary_artist_id(&self) -> Option<&str> {
        self.artists.first().map(|a| a.id.as_str())
    }

    pub fn primary_artist_name(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }

    /// The first image is the largest one.
    pub fn image_url(&self) -> Option<String> {
        self.images.first().map(|i| i.url.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Followers {
    #[serde(default)]
    pub total: Option<u64>,
}

/// Full artist object (batched lookups and artist searches).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArtistObject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "skip_nulls")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub followers: Option<Followers>,
}

impl ArtistObject {
    pub fn metadata(&self) -> ArtistMetadata {
        ArtistMetadata {
            genres: self.genres.clone(),
            popularity: self.popularity.unwrap_or(0).min(100) as u8,
            followers: self
                .followers
                .as_ref()
                .and_then(|f| f.total)
                .unwrap_or(0),
        }
    }
}

/// Artist returned by an artist search, with its enrichment data inline.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    pub metadata: ArtistMetadata,
}

impl From<ArtistObject> for CatalogArtist {
    fn from(artist: ArtistObject) -> Self {
        let metadata = artist.metadata();
        CatalogArtist {
            id: artist.id,
            name: artist.name,
            metadata,
        }
    }
}

/// One page of search results. Only the requested entity type is populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub albums: Vec<CatalogAlbum>,
    pub artists: Vec<CatalogArtist>,
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Paging<T> {
    #[serde(default = "Vec::new", deserialize_with = "skip_nulls")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewReleasesResponse {
    pub albums: Paging<CatalogAlbum>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub albums: Option<Paging<CatalogAlbum>>,
    #[serde(default)]
    pub artists: Option<Paging<ArtistObject>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistsResponse {
    #[serde(default, deserialize_with = "skip_nulls")]
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_lifetime")]
    pub expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}
