//! Test fixture creation
//!
//! Builds upstream catalog data dated relative to today, so the default
//! 28-day window always covers the "fresh" releases.

use super::constants::*;
use super::stub_catalog::StubCatalog;
use chrono::{Duration, Utc};
use release_radar_server::catalog_client::{
    ArtistMetadata, ArtistRef, CatalogAlbum, CatalogImage, ExternalUrls,
};

pub fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn album(id: &str, album_type: &str, days: i64, artist_ids: &[&str]) -> CatalogAlbum {
    CatalogAlbum {
        id: id.to_string(),
        name: format!("Title of {}", id),
        album_type: album_type.to_string(),
        total_tracks: Some(if album_type == "album" { 12 } else { 1 }),
        release_date: Some(days_ago(days)),
        images: vec![CatalogImage {
            url: format!("https://images.test/{}.jpg", id),
            width: Some(640),
            height: Some(640),
        }],
        external_urls: ExternalUrls {
            spotify: Some(format!("https://open.spotify.com/album/{}", id)),
        },
        artists: artist_ids
            .iter()
            .map(|artist| ArtistRef {
                id: artist.to_string(),
                name: format!("Name of {}", artist),
            })
            .collect(),
    }
}

pub fn metadata(genres: &[&str], popularity: u8, followers: u64) -> ArtistMetadata {
    ArtistMetadata {
        genres: genres.iter().map(|g| g.to_string()).collect(),
        popularity,
        followers,
    }
}

/// Default upstream content:
/// - a "uk drill" single (popularity 50) and a "trap" single (popularity 52),
///   both 3 days old
/// - a "pop" single and an "indie rock" album, a few days old
/// - a compilation, which must never surface
/// - a jazz artist and release reachable only via the artist backfill
pub fn default_catalog() -> StubCatalog {
    let mut catalog = StubCatalog::default();

    catalog.add_artist(DRILL_ARTIST_ID, metadata(&["uk drill"], 50, 100_000));
    catalog.add_artist(TRAP_ARTIST_ID, metadata(&["trap"], 52, 100_000));
    catalog.add_artist(POP_ARTIST_ID, metadata(&["pop"], 70, 1_000_000));
    catalog.add_artist(ROCK_ARTIST_ID, metadata(&["indie rock"], 40, 20_000));

    catalog.new_releases = vec![
        album(DRILL_RELEASE_ID, "single", 3, &[DRILL_ARTIST_ID]),
        album(TRAP_RELEASE_ID, "single", 3, &[TRAP_ARTIST_ID]),
        album(POP_RELEASE_ID, "single", 4, &[POP_ARTIST_ID]),
        album(ROCK_RELEASE_ID, "album", 6, &[ROCK_ARTIST_ID]),
        album(COMPILATION_RELEASE_ID, "compilation", 1, &[POP_ARTIST_ID]),
    ];

    catalog.add_searchable_artist(
        "genre:jazz",
        JAZZ_ARTIST_ID,
        metadata(&["cool jazz"], 30, 5_000),
    );
    catalog.artist_albums.insert(
        JAZZ_ARTIST_ID.to_string(),
        vec![album(JAZZ_RELEASE_ID, "album", 10, &[JAZZ_ARTIST_ID])],
    );

    catalog
}
