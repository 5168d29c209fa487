//! Upstream catalog API access.

mod credentials;
mod error;
mod http_client;
mod models;
mod trait_def;

pub use credentials::{TokenProvider, TOKEN_REFRESH_MARGIN};
pub use error::CatalogError;
pub use http_client::HttpCatalogClient;
pub use models::{
    ArtistMetadata, ArtistObject, ArtistRef, CatalogAlbum, CatalogArtist, CatalogImage,
    ExternalUrls, Followers, SearchPage,
};
#[cfg(feature = "mock")]
pub use trait_def::MockCatalogClient;
pub use trait_def::{CatalogClient, SearchType, MAX_IDS_PER_BATCH, MAX_PAGE_SIZE};
