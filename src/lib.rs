//! Release Radar Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog_client;
pub mod config;
pub mod new_releases;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog_client::{CatalogClient, CatalogError, HttpCatalogClient};
pub use new_releases::{NewReleasesService, RequestSignature};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
