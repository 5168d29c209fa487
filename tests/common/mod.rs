//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_new_releases() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_new_releases(&[("genres", "rap")]).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod constants;
mod fixtures;
mod server;
mod stub_catalog;
mod upstream;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{album, default_catalog, metadata};
#[allow(unused_imports)]
pub use server::{TestServer, TEST_CONTENT_CACHE_AGE_SEC};
pub use stub_catalog::StubCatalog;
#[allow(unused_imports)]
pub use upstream::FakeUpstream;
