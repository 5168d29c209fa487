//! Genre-bucketed new releases: classification, scoring, ranking and the
//! cascading fetch that keeps buckets populated when upstream data is thin.

pub mod backfill;
pub mod bucketing;
pub mod cache;
pub mod genre;
pub mod models;
pub mod orchestrator;
pub mod ranking;
pub mod request;
pub mod scoring;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{ResultCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
pub use models::{BucketKey, Buckets, ReleaseCandidate, ReleaseKind, MAX_BUCKET_SIZE};
pub use orchestrator::{
    FetchOrchestrator, OrchestratorSettings, DEFAULT_FETCH_CONCURRENCY, DEFAULT_REQUEST_DEADLINE,
};
pub use request::{FetchMode, NewReleasesQuery, RequestError, RequestSignature};
pub use service::{NewReleasesError, NewReleasesService};
