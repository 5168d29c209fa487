use axum::extract::FromRef;

use crate::new_releases::NewReleasesService;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedNewReleasesService = Arc<NewReleasesService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub new_releases: GuardedNewReleasesService,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedNewReleasesService {
    fn from_ref(input: &ServerState) -> Self {
        input.new_releases.clone()
    }
}
