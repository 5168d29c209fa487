//! Fake upstream web API
//!
//! A real HTTP server speaking the catalog's wire format, used to drive the
//! production `HttpCatalogClient` end to end: token exchange, listings,
//! batched artist lookups and searches.

use super::constants::*;
use super::fixtures::days_ago;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Default)]
pub struct UpstreamState {
    pub reject_credentials: AtomicBool,
    pub token_calls: AtomicUsize,
    pub api_calls: AtomicUsize,
}

pub struct FakeUpstream {
    /// Base URL of the API, e.g. "http://127.0.0.1:12345/v1"
    pub api_url: String,
    /// Token endpoint URL
    pub auth_url: String,
    pub state: Arc<UpstreamState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn album_json(id: &str, artist_id: &str, days: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Title of {}", id),
        "album_type": "single",
        "total_tracks": 1,
        "release_date": days_ago(days),
        "images": [{ "url": format!("https://images.test/{}.jpg", id), "width": 640, "height": 640 }],
        "external_urls": { "spotify": format!("https://open.spotify.com/album/{}", id) },
        "artists": [{ "id": artist_id, "name": format!("Name of {}", artist_id) }]
    })
}

fn artist_json(id: &str) -> Value {
    let genres = match id {
        DRILL_ARTIST_ID => vec!["uk drill"],
        POP_ARTIST_ID => vec!["pop"],
        _ => vec![],
    };
    json!({
        "id": id,
        "name": format!("Name of {}", id),
        "genres": genres,
        "popularity": 55,
        "followers": { "href": null, "total": 40000 }
    })
}

fn authorized(state: &UpstreamState) -> Result<(), Response> {
    state.api_calls.fetch_add(1, Ordering::SeqCst);
    if state.reject_credentials.load(Ordering::SeqCst) {
        return Err(StatusCode::UNAUTHORIZED.into_response());
    }
    Ok(())
}

async fn token(State(state): State<Arc<UpstreamState>>) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);
    if state.reject_credentials.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }
    Json(json!({
        "access_token": "fake-token",
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn new_releases(State(state): State<Arc<UpstreamState>>) -> Response {
    if let Err(response) = authorized(&state) {
        return response;
    }
    Json(json!({
        "albums": {
            "items": [
                album_json(DRILL_RELEASE_ID, DRILL_ARTIST_ID, 2),
                album_json(POP_RELEASE_ID, POP_ARTIST_ID, 3),
                null
            ]
        }
    }))
    .into_response()
}

async fn artists(
    State(state): State<Arc<UpstreamState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = authorized(&state) {
        return response;
    }
    let ids = params.get("ids").cloned().unwrap_or_default();
    let artists: Vec<Value> = ids
        .split(',')
        .filter(|id| !id.is_empty())
        .map(artist_json)
        .collect();
    Json(json!({ "artists": artists })).into_response()
}

async fn search(State(state): State<Arc<UpstreamState>>) -> Response {
    if let Err(response) = authorized(&state) {
        return response;
    }
    Json(json!({
        "albums": { "items": [] },
        "artists": { "items": [] }
    }))
    .into_response()
}

impl FakeUpstream {
    pub async fn spawn() -> Self {
        let state = Arc::new(UpstreamState::default());

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/browse/new-releases", get(new_releases))
            .route("/v1/artists", get(artists))
            .route("/v1/search", get(search))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            api_url: format!("http://127.0.0.1:{}/v1", port),
            auth_url: format!("http://127.0.0.1:{}/api/token", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
