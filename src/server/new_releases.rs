//! New releases API routes

use crate::catalog_client::CatalogError;
use crate::new_releases::{NewReleasesError, NewReleasesQuery, RequestSignature};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, warn};

use super::http_cache;
use super::state::{GuardedNewReleasesService, ServerState};

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// GET /v1/new-releases
async fn get_new_releases(
    State(service): State<GuardedNewReleasesService>,
    query: Result<Query<NewReleasesQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let sig = match RequestSignature::from_query(&query, service.defaults()) {
        Ok(sig) => sig,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match service.get(&sig).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(NewReleasesError::Catalog(err @ CatalogError::Credentials(_))) => {
            error!(error = %err, "Upstream credential exchange failed");
            error_response(StatusCode::BAD_GATEWAY, err.to_string())
        }
        Err(NewReleasesError::Catalog(err)) => {
            warn!(error = %err, "Upstream catalog failure");
            error_response(StatusCode::BAD_GATEWAY, err.to_string())
        }
        Err(err @ NewReleasesError::Serialization(_)) => {
            error!(error = %err, "Failed to build new releases response");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub fn make_new_releases_routes(state: ServerState) -> Router {
    Router::new()
        .route("/new-releases", get(get_new_releases))
        .layer(middleware::from_fn_with_state(
            state.config.content_cache_age_sec,
            http_cache,
        ))
        .with_state(state)
}
