//! HTTP caching middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Marks successful responses as cacheable by clients for `max_age_sec`.
/// Error responses are left uncached.
pub async fn http_cache(
    State(max_age_sec): State<usize>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await.into_response();

    if response.status().is_success() {
        if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", max_age_sec)) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }

    response
}
