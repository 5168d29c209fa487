//! Client-credentials token exchange.

use super::error::CatalogError;
use super::models::TokenResponse;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A token is refreshed this long before its stated expiry.
pub const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Exchanges client credentials for a bearer token and caches it.
///
/// The cache sits behind an async mutex so concurrent callers that find the
/// token stale wait for a single exchange instead of racing.
pub struct TokenProvider {
    client: Client,
    auth_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(client: Client, auth_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            client,
            auth_url,
            client_id,
            client_secret,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, exchanging credentials if needed.
    pub async fn bearer(&self) -> Result<String, CatalogError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drops the cached token, e.g. after the API rejected it.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn exchange(&self) -> Result<AccessToken, CatalogError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(CatalogError::Credentials(
                "client credentials are not configured".to_string(),
            ));
        }

        debug!(auth_url = %self.auth_url, "Exchanging client credentials");

        let response = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Credentials(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token endpoint rejected credentials");
            return Err(CatalogError::Credentials(format!(
                "token endpoint responded with status {}",
                status.as_u16()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Credentials(format!("invalid token response: {}", e)))?;

        Ok(AccessToken {
            value: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }
}
