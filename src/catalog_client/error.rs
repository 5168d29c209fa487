use thiserror::Error;

/// Errors raised while talking to the upstream catalog API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// The client-credentials exchange failed. Nothing else can succeed
    /// without a bearer token, so this is the only fatal condition.
    #[error("Credential exchange failed: {0}")]
    Credentials(String),

    #[error("Upstream {endpoint} responded with status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl CatalogError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CatalogError::Credentials(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Credentials(_) => "credentials",
            CatalogError::Status { .. } => "status",
            CatalogError::Transport(_) => "transport",
            CatalogError::Decode(_) => "decode",
        }
    }
}
