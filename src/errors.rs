use serde::Serialize;
use thiserror::Error;

/// Error taxonomy for the catalog core.
///
/// The core never silently substitutes data: callers get either a correct
/// result, an explicitly empty result, or one of these.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by mirror")]
    RateLimited,

    #[error("Mirror returned HTTP {0}")]
    Http(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("All mirrors failed: {0}")]
    AllMirrorsFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Stream unavailable for track {0}")]
    StreamUnavailable(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}
