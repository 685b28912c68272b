//! Content directory error types

use super::record::ArtifactId;
use thiserror::Error;

/// Result type for directory and portal operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors surfaced by the content directory and its portal backend
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("item {0} is delete-protected")]
    Protected(ArtifactId),

    #[error("item not found: {0}")]
    NotFound(ArtifactId),

    #[error("query has no search terms")]
    EmptyQuery,

    // The backing search fuzzy-matches extension-bearing names and silently
    // strips the extension, returning the wrong item. Callers must pass the
    // item type alongside any name that carries an extension.
    #[error("name \"{0}\" carries an extension; pass the item type to disambiguate")]
    ExtensionBearingName(String),

    #[error("portal error: {0}")]
    Backend(String),
}

impl DirectoryError {
    /// True when the failure is a per-request timeout (retryable once).
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
