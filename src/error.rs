//! Error taxonomies for the explorer core.
//!
//! One enum per failure surface: the remote collaborator and the viewer
//! backend. Variants carry the user-visible detail string; callers decide
//! whether a failure is notified, logged, or silently tolerated.

use thiserror::Error;

/// Failures from the remote collaborator.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Image search failed
    #[error("search failed: {0}")]
    Search(String),

    /// Saved-images gallery fetch failed
    #[error("could not load saved images: {0}")]
    Gallery(String),

    /// Label list fetch failed
    #[error("could not load labels: {0}")]
    Load(String),

    /// Label create/delete failed
    #[error("could not save changes: {0}")]
    Persist(String),

    /// Backend rejected the request payload
    #[error("invalid request: {0}")]
    Validation(String),

    /// Target resource does not exist remotely
    #[error("not found: {0}")]
    NotFound(String),

    /// AI analysis request failed
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// Pattern discovery request failed
    #[error("pattern discovery failed: {0}")]
    Discovery(String),
}

impl RemoteError {
    pub fn validation(detail: impl Into<String>) -> Self {
        RemoteError::Validation(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        RemoteError::NotFound(detail.into())
    }
}

/// Failures from the deep-zoom viewer backend.
#[derive(Debug, Clone, Error)]
pub enum ViewerError {
    /// Viewer construction failed; the session stays unbound.
    #[error("could not open viewer for '{url}': {reason}")]
    Init { url: String, reason: String },
}

impl ViewerError {
    pub fn init(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ViewerError::Init {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
