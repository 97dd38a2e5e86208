//! Remote collaborator boundary.
//!
//! The backend that performs image search, label persistence, and AI
//! analysis is an external service; this module fixes its logical contract
//! and provides two implementations: an HTTP client against the real REST
//! backend and an in-memory backend for offline runs and tests.

mod http;
mod memory;
mod worker;

pub use http::HttpCollaborator;
pub use memory::MemoryCollaborator;
pub use worker::{RemoteJob, RemoteWorker};

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::model::{CoercedDraft, ImageRecord, Label};

/// Media type filter for image search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

/// Kind of AI analysis requested for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    #[default]
    General,
    Features,
    Patterns,
    Anomalies,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::General => "general",
            AnalysisType::Features => "features",
            AnalysisType::Patterns => "patterns",
            AnalysisType::Anomalies => "anomalies",
        }
    }

    /// Parse a user-facing name; unknown names fall back to `General`,
    /// matching the backend's prompt lookup.
    pub fn parse(name: &str) -> Self {
        match name {
            "features" => AnalysisType::Features,
            "patterns" => AnalysisType::Patterns,
            "anomalies" => AnalysisType::Anomalies,
            _ => AnalysisType::General,
        }
    }
}

/// Logical operations offered by the remote backend.
///
/// All calls block; they are issued from worker threads, never from the
/// main update loop.
pub trait RemoteCollaborator: Send + Sync {
    /// Search the image archive.
    fn search_images(&self, query: &str, media_type: MediaType)
    -> Result<Vec<ImageRecord>, RemoteError>;

    /// Fetch previously saved images (startup gallery).
    fn list_saved_images(&self) -> Result<Vec<ImageRecord>, RemoteError>;

    /// Fetch the full label list for an image.
    fn list_labels(&self, image_id: &str) -> Result<Vec<Label>, RemoteError>;

    /// Persist a new label; returns the canonical record with its
    /// server-assigned id.
    fn create_label(&self, image_id: &str, draft: &CoercedDraft) -> Result<Label, RemoteError>;

    /// Delete a label.
    fn delete_label(&self, image_id: &str, label_id: &str) -> Result<(), RemoteError>;

    /// Request AI analysis text for an image.
    fn analyze_image(
        &self,
        image_url: &str,
        analysis_type: AnalysisType,
    ) -> Result<String, RemoteError>;

    /// Request a cross-image pattern discovery summary.
    fn discover_patterns(&self) -> Result<String, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_type_parses_known_names_and_defaults() {
        assert_eq!(AnalysisType::parse("features"), AnalysisType::Features);
        assert_eq!(AnalysisType::parse("patterns"), AnalysisType::Patterns);
        assert_eq!(AnalysisType::parse("anomalies"), AnalysisType::Anomalies);
        assert_eq!(AnalysisType::parse("general"), AnalysisType::General);
        assert_eq!(AnalysisType::parse("bogus"), AnalysisType::General);
    }

    #[test]
    fn wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&AnalysisType::Features).unwrap(),
            "\"features\""
        );
        assert_eq!(serde_json::to_string(&MediaType::Image).unwrap(), "\"image\"");
    }
}
