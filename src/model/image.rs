//! Image metadata as held in the remote collection.

use serde::{Deserialize, Serialize};

use super::Label;

/// One image in the collection.
///
/// The remote collection owns these; the client holds a read-mostly cached
/// copy per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Server-assigned identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Full-resolution source URL fed to the deep-zoom viewer.
    pub url: String,
    /// Thumbnail URL for gallery display, if available.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Labels known at fetch time (authoritative copies live server-side).
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Cached AI analysis text, if the server has produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

impl ImageRecord {
    /// Create a record with the required fields; the rest default empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            url: url.into(),
            thumbnail_url: None,
            labels: Vec::new(),
            ai_analysis: None,
        }
    }
}
