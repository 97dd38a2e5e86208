//! Application message types.
//!
//! All user actions and remote completions are messages in the Elm style;
//! `App::update` is the single place state changes happen. Remote outcomes
//! arrive as explicit `Result` payloads so success and failure flow through
//! the same path.

use crate::error::RemoteError;
use crate::model::{ImageRecord, Label};
use crate::placement::DraftField;
use crate::remote::AnalysisType;
use crate::store::ReloadedLabels;
use crate::tasks::TaskKind;
use crate::viewport::PixelPoint;

/// Top-level message, grouped per concern.
#[derive(Debug, Clone)]
pub enum Message {
    Gallery(GalleryMessage),
    Viewer(ViewerMessage),
    Labels(LabelMessage),
    Placement(PlacementMessage),
    Insight(InsightMessage),
}

/// Search box and image gallery.
#[derive(Debug, Clone)]
pub enum GalleryMessage {
    /// Search input text changed
    QueryChanged(String),
    /// Search submitted (enter/button)
    SearchSubmitted,
    /// Search round trip finished
    SearchCompleted(Result<Vec<ImageRecord>, RemoteError>),
    /// Startup fetch of previously saved images finished
    SavedImagesLoaded(Result<Vec<ImageRecord>, RemoteError>),
    /// An image was selected for viewing
    ImageSelected(String),
    /// The open image was deselected
    ImageDeselected,
}

/// Viewer interactions and navigation.
#[derive(Debug, Clone)]
pub enum ViewerMessage {
    /// Canvas click at a pixel-space position
    CanvasClicked(PixelPoint),
    ZoomIn,
    ZoomOut,
    /// Zoom by a factor keeping the cursor point fixed
    ZoomAt(PixelPoint, f64),
    /// Pan by a pixel delta
    Pan(f64, f64),
    RotateLeft,
    RotateRight,
    ResetView,
}

/// Label list lifecycle.
#[derive(Debug, Clone)]
pub enum LabelMessage {
    /// User asked to delete a label by id
    DeleteRequested(String),
    /// Label list load finished for `image_id`
    LoadCompleted {
        image_id: String,
        result: Result<Vec<Label>, RemoteError>,
    },
    /// A create/delete finished for `image_id`.
    ///
    /// The outer result is the mutation itself; the inner one is the
    /// follow-up reload, which can fail independently after the mutation
    /// has already been persisted.
    MutationCompleted {
        image_id: String,
        result: Result<ReloadedLabels, RemoteError>,
    },
}

/// Label placement mode.
#[derive(Debug, Clone)]
pub enum PlacementMessage {
    /// Toggle placing mode on/off
    Toggled,
    /// A draft field was edited
    FieldChanged(DraftField, String),
    /// Submit the draft
    Submitted,
    /// Abandon placement
    Cancelled,
}

/// AI analysis and pattern discovery.
#[derive(Debug, Clone)]
pub enum InsightMessage {
    /// Request analysis of the open image
    AnalysisRequested(AnalysisType),
    /// Analysis round trip finished for `image_url`
    AnalysisCompleted {
        image_url: String,
        result: Result<String, RemoteError>,
    },
    /// Close the analysis panel
    AnalysisDismissed,
    /// Request the cross-collection discovery summary
    DiscoveryRequested,
    /// Discovery round trip finished
    DiscoveryCompleted(Result<String, RemoteError>),
    /// Close the patterns panel
    PatternsDismissed,
}

impl Message {
    /// Task slot released by this message, if it is a remote completion.
    ///
    /// `App::update` releases the slot before examining the payload, so
    /// failures can never leave a kind stuck busy.
    pub fn completed_kind(&self) -> Option<TaskKind> {
        match self {
            Message::Gallery(GalleryMessage::SearchCompleted(_)) => Some(TaskKind::Search),
            Message::Labels(LabelMessage::MutationCompleted { .. }) => Some(TaskKind::LabelMutation),
            Message::Insight(InsightMessage::AnalysisCompleted { .. }) => Some(TaskKind::Analysis),
            Message::Insight(InsightMessage::DiscoveryCompleted(_)) => Some(TaskKind::Discovery),
            _ => None,
        }
    }
}
