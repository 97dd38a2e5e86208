//! Message handlers for the explorer core.
//!
//! Each handler processes one category of messages against only the state
//! slice it owns, keeping the main `App::update` function small. Handlers
//! that need a follow-up remote call return the job; the app dispatches it
//! through the task tracker.

use crate::app::{GalleryState, TextPanel};
use crate::message::{GalleryMessage, InsightMessage, PlacementMessage, ViewerMessage};
use crate::placement::PlacementController;
use crate::remote::{MediaType, RemoteJob};
use crate::viewer::ViewerSession;

/// Handle search box and gallery messages.
///
/// Selection messages are cross-cutting and handled by the app itself.
pub fn handle_gallery(
    msg: GalleryMessage,
    gallery: &mut GalleryState,
    notifications: &mut Vec<String>,
) -> Option<RemoteJob> {
    match msg {
        GalleryMessage::QueryChanged(text) => {
            gallery.query = text;
            None
        }
        GalleryMessage::SearchSubmitted => {
            let query = gallery.query.trim().to_string();
            if query.is_empty() {
                return None;
            }
            Some(RemoteJob::Search {
                query,
                media_type: MediaType::Image,
            })
        }
        GalleryMessage::SearchCompleted(Ok(images)) => {
            log::info!("search returned {} image(s)", images.len());
            gallery.images = images;
            None
        }
        GalleryMessage::SearchCompleted(Err(e)) => {
            log::warn!("search failed: {e}");
            notifications.push(e.to_string());
            None
        }
        GalleryMessage::SavedImagesLoaded(Ok(images)) => {
            // Pre-populates the gallery once at startup; an empty result
            // keeps whatever is already shown.
            if !images.is_empty() {
                log::info!("loaded {} saved image(s)", images.len());
                gallery.images = images;
            }
            None
        }
        GalleryMessage::SavedImagesLoaded(Err(e)) => {
            // Non-fatal: the gallery simply starts empty.
            log::warn!("saved images unavailable: {e}");
            None
        }
        GalleryMessage::ImageSelected(_) | GalleryMessage::ImageDeselected => None,
    }
}

/// Handle viewer navigation (zoom, pan, rotate).
///
/// Canvas clicks are cross-cutting (placement) and handled by the app.
/// Navigation while unbound is ignored.
pub fn handle_viewer_nav(msg: ViewerMessage, session: &mut ViewerSession) {
    let Some(viewer) = session.instance_mut() else {
        log::debug!("viewer navigation ignored: no image bound");
        return;
    };
    match msg {
        ViewerMessage::ZoomIn => viewer.zoom_in(),
        ViewerMessage::ZoomOut => viewer.zoom_out(),
        ViewerMessage::ZoomAt(cursor, factor) => viewer.zoom_at(cursor, factor),
        ViewerMessage::Pan(dx, dy) => viewer.pan_by(dx, dy),
        ViewerMessage::RotateLeft => {
            viewer.rotate_by(-crate::constants::viewer::ROTATE_STEP_DEG)
        }
        ViewerMessage::RotateRight => {
            viewer.rotate_by(crate::constants::viewer::ROTATE_STEP_DEG)
        }
        ViewerMessage::ResetView => viewer.reset_view(),
        ViewerMessage::CanvasClicked(_) => {}
    }
}

/// Handle placement mode messages that touch only the controller.
///
/// Submission is cross-cutting (store + remote dispatch) and handled by
/// the app.
pub fn handle_placement(msg: PlacementMessage, placement: &mut PlacementController) {
    match msg {
        PlacementMessage::Toggled => placement.toggle_placing(),
        PlacementMessage::FieldChanged(field, value) => placement.update_field(field, value),
        PlacementMessage::Cancelled => placement.cancel(),
        PlacementMessage::Submitted => {}
    }
}

/// Handle analysis/discovery panel messages.
///
/// `selected_url` is the URL of the currently open image; analysis
/// completions for any other URL are stale and discarded.
pub fn handle_insight(
    msg: InsightMessage,
    analysis: &mut TextPanel,
    patterns: &mut TextPanel,
    notifications: &mut Vec<String>,
    selected_url: Option<&str>,
) -> Option<RemoteJob> {
    match msg {
        InsightMessage::AnalysisRequested(analysis_type) => {
            let url = selected_url?;
            Some(RemoteJob::Analyze {
                image_url: url.to_string(),
                analysis_type,
            })
        }
        InsightMessage::AnalysisCompleted { image_url, result } => {
            if selected_url != Some(image_url.as_str()) {
                log::debug!("discarding stale analysis for '{image_url}'");
                return None;
            }
            match result {
                Ok(text) => analysis.show(text),
                Err(e) => notifications.push(e.to_string()),
            }
            None
        }
        InsightMessage::AnalysisDismissed => {
            analysis.visible = false;
            None
        }
        InsightMessage::DiscoveryRequested => Some(RemoteJob::Discover),
        InsightMessage::DiscoveryCompleted(Ok(text)) => {
            patterns.show(text);
            None
        }
        InsightMessage::DiscoveryCompleted(Err(e)) => {
            notifications.push(e.to_string());
            None
        }
        InsightMessage::PatternsDismissed => {
            patterns.visible = false;
            None
        }
    }
}
