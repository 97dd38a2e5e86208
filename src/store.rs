//! Client-side annotation store.
//!
//! Holds the ordered label list for the currently open image. All mutations
//! go through the remote collaborator and are followed by a full reload, so
//! the locally displayed set is always a function of the last successful
//! remote read; a label can never exist locally without having been
//! persisted. Failures leave the previous collection untouched.

use crate::error::RemoteError;
use crate::model::{CoercedDraft, Label};
use crate::remote::RemoteCollaborator;

/// Labels for the currently bound image.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    image_id: Option<String>,
    labels: Vec<Label>,
    synced: bool,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image the store currently tracks.
    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// The locally known labels, in remote order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Whether at least one remote read has been applied since the last
    /// image switch. While false, the (empty) list is "not loaded yet"
    /// rather than "no labels".
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Start tracking `image_id`. The label list stays empty until the
    /// first confirmed load arrives.
    pub fn bind_image(&mut self, image_id: &str) {
        self.image_id = Some(image_id.to_string());
        self.labels.clear();
        self.synced = false;
    }

    /// Evict local state on image deselect. Remote copies are untouched.
    pub fn evict(&mut self) {
        self.image_id = None;
        self.labels.clear();
        self.synced = false;
    }

    /// Apply a confirmed remote read.
    ///
    /// Returns `false` and leaves local state untouched when the response
    /// originates from an image that is no longer bound. The discard is
    /// silent apart from a debug log.
    pub fn apply_loaded(&mut self, image_id: &str, labels: Vec<Label>) -> bool {
        if self.image_id.as_deref() != Some(image_id) {
            log::debug!(
                "discarding stale label response for image {image_id} (bound: {:?})",
                self.image_id
            );
            return false;
        }
        log::debug!("labels for image {image_id}: {} entries", labels.len());
        self.labels = labels;
        self.synced = true;
        true
    }
}

// ============================================================================
// Mediation protocol (runs on worker threads)
// ============================================================================

/// Result of the reload that follows a confirmed mutation.
///
/// The mutation itself already succeeded; a reload failure only means the
/// fresh list could not be fetched, so the caller keeps its previous local
/// list and reports the load error.
pub type ReloadedLabels = Result<Vec<Label>, RemoteError>;

fn reload(api: &dyn RemoteCollaborator, image_id: &str) -> ReloadedLabels {
    api.list_labels(image_id).map_err(|e| {
        log::warn!("reload after mutation failed for {image_id}: {e}");
        e
    })
}

/// Persist a new label, then re-read the authoritative list.
///
/// No optimistic insert: a create failure leaves the caller's local state
/// alone and is surfaced for display. Once the create has succeeded the
/// mutation is a success even if the follow-up reload fails; retrying the
/// whole operation at that point would persist a duplicate.
pub fn create_and_reload(
    api: &dyn RemoteCollaborator,
    image_id: &str,
    draft: &CoercedDraft,
) -> Result<ReloadedLabels, RemoteError> {
    let created = api.create_label(image_id, draft)?;
    log::info!("label '{}' persisted as {}", created.label, created.id);
    Ok(reload(api, image_id))
}

/// Delete a label, then re-read the authoritative list.
///
/// A NotFound from the delete is tolerated: the label is gone remotely
/// either way, and the reload makes the local list converge.
pub fn delete_and_reload(
    api: &dyn RemoteCollaborator,
    image_id: &str,
    label_id: &str,
) -> Result<ReloadedLabels, RemoteError> {
    match api.delete_label(image_id, label_id) {
        Ok(()) => {}
        Err(RemoteError::NotFound(detail)) => {
            log::debug!("label {label_id} already deleted remotely: {detail}");
        }
        Err(e) => return Err(e),
    }
    Ok(reload(api, image_id))
}
