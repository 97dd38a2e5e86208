//! In-memory collaborator for offline runs and tests.
//!
//! Mirrors the backend's observable semantics: labels get server-style
//! assigned ids, deleting a missing label reports NotFound, and creating a
//! label with an empty name is rejected with a validation error.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::RemoteError;
use crate::model::{CoercedDraft, ImageRecord, Label};

use super::{AnalysisType, MediaType, RemoteCollaborator};

#[derive(Default)]
struct MemoryState {
    images: Vec<ImageRecord>,
    labels: HashMap<String, Vec<Label>>,
    next_label_id: u64,
}

/// Collaborator backed by process memory.
pub struct MemoryCollaborator {
    state: Mutex<MemoryState>,
}

impl MemoryCollaborator {
    /// Empty collection.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Collection pre-seeded with the given images.
    pub fn with_images(images: Vec<ImageRecord>) -> Self {
        let collab = Self::new();
        {
            let mut state = collab.state.lock().expect("memory state poisoned");
            for image in &images {
                state.labels.insert(image.id.clone(), image.labels.clone());
            }
            state.images = images;
        }
        collab
    }

    /// Small built-in gallery so the explorer is usable without a backend.
    pub fn with_demo_gallery() -> Self {
        let mk = |id: &str, title: &str, desc: &str| {
            let mut rec = ImageRecord::new(
                id,
                title,
                format!("https://images.example/{id}/full.jpg"),
            );
            rec.description = desc.to_string();
            rec.thumbnail_url = Some(format!("https://images.example/{id}/thumb.jpg"));
            rec
        };
        Self::with_images(vec![
            mk(
                "demo-carina",
                "Carina Nebula",
                "Star-forming region with towering dust pillars.",
            ),
            mk(
                "demo-m31",
                "Andromeda Galaxy",
                "Nearest major spiral galaxy to the Milky Way.",
            ),
            mk(
                "demo-mars",
                "Jezero Crater",
                "Ancient river delta on the Martian surface.",
            ),
        ])
    }
}

impl Default for MemoryCollaborator {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteCollaborator for MemoryCollaborator {
    fn search_images(
        &self,
        query: &str,
        _media_type: MediaType,
    ) -> Result<Vec<ImageRecord>, RemoteError> {
        let state = self.state.lock().expect("memory state poisoned");
        let needle = query.to_lowercase();
        Ok(state
            .images
            .iter()
            .filter(|img| {
                img.title.to_lowercase().contains(&needle)
                    || img.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    fn list_saved_images(&self) -> Result<Vec<ImageRecord>, RemoteError> {
        let state = self.state.lock().expect("memory state poisoned");
        Ok(state.images.clone())
    }

    fn list_labels(&self, image_id: &str) -> Result<Vec<Label>, RemoteError> {
        let state = self.state.lock().expect("memory state poisoned");
        Ok(state.labels.get(image_id).cloned().unwrap_or_default())
    }

    fn create_label(&self, image_id: &str, draft: &CoercedDraft) -> Result<Label, RemoteError> {
        if draft.label.trim().is_empty() {
            return Err(RemoteError::validation("label name must not be empty"));
        }
        let mut state = self.state.lock().expect("memory state poisoned");
        state.next_label_id += 1;
        let label = Label {
            id: format!("label-{}", state.next_label_id),
            label: draft.label.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            x: draft.x,
            y: draft.y,
            width: draft.width,
            height: draft.height,
        };
        state
            .labels
            .entry(image_id.to_string())
            .or_default()
            .push(label.clone());
        Ok(label)
    }

    fn delete_label(&self, image_id: &str, label_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().expect("memory state poisoned");
        let labels = state
            .labels
            .get_mut(image_id)
            .ok_or_else(|| RemoteError::not_found(format!("image {image_id}")))?;
        let before = labels.len();
        labels.retain(|l| l.id != label_id);
        if labels.len() == before {
            return Err(RemoteError::not_found(format!("label {label_id}")));
        }
        Ok(())
    }

    fn analyze_image(
        &self,
        image_url: &str,
        analysis_type: AnalysisType,
    ) -> Result<String, RemoteError> {
        Ok(format!(
            "[offline {} analysis] no AI backend configured for {image_url}",
            analysis_type.as_str()
        ))
    }

    fn discover_patterns(&self) -> Result<String, RemoteError> {
        let state = self.state.lock().expect("memory state poisoned");
        let labeled = state.labels.values().filter(|l| !l.is_empty()).count();
        if labeled == 0 {
            return Ok("No labeled images found for pattern discovery".to_string());
        }
        Ok(format!(
            "[offline discovery] {labeled} labeled image(s); no AI backend configured"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> CoercedDraft {
        CoercedDraft {
            label: name.to_string(),
            description: String::new(),
            category: String::new(),
            x: 0.3,
            y: 0.4,
            width: 0.0,
            height: 0.0,
        }
    }

    #[test]
    fn create_assigns_server_ids_in_order() {
        let api = MemoryCollaborator::new();
        let a = api.create_label("img", &draft("A")).unwrap();
        let b = api.create_label("img", &draft("B")).unwrap();
        assert_ne!(a.id, b.id);

        let labels = api.list_labels("img").unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label, "A");
        assert_eq!(labels[1].label, "B");
    }

    #[test]
    fn empty_name_is_rejected() {
        let api = MemoryCollaborator::new();
        let err = api.create_label("img", &draft("  ")).unwrap_err();
        assert!(matches!(err, RemoteError::Validation(_)));
        assert!(api.list_labels("img").unwrap().is_empty());
    }

    #[test]
    fn delete_missing_label_reports_not_found() {
        let api = MemoryCollaborator::new();
        let label = api.create_label("img", &draft("A")).unwrap();
        api.delete_label("img", &label.id).unwrap();
        let err = api.delete_label("img", &label.id).unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));
    }

    #[test]
    fn search_matches_title_and_description() {
        let api = MemoryCollaborator::with_demo_gallery();
        let hits = api.search_images("nebula", MediaType::Image).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Carina Nebula");

        let hits = api.search_images("galaxy", MediaType::Image).unwrap();
        assert!(!hits.is_empty());
    }

    #[test]
    fn discovery_reports_when_nothing_is_labeled() {
        let api = MemoryCollaborator::new();
        let text = api.discover_patterns().unwrap();
        assert!(text.contains("No labeled images"));
    }
}
