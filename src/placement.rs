//! Label placement state machine.
//!
//! Governs "placing a new label" mode: Inactive until toggled, Placing while
//! waiting for an anchor click, Drafting once the anchor is staged. Repeated
//! clicks while Drafting overwrite the anchor rather than accumulating
//! pending labels.

use crate::model::{CoercedDraft, LabelDraft};
use crate::viewport::NormalizedPoint;

/// Field selectors for draft edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Description,
    Category,
    Width,
    Height,
}

/// Current placement mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlacementState {
    /// No placement in progress
    #[default]
    Inactive,
    /// Waiting for the next canvas click to anchor the draft
    Placing,
    /// Anchor staged; draft fields being edited
    Drafting(LabelDraft),
}

/// Owns the at-most-one live label draft.
#[derive(Debug, Default)]
pub struct PlacementController {
    state: PlacementState,
}

impl PlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    /// Whether placement mode is engaged (Placing or Drafting).
    pub fn is_active(&self) -> bool {
        !matches!(self.state, PlacementState::Inactive)
    }

    /// The live draft, if any.
    pub fn draft(&self) -> Option<&LabelDraft> {
        match &self.state {
            PlacementState::Drafting(draft) => Some(draft),
            _ => None,
        }
    }

    /// Inactive ⇄ Placing. Toggling away from Drafting discards the draft.
    pub fn toggle_placing(&mut self) {
        self.state = match self.state {
            PlacementState::Inactive => {
                log::debug!("placement mode engaged");
                PlacementState::Placing
            }
            _ => {
                log::debug!("placement mode cancelled");
                PlacementState::Inactive
            }
        };
    }

    /// Stage a normalized anchor from a canvas interaction.
    ///
    /// In Placing this starts a fresh draft; in Drafting it overwrites the
    /// staged anchor (re-placement before submit). Ignored while Inactive.
    pub fn place_anchor(&mut self, anchor: NormalizedPoint) {
        match &mut self.state {
            PlacementState::Inactive => {}
            PlacementState::Placing => {
                log::debug!("anchor staged at ({:.3}, {:.3})", anchor.x, anchor.y);
                self.state = PlacementState::Drafting(LabelDraft {
                    anchor: Some(anchor),
                    ..Default::default()
                });
            }
            PlacementState::Drafting(draft) => {
                log::debug!("anchor re-placed at ({:.3}, {:.3})", anchor.x, anchor.y);
                draft.anchor = Some(anchor);
            }
        }
    }

    /// Update a draft field. No-op unless Drafting.
    pub fn update_field(&mut self, field: DraftField, value: String) {
        if let PlacementState::Drafting(draft) = &mut self.state {
            match field {
                DraftField::Name => draft.name = value,
                DraftField::Description => draft.description = value,
                DraftField::Category => draft.category = value,
                DraftField::Width => draft.width = value,
                DraftField::Height => draft.height = value,
            }
        }
    }

    /// Coerced draft values for submission, if the draft qualifies.
    ///
    /// Returns `None` unless Drafting with a non-empty name. The draft stays
    /// live so a failed submission can be retried without re-entering data;
    /// call [`clear`](Self::clear) once the collaborator confirms.
    pub fn submission(&self) -> Option<CoercedDraft> {
        match &self.state {
            PlacementState::Drafting(draft) if draft.is_submittable() => Some(draft.coerce()),
            _ => None,
        }
    }

    /// Discard the draft and return to Inactive (confirmed submit).
    pub fn clear(&mut self) {
        self.state = PlacementState::Inactive;
    }

    /// Abandon placement from any state, discarding the draft.
    pub fn cancel(&mut self) {
        if self.is_active() {
            log::debug!("placement cancelled");
        }
        self.state = PlacementState::Inactive;
    }
}
