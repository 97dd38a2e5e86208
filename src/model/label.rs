//! Label types and numeric coercion.
//!
//! Labels are anchored in normalized content space: x, y, width, height are
//! always finite values in [0,1]. Anything malformed coming out of the
//! editing UI is coerced to a safe default before it can reach persistence.

use serde::{Deserialize, Serialize};

use crate::constants::draft;
use crate::viewport::NormalizedPoint;

/// A persisted spatial annotation on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Server-assigned identifier.
    pub id: String,
    /// Short display name.
    pub label: String,
    /// Optional long-form description.
    #[serde(default)]
    pub description: String,
    /// Optional category string.
    #[serde(default)]
    pub category: String,
    /// Normalized anchor X in [0,1].
    pub x: f64,
    /// Normalized anchor Y in [0,1].
    pub y: f64,
    /// Normalized extent width in [0,1]; 0 for point labels.
    #[serde(default)]
    pub width: f64,
    /// Normalized extent height in [0,1]; 0 for point labels.
    #[serde(default)]
    pub height: f64,
}

/// In-progress label as typed by the user.
///
/// Numeric fields are kept as raw strings until submission so partially
/// typed input never produces NaN; `coerce` applies the safe defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Staged normalized anchor from the last placement click.
    pub anchor: Option<NormalizedPoint>,
    /// Extent width as typed; empty means a point label.
    pub width: String,
    /// Extent height as typed; empty means a point label.
    pub height: String,
}

impl LabelDraft {
    /// Whether the draft can be submitted (non-empty name).
    pub fn is_submittable(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Sanitize the draft into the values sent to the collaborator.
    pub fn coerce(&self) -> CoercedDraft {
        let (x, y) = match self.anchor {
            Some(a) => (coerce_anchor(a.x), coerce_anchor(a.y)),
            None => (draft::DEFAULT_ANCHOR, draft::DEFAULT_ANCHOR),
        };
        CoercedDraft {
            label: self.name.trim().to_string(),
            description: self.description.clone(),
            category: self.category.clone(),
            x,
            y,
            width: coerce_extent(self.width.trim().parse().ok()),
            height: coerce_extent(self.height.trim().parse().ok()),
        }
    }
}

/// A validated draft ready for the wire: all numerics finite and in [0,1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercedDraft {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Clamp an anchor coordinate into [0,1], substituting the center default
/// for non-finite input.
pub fn coerce_anchor(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        draft::DEFAULT_ANCHOR
    }
}

/// Clamp an extent into [0,1], substituting zero for missing or non-finite
/// input.
pub fn coerce_extent(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => draft::DEFAULT_EXTENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_anchor(x: f64, y: f64) -> LabelDraft {
        LabelDraft {
            name: "Core".to_string(),
            anchor: Some(NormalizedPoint::new(x, y)),
            ..Default::default()
        }
    }

    #[test]
    fn empty_extent_coerces_to_zero() {
        let mut d = draft_with_anchor(0.3, 0.4);
        d.width = String::new();
        d.height = "   ".to_string();
        let c = d.coerce();
        assert_eq!(c.width, 0.0);
        assert_eq!(c.height, 0.0);
    }

    #[test]
    fn non_numeric_extent_coerces_to_zero() {
        let mut d = draft_with_anchor(0.3, 0.4);
        d.width = "abc".to_string();
        d.height = "1.2.3".to_string();
        let c = d.coerce();
        assert_eq!(c.width, 0.0);
        assert_eq!(c.height, 0.0);
    }

    #[test]
    fn valid_extent_is_parsed_and_clamped() {
        let mut d = draft_with_anchor(0.3, 0.4);
        d.width = "0.25".to_string();
        d.height = "7.5".to_string();
        let c = d.coerce();
        assert_eq!(c.width, 0.25);
        assert_eq!(c.height, 1.0);
    }

    #[test]
    fn missing_anchor_defaults_to_center() {
        let d = LabelDraft {
            name: "Core".to_string(),
            ..Default::default()
        };
        let c = d.coerce();
        assert_eq!(c.x, 0.5);
        assert_eq!(c.y, 0.5);
    }

    #[test]
    fn non_finite_anchor_defaults_to_center() {
        let d = draft_with_anchor(f64::NAN, f64::INFINITY);
        let c = d.coerce();
        assert_eq!(c.x, 0.5);
        assert_eq!(c.y, 0.5);
    }

    #[test]
    fn out_of_bounds_anchor_is_clamped() {
        let d = draft_with_anchor(-0.2, 1.4);
        let c = d.coerce();
        assert_eq!(c.x, 0.0);
        assert_eq!(c.y, 1.0);
    }

    #[test]
    fn blank_name_is_not_submittable() {
        let mut d = draft_with_anchor(0.5, 0.5);
        d.name = "   ".to_string();
        assert!(!d.is_submittable());
        d.name = "Crater".to_string();
        assert!(d.is_submittable());
    }

    #[test]
    fn coerced_name_is_trimmed() {
        let mut d = draft_with_anchor(0.5, 0.5);
        d.name = "  Core  ".to_string();
        assert_eq!(d.coerce().label, "Core");
    }

    #[test]
    fn label_wire_format_round_trips() {
        let json = r#"{"id":"l1","label":"Core","x":0.3,"y":0.4}"#;
        let label: Label = serde_json::from_str(json).unwrap();
        assert_eq!(label.width, 0.0);
        assert_eq!(label.category, "");
        let back = serde_json::to_string(&label).unwrap();
        assert!(back.contains("\"label\":\"Core\""));
    }
}
