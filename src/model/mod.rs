//! Data model for images and their spatial labels.

mod image;
mod label;

pub use image::ImageRecord;
pub use label::{CoercedDraft, Label, LabelDraft, coerce_anchor, coerce_extent};
