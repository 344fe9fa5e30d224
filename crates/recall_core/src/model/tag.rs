//! Tag (category) domain model.
//!
//! # Responsibility
//! - Define the reusable tag attached to recalled events.
//! - Carry the default goal ratings copied into newly tagged events.
//!
//! # Invariants
//! - `label` is display-only; events join to tags through `id`.
//! - Color channels are normalized to `[0, 1]`.

use crate::model::error::ModelValidationError;
use crate::model::ratings::GoalRatingSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tag identifier.
pub type TagId = Uuid;

/// RGB color with normalized channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl TagColor {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ModelValidationError::ColorOutOfRange { channel, value });
            }
        }
        Ok(())
    }
}

impl Default for TagColor {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5)
    }
}

/// Reusable label for events with default goal contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
    pub color: TagColor,
    pub is_favorite: bool,
    /// Ratings copied into events when they are tagged.
    pub ratings: GoalRatingSet,
}

impl Tag {
    /// Creates a non-favorite tag with a generated id and no ratings.
    pub fn new(label: impl Into<String>, color: TagColor) -> Self {
        Self::with_id(Uuid::new_v4(), label, color)
    }

    pub fn with_id(id: TagId, label: impl Into<String>, color: TagColor) -> Self {
        Self {
            id,
            label: label.into(),
            color,
            is_favorite: false,
            ratings: GoalRatingSet::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.label.trim().is_empty() {
            return Err(ModelValidationError::BlankLabel);
        }
        self.color.validate()?;
        self.ratings.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{Tag, TagColor};
    use crate::model::error::ModelValidationError;

    #[test]
    fn new_tag_is_valid_with_default_color() {
        let tag = Tag::new("Work", TagColor::default());
        assert!(tag.validate().is_ok());
        assert!(!tag.is_favorite);
        assert!(tag.ratings.is_empty());
    }

    #[test]
    fn blank_label_is_rejected() {
        let tag = Tag::new("   ", TagColor::default());
        assert_eq!(tag.validate().unwrap_err(), ModelValidationError::BlankLabel);
    }

    #[test]
    fn color_channel_out_of_range_is_rejected() {
        let tag = Tag::new("Gym", TagColor::new(0.2, 1.5, 0.0));
        match tag.validate().unwrap_err() {
            ModelValidationError::ColorOutOfRange { channel, .. } => assert_eq!(channel, "green"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
