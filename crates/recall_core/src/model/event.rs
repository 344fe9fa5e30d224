//! Recalled event domain model.
//!
//! # Responsibility
//! - Define the retrospectively logged event record.
//! - Hold per-event goal ratings that may diverge from the tag's defaults.
//!
//! # Invariants
//! - `end_ms` is never earlier than `start_ms`.
//! - `ratings` start as a copy of the tag's ratings and are only changed by
//!   explicit customization, retagging or tag-update propagation.

use crate::model::error::ModelValidationError;
use crate::model::ratings::GoalRatingSet;
use crate::model::tag::TagId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable event identifier.
pub type EventId = Uuid;

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub notes: Option<String>,
    /// Unix epoch milliseconds.
    pub start_ms: i64,
    /// Unix epoch milliseconds, `>= start_ms`.
    pub end_ms: i64,
    /// `None` once the tag has been deleted or when recalled untagged.
    pub tag_id: Option<TagId>,
    pub ratings: GoalRatingSet,
}

impl Event {
    /// Creates an untagged event with a generated id.
    pub fn new(title: impl Into<String>, start_ms: i64, end_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), title, start_ms, end_ms)
    }

    pub fn with_id(id: EventId, title: impl Into<String>, start_ms: i64, end_ms: i64) -> Self {
        Self {
            id,
            title: title.into(),
            notes: None,
            start_ms,
            end_ms,
            tag_id: None,
            ratings: GoalRatingSet::new(),
        }
    }

    /// Event length in fractional hours.
    ///
    /// Widened to `i128` so any pair of epoch bounds fits.
    pub fn duration_hours(&self) -> f64 {
        (i128::from(self.end_ms) - i128::from(self.start_ms)) as f64 / MS_PER_HOUR
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.title.trim().is_empty() {
            return Err(ModelValidationError::BlankTitle);
        }
        if self.end_ms < self.start_ms {
            return Err(ModelValidationError::InvertedTimeRange {
                start_ms: self.start_ms,
                end_ms: self.end_ms,
            });
        }
        self.ratings.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::Event;
    use crate::model::error::ModelValidationError;

    #[test]
    fn duration_is_reported_in_hours() {
        let event = Event::new("Deep work", 0, 5_400_000);
        assert!((event.duration_hours() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let event = Event::new("Backwards", 10, 5);
        assert_eq!(
            event.validate().unwrap_err(),
            ModelValidationError::InvertedTimeRange {
                start_ms: 10,
                end_ms: 5
            }
        );
    }

    #[test]
    fn widest_range_has_positive_duration() {
        let event = Event::new("Forever", i64::MIN, i64::MAX);
        assert!(event.validate().is_ok());
        let expected = (2.0 * i64::MAX as f64) / 3_600_000.0;
        assert!(event.duration_hours() > 0.0);
        assert!((event.duration_hours() - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn zero_length_event_is_allowed() {
        assert!(Event::new("Instant", 42, 42).validate().is_ok());
    }
}
