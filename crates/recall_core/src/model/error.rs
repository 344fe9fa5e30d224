//! Field-level validation errors for domain records.

use crate::model::ratings::GoalId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure raised before a record reaches storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// Tag or goal label is empty after trimming.
    BlankLabel,
    /// Event title is empty after trimming.
    BlankTitle,
    /// A rating expression for the given goal is empty after trimming.
    BlankRating(GoalId),
    /// A color channel is outside `[0, 1]` or not finite.
    ColorOutOfRange { channel: &'static str, value: f64 },
    /// `end_ms` is earlier than `start_ms`.
    InvertedTimeRange { start_ms: i64, end_ms: i64 },
    /// Goal target must be finite and strictly positive.
    InvalidTarget(f64),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankLabel => write!(f, "label must not be blank"),
            Self::BlankTitle => write!(f, "event title must not be blank"),
            Self::BlankRating(goal_id) => {
                write!(f, "rating expression for goal {goal_id} must not be blank")
            }
            Self::ColorOutOfRange { channel, value } => {
                write!(f, "color channel `{channel}` out of range [0, 1]: {value}")
            }
            Self::InvertedTimeRange { start_ms, end_ms } => {
                write!(f, "event end {end_ms} is earlier than start {start_ms}")
            }
            Self::InvalidTarget(value) => {
                write!(f, "goal target hours must be finite and positive: {value}")
            }
        }
    }
}

impl Error for ModelValidationError {}
