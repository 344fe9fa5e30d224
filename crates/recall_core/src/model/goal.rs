//! Goal domain model.
//!
//! # Responsibility
//! - Define user targets tracked against rated event hours.
//!
//! # Invariants
//! - `target_hours` is finite and strictly positive.
//! - Progress windows are rolling windows ending at the evaluation instant.

use crate::model::error::ModelValidationError;
use crate::model::ratings::GoalId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// How often a goal's target resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl GoalFrequency {
    /// Length of the rolling progress window in milliseconds.
    pub fn window_ms(self) -> i64 {
        match self {
            Self::Daily => MS_PER_DAY,
            Self::Weekly => 7 * MS_PER_DAY,
            Self::Monthly => 30 * MS_PER_DAY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Ordering hint for goal lists; `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    Medium,
    High,
}

impl GoalPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub label: String,
    pub description: Option<String>,
    pub frequency: GoalFrequency,
    /// Hours to reach within one frequency window.
    pub target_hours: f64,
    pub priority: GoalPriority,
}

impl Goal {
    pub fn new(label: impl Into<String>, frequency: GoalFrequency, target_hours: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            description: None,
            frequency,
            target_hours,
            priority: GoalPriority::Medium,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.label.trim().is_empty() {
            return Err(ModelValidationError::BlankLabel);
        }
        if !self.target_hours.is_finite() || self.target_hours <= 0.0 {
            return Err(ModelValidationError::InvalidTarget(self.target_hours));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Goal, GoalFrequency, GoalPriority};
    use crate::model::error::ModelValidationError;

    #[test]
    fn frequency_roundtrips_through_storage_names() {
        for frequency in [
            GoalFrequency::Daily,
            GoalFrequency::Weekly,
            GoalFrequency::Monthly,
        ] {
            assert_eq!(GoalFrequency::parse(frequency.as_str()), Some(frequency));
        }
        assert_eq!(GoalFrequency::parse("yearly"), None);
    }

    #[test]
    fn priority_orders_high_last() {
        assert!(GoalPriority::High > GoalPriority::Medium);
        assert!(GoalPriority::Medium > GoalPriority::Low);
    }

    #[test]
    fn zero_target_is_rejected() {
        let goal = Goal::new("Read", GoalFrequency::Weekly, 0.0);
        assert_eq!(
            goal.validate().unwrap_err(),
            ModelValidationError::InvalidTarget(0.0)
        );
    }
}
