//! Goal rating sets attached to tags and events.
//!
//! # Responsibility
//! - Hold the goal-id -> rating-expression mapping used by tags and events.
//! - Interpret rating expressions as numeric multipliers for statistics.
//!
//! # Invariants
//! - Keys are ordered, so iteration and serialization are deterministic.
//! - Rating expressions are stored verbatim; equality is key-by-key.

use crate::model::error::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable goal identifier used as the rating-set key.
pub type GoalId = Uuid;

/// Mapping from goal identifier to rating expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalRatingSet(BTreeMap<GoalId, String>);

impl GoalRatingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, goal_id: &GoalId) -> Option<&str> {
        self.0.get(goal_id).map(String::as_str)
    }

    pub fn contains(&self, goal_id: &GoalId) -> bool {
        self.0.contains_key(goal_id)
    }

    /// Sets the rating for `goal_id`, returning the previous expression.
    pub fn insert(&mut self, goal_id: GoalId, rating: impl Into<String>) -> Option<String> {
        self.0.insert(goal_id, rating.into())
    }

    pub fn remove(&mut self, goal_id: &GoalId) -> Option<String> {
        self.0.remove(goal_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, GoalId, String> {
        self.0.iter()
    }

    pub fn goal_ids(&self) -> impl Iterator<Item = &GoalId> {
        self.0.keys()
    }

    /// Numeric multiplier for `goal_id`, if rated with a parseable expression.
    pub fn multiplier(&self, goal_id: &GoalId) -> Option<f64> {
        self.get(goal_id).and_then(parse_rating)
    }

    /// Rejects blank rating expressions.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        for (goal_id, rating) in &self.0 {
            if rating.trim().is_empty() {
                return Err(ModelValidationError::BlankRating(*goal_id));
            }
        }
        Ok(())
    }
}

impl FromIterator<(GoalId, String)> for GoalRatingSet {
    fn from_iter<I: IntoIterator<Item = (GoalId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a GoalRatingSet {
    type Item = (&'a GoalId, &'a String);
    type IntoIter = btree_map::Iter<'a, GoalId, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for GoalRatingSet {
    type Item = (GoalId, String);
    type IntoIter = btree_map::IntoIter<GoalId, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Parses one rating expression as a decimal multiplier.
///
/// Returns `None` for non-numeric, negative or non-finite expressions.
pub fn parse_rating(expression: &str) -> Option<f64> {
    let value = expression.trim().parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_rating, GoalRatingSet};
    use crate::model::error::ModelValidationError;
    use uuid::Uuid;

    #[test]
    fn parse_rating_accepts_plain_decimals() {
        assert_eq!(parse_rating("1"), Some(1.0));
        assert_eq!(parse_rating(" 0.5 "), Some(0.5));
    }

    #[test]
    fn parse_rating_rejects_garbage_and_negatives() {
        assert_eq!(parse_rating("two"), None);
        assert_eq!(parse_rating("-1"), None);
        assert_eq!(parse_rating("NaN"), None);
        assert_eq!(parse_rating(""), None);
    }

    #[test]
    fn validate_flags_blank_expression() {
        let goal = Uuid::new_v4();
        let mut set = GoalRatingSet::new();
        set.insert(goal, "  ");
        assert_eq!(
            set.validate().unwrap_err(),
            ModelValidationError::BlankRating(goal)
        );
    }

    #[test]
    fn serializes_as_plain_map() {
        let goal = Uuid::new_v4();
        let set: GoalRatingSet = [(goal, "2".to_string())].into_iter().collect();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json[goal.to_string()], "2");
    }
}
