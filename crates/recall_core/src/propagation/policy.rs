//! Pure rating-set recomputation for tag edits.

use crate::model::ratings::GoalRatingSet;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How a tag edit cascades into the ratings of events already carrying it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagUpdatePolicy {
    /// Only label/color changed; event ratings stay as they are.
    NameOnly,
    /// Every event takes the tag's new ratings wholesale.
    CompleteOverride,
    /// Events follow the tag only where they never diverged from it.
    #[default]
    PreserveCustom,
}

impl TagUpdatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameOnly => "name_only",
            Self::CompleteOverride => "complete_override",
            Self::PreserveCustom => "preserve_custom",
        }
    }
}

impl Display for TagUpdatePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagUpdatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name_only" => Ok(Self::NameOnly),
            "complete_override" => Ok(Self::CompleteOverride),
            "preserve_custom" => Ok(Self::PreserveCustom),
            other => Err(format!(
                "unsupported tag update policy `{other}`; expected name_only|complete_override|preserve_custom"
            )),
        }
    }
}

/// Computes one event's ratings after its tag went from `old` to `new`.
///
/// Under `PreserveCustom`:
/// - a key whose event value still equals `old[key]` follows `new[key]`, and
///   disappears when `new` no longer has it;
/// - a key whose event value differs from `old[key]` is left alone;
/// - a key only in `new` is added unless the event already has a value for it.
pub fn propagate_ratings(
    policy: TagUpdatePolicy,
    current: &GoalRatingSet,
    old: &GoalRatingSet,
    new: &GoalRatingSet,
) -> GoalRatingSet {
    match policy {
        TagUpdatePolicy::NameOnly => current.clone(),
        TagUpdatePolicy::CompleteOverride => new.clone(),
        TagUpdatePolicy::PreserveCustom => preserve_custom(current, old, new),
    }
}

fn preserve_custom(
    current: &GoalRatingSet,
    old: &GoalRatingSet,
    new: &GoalRatingSet,
) -> GoalRatingSet {
    let mut next = GoalRatingSet::new();

    for (goal_id, value) in current {
        if old.get(goal_id) == Some(value.as_str()) {
            if let Some(updated) = new.get(goal_id) {
                next.insert(*goal_id, updated);
            }
        } else {
            next.insert(*goal_id, value.clone());
        }
    }

    for (goal_id, rating) in new {
        if !old.contains(goal_id) && !current.contains(goal_id) {
            next.insert(*goal_id, rating.clone());
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::{propagate_ratings, TagUpdatePolicy};
    use crate::model::ratings::{GoalId, GoalRatingSet};
    use uuid::Uuid;

    fn set(entries: &[(GoalId, &str)]) -> GoalRatingSet {
        entries
            .iter()
            .map(|(goal, rating)| (*goal, rating.to_string()))
            .collect()
    }

    #[test]
    fn name_only_returns_current_unchanged() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let current = set(&[(a, "7")]);
        let next = propagate_ratings(
            TagUpdatePolicy::NameOnly,
            &current,
            &set(&[(a, "1")]),
            &set(&[(b, "3")]),
        );
        assert_eq!(next, current);
    }

    #[test]
    fn complete_override_discards_customization() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let new = set(&[(b, "3")]);
        let next = propagate_ratings(
            TagUpdatePolicy::CompleteOverride,
            &set(&[(a, "9")]),
            &set(&[(a, "1")]),
            &new,
        );
        assert_eq!(next, new);
    }

    #[test]
    fn preserve_custom_follows_unmodified_values() {
        let a = Uuid::new_v4();
        let next = propagate_ratings(
            TagUpdatePolicy::PreserveCustom,
            &set(&[(a, "1")]),
            &set(&[(a, "1")]),
            &set(&[(a, "2")]),
        );
        assert_eq!(next, set(&[(a, "2")]));
    }

    #[test]
    fn preserve_custom_keeps_diverged_values_and_event_only_keys() {
        let (a, extra) = (Uuid::new_v4(), Uuid::new_v4());
        let current = set(&[(a, "5"), (extra, "1")]);
        let next = propagate_ratings(
            TagUpdatePolicy::PreserveCustom,
            &current,
            &set(&[(a, "1")]),
            &set(&[(a, "2")]),
        );
        assert_eq!(next, current);
    }

    #[test]
    fn preserve_custom_does_not_resurrect_removed_rating() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        // Event removed `a` after being tagged; tag changes `a` and adds `b`.
        let next = propagate_ratings(
            TagUpdatePolicy::PreserveCustom,
            &GoalRatingSet::new(),
            &set(&[(a, "1")]),
            &set(&[(a, "4"), (b, "3")]),
        );
        assert_eq!(next, set(&[(b, "3")]));
    }

    #[test]
    fn preserve_custom_does_not_overwrite_existing_value_for_new_goal() {
        let b = Uuid::new_v4();
        let next = propagate_ratings(
            TagUpdatePolicy::PreserveCustom,
            &set(&[(b, "8")]),
            &GoalRatingSet::new(),
            &set(&[(b, "3")]),
        );
        assert_eq!(next, set(&[(b, "8")]));
    }

    #[test]
    fn policy_parses_config_names() {
        assert_eq!(
            "Complete_Override".parse::<TagUpdatePolicy>().unwrap(),
            TagUpdatePolicy::CompleteOverride
        );
        assert!("sometimes".parse::<TagUpdatePolicy>().is_err());
        assert_eq!(TagUpdatePolicy::default(), TagUpdatePolicy::PreserveCustom);
    }
}
