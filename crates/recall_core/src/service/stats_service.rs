//! Event and goal statistics.
//!
//! # Responsibility
//! - Aggregate recalled events per tag over a time range.
//! - Compute rated-hour progress toward each goal's target.
//!
//! # Invariants
//! - Goal windows are rolling windows `[now - window, now)`.
//! - Unparseable rating expressions contribute nothing.

use crate::model::goal::Goal;
use crate::model::ratings::GoalId;
use crate::model::tag::TagId;
use crate::repo::event_repo::{EventListQuery, EventRepository};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RecordKind, RepoError};
use log::warn;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum StatsError {
    GoalNotFound(GoalId),
    InvalidRange { start_ms: i64, end_ms: i64 },
    Repo(RepoError),
}

impl Display for StatsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::InvalidRange { start_ms, end_ms } => {
                write!(f, "invalid statistics range: {start_ms}..{end_ms}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StatsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StatsError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: RecordKind::Goal,
                id,
            } => Self::GoalNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Half-open time range `[start_ms, end_ms)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Per-tag totals for events starting inside a range.
#[derive(Debug, Clone, PartialEq)]
pub struct TagBreakdown {
    /// `None` groups untagged events.
    pub tag_id: Option<TagId>,
    pub label: Option<String>,
    pub event_count: u32,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal_id: GoalId,
    pub window: TimeRange,
    pub progress_hours: f64,
    pub target_hours: f64,
    /// `progress_hours / target_hours`, clamped to `[0, 1]`.
    pub completion: f64,
}

pub struct StatsService<E: EventRepository, T: TagRepository, G: GoalRepository> {
    events: E,
    tags: T,
    goals: G,
}

impl<E: EventRepository, T: TagRepository, G: GoalRepository> StatsService<E, T, G> {
    pub fn new(events: E, tags: T, goals: G) -> Self {
        Self {
            events,
            tags,
            goals,
        }
    }

    /// Event count and hours per tag, largest total first.
    pub fn tag_breakdown(&self, range: TimeRange) -> Result<Vec<TagBreakdown>, StatsError> {
        if range.end_ms < range.start_ms {
            return Err(StatsError::InvalidRange {
                start_ms: range.start_ms,
                end_ms: range.end_ms,
            });
        }

        let events = self.events.list_events(&EventListQuery {
            start_from_ms: Some(range.start_ms),
            start_before_ms: Some(range.end_ms),
            ..EventListQuery::default()
        })?;
        let labels: BTreeMap<TagId, String> = self
            .tags
            .list_tags()?
            .into_iter()
            .map(|tag| (tag.id, tag.label))
            .collect();

        let mut totals: BTreeMap<Option<TagId>, (u32, f64)> = BTreeMap::new();
        for event in &events {
            let entry = totals.entry(event.tag_id).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += event.duration_hours();
        }

        let mut breakdown: Vec<TagBreakdown> = totals
            .into_iter()
            .map(|(tag_id, (event_count, total_hours))| TagBreakdown {
                tag_id,
                label: tag_id.and_then(|id| labels.get(&id).cloned()),
                event_count,
                total_hours,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.total_hours
                .total_cmp(&a.total_hours)
                .then_with(|| a.label.cmp(&b.label))
        });
        Ok(breakdown)
    }

    /// Rated hours toward one goal in its window ending at `now_ms`.
    pub fn goal_progress(&self, goal_id: GoalId, now_ms: i64) -> Result<GoalProgress, StatsError> {
        let goal = self
            .goals
            .get_goal(goal_id)?
            .ok_or(StatsError::GoalNotFound(goal_id))?;
        self.progress_for(&goal, now_ms)
    }

    /// Progress for every goal, in goal list order.
    pub fn all_goal_progress(&self, now_ms: i64) -> Result<Vec<GoalProgress>, StatsError> {
        self.goals
            .list_goals()?
            .iter()
            .map(|goal| self.progress_for(goal, now_ms))
            .collect()
    }

    fn progress_for(&self, goal: &Goal, now_ms: i64) -> Result<GoalProgress, StatsError> {
        let window = TimeRange {
            start_ms: now_ms.saturating_sub(goal.frequency.window_ms()),
            end_ms: now_ms,
        };
        let events = self.events.list_events(&EventListQuery {
            start_from_ms: Some(window.start_ms),
            start_before_ms: Some(window.end_ms),
            ..EventListQuery::default()
        })?;

        let mut progress_hours = 0.0;
        for event in &events {
            if !event.ratings.contains(&goal.id) {
                continue;
            }
            match event.ratings.multiplier(&goal.id) {
                Some(multiplier) => progress_hours += event.duration_hours() * multiplier,
                None => warn!(
                    "event=goal_progress module=stats status=skipped goal_id={} event_id={} error_code=unparseable_rating",
                    goal.id, event.id
                ),
            }
        }

        Ok(GoalProgress {
            goal_id: goal.id,
            window,
            progress_hours,
            target_hours: goal.target_hours,
            completion: (progress_hours / goal.target_hours).clamp(0.0, 1.0),
        })
    }
}
