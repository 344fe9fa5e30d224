//! Core domain logic for Recall.
//! This crate owns goals, tags, recalled events and the rules that keep
//! event goal ratings consistent when a tag is edited.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod propagation;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RecallConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::error::ModelValidationError;
pub use model::event::{Event, EventId};
pub use model::goal::{Goal, GoalFrequency, GoalPriority};
pub use model::ratings::{parse_rating, GoalId, GoalRatingSet};
pub use model::tag::{Tag, TagColor, TagId};
pub use propagation::{
    propagate_ratings, PropagationFailure, PropagationReport, TagUpdatePolicy,
    TagUpdatePropagator, TaggedEventRatings, TaggedEventStore,
};
pub use repo::event_repo::{EventListQuery, EventRepository, SqliteEventRepository};
pub use repo::goal_repo::{GoalRepository, SqliteGoalRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::{RecordKind, RepoError, RepoResult};
pub use service::event_service::{EventDetails, EventService, EventServiceError, NewEvent};
pub use service::goal_service::{GoalService, GoalServiceError, NewGoal};
pub use service::stats_service::{
    GoalProgress, StatsError, StatsService, TagBreakdown, TimeRange,
};
pub use service::tag_service::{
    NewTag, TagService, TagServiceError, TagUpdate, TagUpdateOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
