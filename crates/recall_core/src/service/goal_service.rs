//! Goal use-case service.
//!
//! # Responsibility
//! - Create, edit, list and delete goals.
//!
//! # Invariants
//! - Deleting a goal strips its ratings from every tag and event.

use crate::model::error::ModelValidationError;
use crate::model::goal::{Goal, GoalFrequency, GoalPriority};
use crate::model::ratings::GoalId;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::{RecordKind, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum GoalServiceError {
    InvalidInput(ModelValidationError),
    GoalNotFound(GoalId),
    Repo(RepoError),
}

impl Display for GoalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid goal: {err}"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GoalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::GoalNotFound(_) => None,
        }
    }
}

impl From<RepoError> for GoalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: RecordKind::Goal,
                id,
            } => Self::GoalNotFound(id),
            RepoError::Validation(err) => Self::InvalidInput(err),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub label: String,
    pub description: Option<String>,
    pub frequency: GoalFrequency,
    pub target_hours: f64,
    pub priority: GoalPriority,
}

pub struct GoalService<G: GoalRepository> {
    goals: G,
}

impl<G: GoalRepository> GoalService<G> {
    pub fn new(goals: G) -> Self {
        Self { goals }
    }

    pub fn create_goal(&self, request: NewGoal) -> Result<Goal, GoalServiceError> {
        let goal = Goal {
            id: Uuid::new_v4(),
            label: request.label.trim().to_string(),
            description: request.description,
            frequency: request.frequency,
            target_hours: request.target_hours,
            priority: request.priority,
        };
        self.goals.create_goal(&goal)?;
        info!("event=goal_create module=service status=ok goal_id={}", goal.id);
        Ok(goal)
    }

    /// Replaces every editable goal field.
    pub fn update_goal(&self, goal: &Goal) -> Result<Goal, GoalServiceError> {
        self.goals.update_goal(goal)?;
        self.goals
            .get_goal(goal.id)?
            .ok_or(GoalServiceError::GoalNotFound(goal.id))
    }

    pub fn get_goal(&self, id: GoalId) -> Result<Option<Goal>, GoalServiceError> {
        Ok(self.goals.get_goal(id)?)
    }

    /// Lists goals, highest priority first.
    pub fn list_goals(&self) -> Result<Vec<Goal>, GoalServiceError> {
        Ok(self.goals.list_goals()?)
    }

    pub fn delete_goal(&self, id: GoalId) -> Result<(), GoalServiceError> {
        self.goals.delete_goal(id)?;
        info!("event=goal_delete module=service status=ok goal_id={id}");
        Ok(())
    }
}
