//! Tag use-case service.
//!
//! # Responsibility
//! - Create, edit, favorite, list and delete tags.
//! - Cascade rating edits into tagged events through propagation.
//!
//! # Invariants
//! - The tag row is committed before propagation starts; propagation uses the
//!   ratings replaced by that same write as its `old` set.
//! - Deleting a tag detaches its events and keeps their ratings.

use crate::model::error::ModelValidationError;
use crate::model::ratings::{GoalId, GoalRatingSet};
use crate::model::tag::{Tag, TagColor, TagId};
use crate::propagation::{
    PropagationReport, TagUpdatePolicy, TagUpdatePropagator, TaggedEventStore,
};
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RecordKind, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for tag use-cases.
#[derive(Debug)]
pub enum TagServiceError {
    InvalidInput(ModelValidationError),
    DuplicateLabel(String),
    UnknownGoal(GoalId),
    TagNotFound(TagId),
    Repo(RepoError),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid tag: {err}"),
            Self::DuplicateLabel(label) => write!(f, "tag label already in use: `{label}`"),
            Self::UnknownGoal(id) => write!(f, "tag rating references unknown goal: {id}"),
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidInput(err),
            RepoError::DuplicateLabel(label) => Self::DuplicateLabel(label),
            RepoError::UnknownGoal(id) => Self::UnknownGoal(id),
            RepoError::NotFound {
                kind: RecordKind::Tag,
                id,
            } => Self::TagNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating a tag.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTag {
    pub label: String,
    pub color: TagColor,
    pub is_favorite: bool,
    pub ratings: GoalRatingSet,
}

/// Full replacement of a tag's editable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TagUpdate {
    pub id: TagId,
    pub label: String,
    pub color: TagColor,
    pub is_favorite: bool,
    pub ratings: GoalRatingSet,
}

/// Persisted tag after an edit plus what happened to its events.
#[derive(Debug)]
pub struct TagUpdateOutcome {
    pub tag: Tag,
    pub propagation: PropagationReport,
}

/// Tag service facade over tag and event repositories.
pub struct TagService<T: TagRepository, E: TaggedEventStore> {
    tags: T,
    events: E,
    default_policy: TagUpdatePolicy,
}

impl<T: TagRepository, E: TaggedEventStore> TagService<T, E> {
    /// Creates a service that uses `PreserveCustom` for ordinary edits.
    pub fn new(tags: T, events: E) -> Self {
        Self::with_default_policy(tags, events, TagUpdatePolicy::default())
    }

    pub fn with_default_policy(tags: T, events: E, default_policy: TagUpdatePolicy) -> Self {
        Self {
            tags,
            events,
            default_policy,
        }
    }

    pub fn default_policy(&self) -> TagUpdatePolicy {
        self.default_policy
    }

    pub fn create_tag(&self, request: NewTag) -> Result<Tag, TagServiceError> {
        let tag = Tag {
            id: Uuid::new_v4(),
            label: request.label.trim().to_string(),
            color: request.color,
            is_favorite: request.is_favorite,
            ratings: request.ratings,
        };
        self.tags.create_tag(&tag)?;
        info!(
            "event=tag_create module=service status=ok tag_id={} ratings={}",
            tag.id,
            tag.ratings.len()
        );
        Ok(tag)
    }

    /// Edits a tag and cascades rating changes with the given policy.
    ///
    /// # Errors
    /// - Tag validation/lookup errors abort before anything is written.
    /// - A failure listing the tagged events is returned after the tag itself
    ///   has been committed; per-event write failures land in the report.
    pub fn update_tag(
        &self,
        update: TagUpdate,
        policy: TagUpdatePolicy,
    ) -> Result<TagUpdateOutcome, TagServiceError> {
        let tag = Tag {
            id: update.id,
            label: update.label.trim().to_string(),
            color: update.color,
            is_favorite: update.is_favorite,
            ratings: update.ratings,
        };
        let old_ratings = self.tags.update_tag(&tag)?;
        info!(
            "event=tag_update module=service status=ok tag_id={} policy={policy}",
            tag.id
        );

        let propagation = TagUpdatePropagator::new(&self.events).propagate(
            tag.id,
            policy,
            &old_ratings,
            &tag.ratings,
        )?;
        Ok(TagUpdateOutcome { tag, propagation })
    }

    /// Edits a tag using the service's default policy.
    pub fn update_tag_with_default_policy(
        &self,
        update: TagUpdate,
    ) -> Result<TagUpdateOutcome, TagServiceError> {
        self.update_tag(update, self.default_policy)
    }

    pub fn set_favorite(&self, id: TagId, is_favorite: bool) -> Result<Tag, TagServiceError> {
        self.tags.set_favorite(id, is_favorite)?;
        self.tags.get_tag(id)?.ok_or(TagServiceError::TagNotFound(id))
    }

    pub fn get_tag(&self, id: TagId) -> Result<Option<Tag>, TagServiceError> {
        Ok(self.tags.get_tag(id)?)
    }

    /// Lists tags, favorites first, then by label.
    pub fn list_tags(&self) -> Result<Vec<Tag>, TagServiceError> {
        Ok(self.tags.list_tags()?)
    }

    pub fn delete_tag(&self, id: TagId) -> Result<(), TagServiceError> {
        self.tags.delete_tag(id)?;
        info!("event=tag_delete module=service status=ok tag_id={id}");
        Ok(())
    }
}
