//! Event use-case service.
//!
//! # Responsibility
//! - Recall (create), edit, retag and delete events.
//! - Seed event ratings from the tag and apply per-event customizations.
//!
//! # Invariants
//! - A newly tagged event starts with an exact copy of its tag's ratings.
//! - Detaching an event from its tag keeps the event's ratings.

use crate::model::error::ModelValidationError;
use crate::model::event::{Event, EventId};
use crate::model::ratings::{GoalId, GoalRatingSet};
use crate::model::tag::TagId;
use crate::repo::event_repo::{EventListQuery, EventRepository};
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RecordKind, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum EventServiceError {
    InvalidInput(ModelValidationError),
    EventNotFound(EventId),
    TagNotFound(TagId),
    UnknownGoal(GoalId),
    Repo(RepoError),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid event: {err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
            Self::UnknownGoal(id) => write!(f, "event rating references unknown goal: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidInput(err),
            RepoError::UnknownGoal(id) => Self::UnknownGoal(id),
            RepoError::NotFound {
                kind: RecordKind::Event,
                id,
            } => Self::EventNotFound(id),
            RepoError::NotFound {
                kind: RecordKind::Tag,
                id,
            } => Self::TagNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Request model for recalling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub notes: Option<String>,
    pub start_ms: i64,
    pub end_ms: i64,
    pub tag_id: Option<TagId>,
}

/// Editable non-rating event fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub title: String,
    pub notes: Option<String>,
    pub start_ms: i64,
    pub end_ms: i64,
}

pub struct EventService<E: EventRepository, T: TagRepository> {
    events: E,
    tags: T,
}

impl<E: EventRepository, T: TagRepository> EventService<E, T> {
    pub fn new(events: E, tags: T) -> Self {
        Self { events, tags }
    }

    /// Recalls one event, copying the tag's ratings when tagged.
    pub fn recall_event(&self, request: NewEvent) -> Result<Event, EventServiceError> {
        let ratings = match request.tag_id {
            Some(tag_id) => self.tag_ratings(tag_id)?,
            None => GoalRatingSet::new(),
        };
        let event = Event {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            notes: request.notes,
            start_ms: request.start_ms,
            end_ms: request.end_ms,
            tag_id: request.tag_id,
            ratings,
        };
        self.events.create_event(&event)?;
        info!(
            "event=event_recall module=service status=ok event_id={} tagged={}",
            event.id,
            event.tag_id.is_some()
        );
        Ok(event)
    }

    /// Replaces title, notes and time range; tag and ratings are kept.
    pub fn update_event_details(
        &self,
        id: EventId,
        details: EventDetails,
    ) -> Result<Event, EventServiceError> {
        let mut event = self.require_event(id)?;
        event.title = details.title.trim().to_string();
        event.notes = details.notes;
        event.start_ms = details.start_ms;
        event.end_ms = details.end_ms;
        self.events.update_event(&event)?;
        Ok(event)
    }

    /// Moves an event to another tag (or none).
    ///
    /// A new tag replaces the event's ratings with that tag's ratings;
    /// detaching keeps the current ratings. Retagging to the tag the event
    /// already carries changes nothing, so customizations survive.
    pub fn retag_event(
        &self,
        id: EventId,
        tag_id: Option<TagId>,
    ) -> Result<Event, EventServiceError> {
        let mut event = self.require_event(id)?;
        if event.tag_id == tag_id {
            return Ok(event);
        }
        if let Some(tag_id) = tag_id {
            event.ratings = self.tag_ratings(tag_id)?;
        }
        event.tag_id = tag_id;
        self.events.update_event(&event)?;
        info!(
            "event=event_retag module=service status=ok event_id={id} tagged={}",
            tag_id.is_some()
        );
        Ok(event)
    }

    /// Replaces the event's ratings verbatim, diverging from its tag.
    pub fn customize_ratings(
        &self,
        id: EventId,
        ratings: GoalRatingSet,
    ) -> Result<Event, EventServiceError> {
        self.events.set_event_ratings(id, &ratings)?;
        self.require_event(id)
    }

    /// Explicitly drops one goal rating from an event.
    ///
    /// Later tag edits will not add this goal back under `PreserveCustom`
    /// unless the tag introduces it as a brand-new goal.
    pub fn remove_event_rating(
        &self,
        id: EventId,
        goal_id: GoalId,
    ) -> Result<Event, EventServiceError> {
        let mut event = self.require_event(id)?;
        if event.ratings.remove(&goal_id).is_some() {
            self.events.set_event_ratings(id, &event.ratings)?;
        }
        Ok(event)
    }

    pub fn get_event(&self, id: EventId) -> Result<Option<Event>, EventServiceError> {
        Ok(self.events.get_event(id)?)
    }

    pub fn list_events(&self, query: &EventListQuery) -> Result<Vec<Event>, EventServiceError> {
        Ok(self.events.list_events(query)?)
    }

    pub fn delete_event(&self, id: EventId) -> Result<(), EventServiceError> {
        self.events.delete_event(id)?;
        info!("event=event_delete module=service status=ok event_id={id}");
        Ok(())
    }

    fn require_event(&self, id: EventId) -> Result<Event, EventServiceError> {
        self.events
            .get_event(id)?
            .ok_or(EventServiceError::EventNotFound(id))
    }

    fn tag_ratings(&self, tag_id: TagId) -> Result<GoalRatingSet, EventServiceError> {
        self.tags
            .get_tag(tag_id)?
            .map(|tag| tag.ratings)
            .ok_or(EventServiceError::TagNotFound(tag_id))
    }
}
