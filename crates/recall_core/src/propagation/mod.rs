//! Tag-update propagation into already tagged events.
//!
//! # Responsibility
//! - Decide each affected event's new goal ratings after a tag edit.
//! - Persist the result one event at a time through a `TaggedEventStore`.
//!
//! # Invariants
//! - Events are visited sequentially; each write commits before the next
//!   event is read from the visit list.
//! - A failed event write is recorded and never stops later events; earlier
//!   events are not rolled back.
//! - Events whose ratings would not change are not written.

mod policy;

pub use policy::{propagate_ratings, TagUpdatePolicy};

use crate::model::event::EventId;
use crate::model::ratings::GoalRatingSet;
use crate::model::tag::TagId;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::time::Instant;

/// Current ratings of one event associated with a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEventRatings {
    pub event_id: EventId,
    pub ratings: GoalRatingSet,
}

/// Storage capabilities propagation depends on.
pub trait TaggedEventStore {
    /// Returns every event currently associated with `tag_id`.
    fn events_with_tag(&self, tag_id: TagId) -> RepoResult<Vec<TaggedEventRatings>>;
    /// Durably replaces one event's ratings before returning.
    fn replace_event_ratings(&self, event_id: EventId, ratings: &GoalRatingSet) -> RepoResult<()>;
}

/// One event whose recomputed ratings could not be stored.
#[derive(Debug)]
pub struct PropagationFailure {
    pub event_id: EventId,
    pub error: RepoError,
}

/// Per-event outcome of one propagation run.
#[derive(Debug)]
pub struct PropagationReport {
    pub policy: TagUpdatePolicy,
    /// Events whose ratings were rewritten.
    pub updated: Vec<EventId>,
    /// Events whose recomputed ratings equal their current ones.
    pub unchanged: Vec<EventId>,
    pub failed: Vec<PropagationFailure>,
    /// Events not visited because the run was stopped early.
    pub skipped: Vec<EventId>,
}

impl PropagationReport {
    fn empty(policy: TagUpdatePolicy) -> Self {
        Self {
            policy,
            updated: Vec::new(),
            unchanged: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// True when every associated event now reflects the edit.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Applies a tag edit to the ratings of events carrying that tag.
pub struct TagUpdatePropagator<'a, S: TaggedEventStore> {
    store: &'a S,
}

impl<'a, S: TaggedEventStore> TagUpdatePropagator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Propagates `old -> new` to every event tagged with `tag_id`.
    ///
    /// # Errors
    /// - Returns the store error when the affected events cannot be listed.
    ///   Per-event write failures are reported in `PropagationReport::failed`.
    pub fn propagate(
        &self,
        tag_id: TagId,
        policy: TagUpdatePolicy,
        old: &GoalRatingSet,
        new: &GoalRatingSet,
    ) -> RepoResult<PropagationReport> {
        self.propagate_while(tag_id, policy, old, new, || true)
    }

    /// Like [`propagate`](Self::propagate), asking `should_continue` before
    /// each event. Once it returns `false`, remaining events keep their
    /// pre-edit ratings and are listed as skipped.
    pub fn propagate_while(
        &self,
        tag_id: TagId,
        policy: TagUpdatePolicy,
        old: &GoalRatingSet,
        new: &GoalRatingSet,
        mut should_continue: impl FnMut() -> bool,
    ) -> RepoResult<PropagationReport> {
        let mut report = PropagationReport::empty(policy);
        if policy == TagUpdatePolicy::NameOnly {
            info!("event=tag_propagate module=propagation status=skipped tag_id={tag_id} policy={policy}");
            return Ok(report);
        }

        let started_at = Instant::now();
        let events = self.store.events_with_tag(tag_id).map_err(|err| {
            warn!(
                "event=tag_propagate module=propagation status=error tag_id={tag_id} error_code=query_failed error={err}"
            );
            err
        })?;
        info!(
            "event=tag_propagate module=propagation status=start tag_id={tag_id} policy={policy} events={}",
            events.len()
        );

        let mut pending = events.into_iter();
        for event in pending.by_ref() {
            if !should_continue() {
                report.skipped.push(event.event_id);
                break;
            }

            let next = propagate_ratings(policy, &event.ratings, old, new);
            if next == event.ratings {
                report.unchanged.push(event.event_id);
                continue;
            }

            match self.store.replace_event_ratings(event.event_id, &next) {
                Ok(()) => report.updated.push(event.event_id),
                Err(error) => {
                    warn!(
                        "event=tag_propagate_event module=propagation status=error tag_id={tag_id} event_id={} error={error}",
                        event.event_id
                    );
                    report.failed.push(PropagationFailure {
                        event_id: event.event_id,
                        error,
                    });
                }
            }
        }
        report
            .skipped
            .extend(pending.map(|event| event.event_id));

        info!(
            "event=tag_propagate module=propagation status=ok tag_id={tag_id} policy={policy} updated={} unchanged={} failed={} skipped={} duration_ms={}",
            report.updated.len(),
            report.unchanged.len(),
            report.failed.len(),
            report.skipped.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}
