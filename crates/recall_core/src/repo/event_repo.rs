//! Event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist recalled events and their per-event goal ratings.
//! - Serve the tag-association query and per-event rating replacement used by
//!   tag-update propagation.
//!
//! # Invariants
//! - Events reference tags by `tag_uuid`; the reference must exist on write.
//! - Every rating replacement is its own committed transaction.
//! - Lists are ordered `start_ms ASC, uuid ASC`.

use crate::model::event::{Event, EventId};
use crate::model::ratings::GoalRatingSet;
use crate::model::tag::TagId;
use crate::propagation::{TaggedEventRatings, TaggedEventStore};
use crate::repo::ratings::{load_ratings, replace_ratings, RatingOwner};
use crate::repo::{parse_optional_uuid, parse_uuid, RecordKind, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    notes,
    start_ms,
    end_ms,
    tag_uuid
FROM events";

/// Query options for listing events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventListQuery {
    /// Inclusive lower bound on `start_ms`.
    pub start_from_ms: Option<i64>,
    /// Exclusive upper bound on `start_ms`.
    pub start_before_ms: Option<i64>,
    /// Restrict to events carrying this tag.
    pub tag_id: Option<TagId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for event operations.
pub trait EventRepository {
    fn create_event(&self, event: &Event) -> RepoResult<EventId>;
    /// Replaces all event fields, including the rating set.
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>>;
    /// Replaces only the rating set of one event.
    fn set_event_ratings(&self, id: EventId, ratings: &GoalRatingSet) -> RepoResult<()>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
    fn count_events(&self) -> RepoResult<u64>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;
        let id_text = event.id.to_string();

        let tx = self.begin()?;
        if let Some(tag_id) = event.tag_id {
            ensure_tag_exists(&tx, tag_id)?;
        }
        tx.execute(
            "INSERT INTO events (uuid, title, notes, start_ms, end_ms, tag_uuid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id_text,
                event.title.as_str(),
                event.notes.as_deref(),
                event.start_ms,
                event.end_ms,
                event.tag_id.map(|id| id.to_string()),
            ],
        )?;
        replace_ratings(&tx, RatingOwner::Event, &id_text, &event.ratings)?;
        tx.commit()?;

        Ok(event.id)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;
        let id_text = event.id.to_string();

        let tx = self.begin()?;
        if let Some(tag_id) = event.tag_id {
            ensure_tag_exists(&tx, tag_id)?;
        }
        let changed = tx.execute(
            "UPDATE events
             SET
                title = ?1,
                notes = ?2,
                start_ms = ?3,
                end_ms = ?4,
                tag_uuid = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                event.title.as_str(),
                event.notes.as_deref(),
                event.start_ms,
                event.end_ms,
                event.tag_id.map(|id| id.to_string()),
                id_text,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Event, event.id));
        }
        replace_ratings(&tx, RatingOwner::Event, &id_text, &event.ratings)?;
        tx.commit()?;

        Ok(())
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_event_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn list_events(&self, query: &EventListQuery) -> RepoResult<Vec<Event>> {
        let mut sql = format!("{EVENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(from) = query.start_from_ms {
            sql.push_str(" AND start_ms >= ?");
            bind_values.push(Value::Integer(from));
        }
        if let Some(before) = query.start_before_ms {
            sql.push_str(" AND start_ms < ?");
            bind_values.push(Value::Integer(before));
        }
        if let Some(tag_id) = query.tag_id {
            sql.push_str(" AND tag_uuid = ?");
            bind_values.push(Value::Text(tag_id.to_string()));
        }

        sql.push_str(" ORDER BY start_ms ASC, uuid ASC");
        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(self.conn, row)?);
        }
        Ok(events)
    }

    fn set_event_ratings(&self, id: EventId, ratings: &GoalRatingSet) -> RepoResult<()> {
        ratings.validate()?;
        let id_text = id.to_string();

        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE events
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id_text.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Event, id));
        }
        replace_ratings(&tx, RatingOwner::Event, &id_text, ratings)?;
        tx.commit()?;

        Ok(())
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Event, id));
        }
        Ok(())
    }

    fn count_events(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative event count `{count}`")))
    }
}

impl TaggedEventStore for SqliteEventRepository<'_> {
    fn events_with_tag(&self, tag_id: TagId) -> RepoResult<Vec<TaggedEventRatings>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid FROM events WHERE tag_uuid = ?1 ORDER BY start_ms ASC, uuid ASC;")?;
        let mut rows = stmt.query([tag_id.to_string()])?;
        let mut tagged = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            tagged.push(TaggedEventRatings {
                event_id: parse_uuid(&uuid_text, "events.uuid")?,
                ratings: load_ratings(self.conn, RatingOwner::Event, &uuid_text)?,
            });
        }
        Ok(tagged)
    }

    fn replace_event_ratings(&self, event_id: EventId, ratings: &GoalRatingSet) -> RepoResult<()> {
        self.set_event_ratings(event_id, ratings)
    }
}

fn ensure_tag_exists(conn: &Connection, tag_id: TagId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tags WHERE uuid = ?1);",
        [tag_id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::not_found(RecordKind::Tag, tag_id));
    }
    Ok(())
}

fn parse_event_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let event = Event {
        id: parse_uuid(&uuid_text, "events.uuid")?,
        title: row.get("title")?,
        notes: row.get("notes")?,
        start_ms: row.get("start_ms")?,
        end_ms: row.get("end_ms")?,
        tag_id: parse_optional_uuid(row.get("tag_uuid")?, "events.tag_uuid")?,
        ratings: load_ratings(conn, RatingOwner::Event, &uuid_text)?,
    };
    event.validate()?;
    Ok(event)
}
