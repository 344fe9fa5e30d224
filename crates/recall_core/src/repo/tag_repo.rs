//! Tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tags together with their default goal ratings.
//! - Enforce case-insensitive label uniqueness.
//!
//! # Invariants
//! - Tag row and rating rows are replaced in one transaction; the rating set
//!   being replaced is read inside that same transaction.
//! - Deleting a tag detaches its events (`tag_uuid` set to NULL) and keeps
//!   their ratings.
//! - Lists are ordered favorites first, then `label ASC (NOCASE)`.

use crate::model::ratings::GoalRatingSet;
use crate::model::tag::{Tag, TagColor, TagId};
use crate::repo::ratings::{load_ratings, replace_ratings, RatingOwner};
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RecordKind, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const TAG_SELECT_SQL: &str = "SELECT
    uuid,
    label,
    color_red,
    color_green,
    color_blue,
    is_favorite
FROM tags";

/// Repository interface for tag operations.
pub trait TagRepository {
    /// Inserts a tag and its ratings.
    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId>;
    /// Replaces label, color, favorite flag and the full rating set.
    ///
    /// Returns the rating set that was stored right before the write.
    fn update_tag(&self, tag: &Tag) -> RepoResult<GoalRatingSet>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    fn set_favorite(&self, id: TagId, is_favorite: bool) -> RepoResult<()>;
    /// Removes a tag; its events become untagged.
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
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

impl TagRepository for SqliteTagRepository<'_> {
    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId> {
        tag.validate()?;
        let id_text = tag.id.to_string();
        let label = tag.label.trim();

        let tx = self.begin()?;
        ensure_label_free(&tx, label, &id_text)?;
        tx.execute(
            "INSERT INTO tags (uuid, label, color_red, color_green, color_blue, is_favorite)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id_text,
                label,
                tag.color.red,
                tag.color.green,
                tag.color.blue,
                bool_to_int(tag.is_favorite),
            ],
        )?;
        replace_ratings(&tx, RatingOwner::Tag, &id_text, &tag.ratings)?;
        tx.commit()?;

        Ok(tag.id)
    }

    fn update_tag(&self, tag: &Tag) -> RepoResult<GoalRatingSet> {
        tag.validate()?;
        let id_text = tag.id.to_string();
        let label = tag.label.trim();

        let tx = self.begin()?;
        ensure_label_free(&tx, label, &id_text)?;
        let previous = load_ratings(&tx, RatingOwner::Tag, &id_text)?;
        let changed = tx.execute(
            "UPDATE tags
             SET
                label = ?1,
                color_red = ?2,
                color_green = ?3,
                color_blue = ?4,
                is_favorite = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                label,
                tag.color.red,
                tag.color.green,
                tag.color.blue,
                bool_to_int(tag.is_favorite),
                id_text,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Tag, tag.id));
        }
        replace_ratings(&tx, RatingOwner::Tag, &id_text, &tag.ratings)?;
        tx.commit()?;

        Ok(previous)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TAG_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_tag_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL} ORDER BY is_favorite DESC, label COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(self.conn, row)?);
        }
        Ok(tags)
    }

    fn set_favorite(&self, id: TagId, is_favorite: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tags
             SET is_favorite = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(is_favorite), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Tag, id));
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tags WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Tag, id));
        }
        Ok(())
    }
}

fn ensure_label_free(conn: &Connection, label: &str, own_uuid: &str) -> RepoResult<()> {
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM tags
            WHERE label = ?1 COLLATE NOCASE
              AND uuid != ?2
        );",
        params![label, own_uuid],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(RepoError::DuplicateLabel(label.to_string()));
    }
    Ok(())
}

fn parse_tag_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Tag> {
    let uuid_text: String = row.get("uuid")?;
    let tag = Tag {
        id: parse_uuid(&uuid_text, "tags.uuid")?,
        label: row.get("label")?,
        color: TagColor::new(
            row.get("color_red")?,
            row.get("color_green")?,
            row.get("color_blue")?,
        ),
        is_favorite: int_to_bool(row.get("is_favorite")?, "tags.is_favorite")?,
        ratings: load_ratings(conn, RatingOwner::Tag, &uuid_text)?,
    };
    tag.validate()?;
    Ok(tag)
}
