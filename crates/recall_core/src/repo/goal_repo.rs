//! Goal repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `goals` table.
//!
//! # Invariants
//! - Deleting a goal removes its ratings from every tag and event through
//!   `ON DELETE CASCADE`.
//! - Lists are ordered `priority DESC, label ASC (NOCASE), uuid ASC`.

use crate::model::goal::{Goal, GoalFrequency, GoalPriority};
use crate::model::ratings::GoalId;
use crate::repo::{parse_uuid, RecordKind, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    uuid,
    label,
    description,
    frequency,
    target_hours,
    priority
FROM goals";

/// Repository interface for goal CRUD operations.
pub trait GoalRepository {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId>;
    fn update_goal(&self, goal: &Goal) -> RepoResult<()>;
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    fn list_goals(&self) -> RepoResult<Vec<Goal>>;
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<GoalId> {
        goal.validate()?;

        self.conn.execute(
            "INSERT INTO goals (uuid, label, description, frequency, target_hours, priority)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                goal.id.to_string(),
                goal.label.trim(),
                goal.description.as_deref(),
                goal.frequency.as_str(),
                goal.target_hours,
                goal.priority.as_str(),
            ],
        )?;

        Ok(goal.id)
    }

    fn update_goal(&self, goal: &Goal) -> RepoResult<()> {
        goal.validate()?;

        let changed = self.conn.execute(
            "UPDATE goals
             SET
                label = ?1,
                description = ?2,
                frequency = ?3,
                target_hours = ?4,
                priority = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                goal.label.trim(),
                goal.description.as_deref(),
                goal.frequency.as_str(),
                goal.target_hours,
                goal.priority.as_str(),
                goal.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Goal, goal.id));
        }
        Ok(())
    }

    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_goal_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_goals(&self) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             ORDER BY
                CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END ASC,
                label COLLATE NOCASE ASC,
                uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(RecordKind::Goal, id));
        }
        Ok(())
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let uuid_text: String = row.get("uuid")?;
    let frequency_text: String = row.get("frequency")?;
    let frequency = GoalFrequency::parse(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in goals.frequency"
        ))
    })?;
    let priority_text: String = row.get("priority")?;
    let priority = GoalPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in goals.priority"
        ))
    })?;

    let goal = Goal {
        id: parse_uuid(&uuid_text, "goals.uuid")?,
        label: row.get("label")?,
        description: row.get("description")?,
        frequency,
        target_hours: row.get("target_hours")?,
        priority,
    };
    goal.validate()?;
    Ok(goal)
}
