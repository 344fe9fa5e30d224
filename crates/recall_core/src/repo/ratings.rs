//! Shared storage for tag and event goal-rating rows.
//!
//! Callers own the surrounding transaction; these helpers never commit.

use crate::model::ratings::GoalRatingSet;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection};

/// Which rating table a set belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RatingOwner {
    Tag,
    Event,
}

impl RatingOwner {
    fn table(self) -> &'static str {
        match self {
            Self::Tag => "tag_goal_ratings",
            Self::Event => "event_goal_ratings",
        }
    }

    fn owner_column(self) -> &'static str {
        match self {
            Self::Tag => "tag_uuid",
            Self::Event => "event_uuid",
        }
    }
}

pub(crate) fn load_ratings(
    conn: &Connection,
    owner: RatingOwner,
    owner_uuid: &str,
) -> RepoResult<GoalRatingSet> {
    let mut stmt = conn.prepare(&format!(
        "SELECT goal_uuid, rating FROM {} WHERE {} = ?1;",
        owner.table(),
        owner.owner_column()
    ))?;
    let mut rows = stmt.query([owner_uuid])?;
    let mut ratings = GoalRatingSet::new();
    while let Some(row) = rows.next()? {
        let goal_text: String = row.get(0)?;
        let goal_id = parse_uuid(&goal_text, &format!("{}.goal_uuid", owner.table()))?;
        ratings.insert(goal_id, row.get::<_, String>(1)?);
    }
    Ok(ratings)
}

/// Replaces the full rating set of one owner row.
///
/// # Errors
/// - `UnknownGoal` when any key does not name an existing goal.
pub(crate) fn replace_ratings(
    conn: &Connection,
    owner: RatingOwner,
    owner_uuid: &str,
    ratings: &GoalRatingSet,
) -> RepoResult<()> {
    for goal_id in ratings.goal_ids() {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM goals WHERE uuid = ?1);",
            [goal_id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::UnknownGoal(*goal_id));
        }
    }

    conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            owner.table(),
            owner.owner_column()
        ),
        [owner_uuid],
    )?;

    let insert_sql = format!(
        "INSERT INTO {} ({}, goal_uuid, rating) VALUES (?1, ?2, ?3);",
        owner.table(),
        owner.owner_column()
    );
    for (goal_id, rating) in ratings {
        conn.execute(
            &insert_sql,
            params![owner_uuid, goal_id.to_string(), rating.as_str()],
        )?;
    }
    Ok(())
}
