//! Recall's SQLite store: connection bootstrap and schema versioning.
//!
//! # Responsibility
//! - Hand out connections the goal, tag and event repositories can share.
//! - Keep the schema at the newest version this build knows about.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection is only returned once foreign keys are enforced and every
//!   migration has run; tag detach and goal-rating cleanup depend on both.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the Recall store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// `PRAGMA foreign_keys` did not stick, so deletes would not cascade.
    ForeignKeysUnavailable,
    /// The file was written by a newer Recall build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "recall store: {err}"),
            Self::ForeignKeysUnavailable => write!(
                f,
                "recall store needs foreign key enforcement, but this SQLite build ignores it"
            ),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "recall store was written with schema v{db_version}; this build reads up to v{latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn schema_error_names_both_versions() {
        let message = DbError::UnsupportedSchemaVersion {
            db_version: 7,
            latest_supported: 2,
        }
        .to_string();
        assert!(message.contains("v7"));
        assert!(message.contains("v2"));
    }
}
