//! CLI health probe.
//!
//! # Responsibility
//! - Load an optional `recall.toml`, open the configured database and print
//!   a deterministic summary to verify `recall_core` wiring.
//!
//! Usage: `recall_cli [path/to/recall.toml]`

use recall_core::db::migrations::schema_version;
use recall_core::db::{open_db, open_db_in_memory};
use recall_core::{
    init_logging, EventRepository, GoalRepository, RecallConfig, SqliteEventRepository,
    SqliteGoalRepository, SqliteTagRepository, TagRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("recall_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => RecallConfig::load(path)?,
        None => RecallConfig::default(),
    };

    if let Some(dir) = config.logging.directory.as_ref() {
        init_logging(&config.logging.level, dir)?;
    }

    let conn = match config.storage.database_path.as_ref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    log::info!("event=cli_probe module=cli status=start");

    let goals = SqliteGoalRepository::new(&conn).list_goals()?.len();
    let tags = SqliteTagRepository::new(&conn).list_tags()?.len();
    let events = SqliteEventRepository::new(&conn).count_events()?;

    println!("recall_core version={}", recall_core::core_version());
    println!("schema_version={}", schema_version(&conn)?);
    println!("default_tag_update_policy={}", config.tags.default_update_policy);
    println!("goals={goals} tags={tags} events={events}");
    Ok(())
}
