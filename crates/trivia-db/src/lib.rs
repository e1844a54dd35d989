//! # trivia-db
//!
//! SQLite implementations of the persistent store traits. Schema contract:
//! `Questions(Category, Question, Answer)`, `TotalScores(User, TotalScore,
//! AverageTime)`, `CustomScripts(GuildID, CommandName, Script)`.

mod questions;
mod scores;
mod scripts;

pub use questions::SqliteQuestionStore;
pub use scores::SqliteScoreStore;
pub use scripts::SqliteScriptStore;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use trivia_core::StoreError;

/// Open (creating if missing) the SQLite database at the given path
pub async fn connect(path: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))
}

/// Create any missing tables
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS Questions (
            ID INTEGER PRIMARY KEY,
            Category TEXT NOT NULL,
            Question TEXT NOT NULL,
            Answer TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(map_query_error)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS TotalScores (
            User TEXT PRIMARY KEY,
            TotalScore INTEGER NOT NULL,
            AverageTime INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(map_query_error)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS CustomScripts (
            GuildID TEXT NOT NULL,
            CommandName TEXT NOT NULL,
            Script TEXT NOT NULL,
            PRIMARY KEY (GuildID, CommandName)
        )",
    )
    .execute(pool)
    .await
    .map_err(map_query_error)?;

    Ok(())
}

pub(crate) fn map_query_error(e: sqlx::Error) -> StoreError {
    StoreError::Query(e.to_string())
}
