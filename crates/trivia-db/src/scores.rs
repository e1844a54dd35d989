//! SQLite score store
//!
//! User IDs are stored as their decimal-string form in the `User` column.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use trivia_core::{ScoreRecord, ScoreStore, Snowflake, StoreResult};

use crate::map_query_error;

/// Persists all-time scores in the `TotalScores` table
#[derive(Debug, Clone)]
pub struct SqliteScoreStore {
    pool: SqlitePool,
}

impl SqliteScoreStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    async fn get(&self, user_id: Snowflake) -> StoreResult<Option<ScoreRecord>> {
        let row = sqlx::query("SELECT TotalScore, AverageTime FROM TotalScores WHERE User = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        match row {
            Some(row) => {
                let total: i64 = row.try_get("TotalScore").map_err(map_query_error)?;
                let average: i64 = row.try_get("AverageTime").map_err(map_query_error)?;
                Ok(Some(ScoreRecord {
                    user_id,
                    total_score: total.max(0) as u64,
                    average_time_ms: average.max(0) as u64,
                }))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, record: &ScoreRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO TotalScores (User, TotalScore, AverageTime) VALUES (?, ?, ?)")
            .bind(record.user_id.to_string())
            .bind(record.total_score as i64)
            .bind(record.average_time_ms as i64)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;
        Ok(())
    }

    async fn update(&self, record: &ScoreRecord) -> StoreResult<()> {
        sqlx::query("UPDATE TotalScores SET TotalScore = ?, AverageTime = ? WHERE User = ?")
            .bind(record.total_score as i64)
            .bind(record.average_time_ms as i64)
            .bind(record.user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;
        Ok(())
    }
}
