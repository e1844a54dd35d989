//! SQLite question store

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use trivia_core::{Question, QuestionStore, StoreError, StoreResult};

use crate::map_query_error;

/// Draws questions uniformly at random from the `Questions` table
#[derive(Debug, Clone)]
pub struct SqliteQuestionStore {
    pool: SqlitePool,
}

impl SqliteQuestionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionStore for SqliteQuestionStore {
    async fn random_question(&self) -> StoreResult<Question> {
        let row = sqlx::query(
            "SELECT Category, Question, Answer FROM Questions ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_query_error)?
        .ok_or_else(|| StoreError::Corrupt("question table is empty".into()))?;

        Ok(Question {
            category: row
                .try_get("Category")
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            text: row
                .try_get("Question")
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            answer: row
                .try_get("Answer")
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        })
    }
}
