//! Persistent store traits - questions, scores, custom scripts
//!
//! Schema-level contract with the backing store:
//! `Questions(Category, Question, Answer)` where Answer packs alternatives
//! separated by `*`, `TotalScores(User, TotalScore, AverageTime)`, and
//! `CustomScripts(GuildID, CommandName, Script)`.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::value_objects::Snowflake;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Separator between alternative answers in a stored answer string
pub const ANSWER_SEPARATOR: char = '*';

/// A trivia question as drawn from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub category: String,
    pub text: String,
    /// Raw answer string; alternatives separated by [`ANSWER_SEPARATOR`]
    pub answer: String,
}

impl Question {
    /// Split the raw answer string into case-folded accepted answers
    pub fn accepted_answers(&self) -> Vec<String> {
        self.answer
            .split(ANSWER_SEPARATOR)
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect()
    }
}

/// A user's persisted all-time score record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRecord {
    pub user_id: Snowflake,
    pub total_score: u64,
    pub average_time_ms: u64,
}

/// A guild-supplied custom command script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomScript {
    pub guild_id: Snowflake,
    pub command_name: String,
    pub script: String,
}

/// Result of a custom-script upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Draw one uniformly random question
    async fn random_question(&self) -> StoreResult<Question>;
}

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Fetch a user's all-time record, if one exists
    async fn get(&self, user_id: Snowflake) -> StoreResult<Option<ScoreRecord>>;

    /// Insert a record for a user with no prior entry
    async fn insert(&self, record: &ScoreRecord) -> StoreResult<()>;

    /// Overwrite an existing record
    async fn update(&self, record: &ScoreRecord) -> StoreResult<()>;
}

#[async_trait]
pub trait CustomScriptStore: Send + Sync {
    /// Load every stored script (startup command-table population)
    async fn load_all(&self) -> StoreResult<Vec<CustomScript>>;

    /// Look up one script by its (guild, command) key
    async fn get(&self, guild_id: Snowflake, command_name: &str) -> StoreResult<Option<CustomScript>>;

    /// Insert or replace a script, reporting which happened
    async fn upsert(&self, script: &CustomScript) -> StoreResult<UpsertOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_answers_split_and_fold() {
        let question = Question {
            category: "Geography".into(),
            text: "Capital of France?".into(),
            answer: "Paris*PARIS, France".into(),
        };
        assert_eq!(
            question.accepted_answers(),
            vec!["paris".to_string(), "paris, france".to_string()]
        );
    }

    #[test]
    fn test_accepted_answers_single() {
        let question = Question {
            category: "Maths".into(),
            text: "2+2?".into(),
            answer: "Four".into(),
        };
        assert_eq!(question.accepted_answers(), vec!["four".to_string()]);
    }

    #[test]
    fn test_accepted_answers_drops_empty_segments() {
        let question = Question {
            category: "X".into(),
            text: "?".into(),
            answer: "a**b*".into(),
        };
        assert_eq!(question.accepted_answers(), vec!["a".to_string(), "b".to_string()]);
    }
}
