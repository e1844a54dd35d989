//! In-memory doubles for the collaborator traits

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use trivia_core::{
    CustomScript, CustomScriptStore, MessageSender, Question, QuestionStore, SandboxError,
    SandboxFactory, ScoreRecord, ScoreStore, ScriptContext, ScriptSandbox, SendError, Snowflake,
    StoreError, StoreResult, UpsertOutcome,
};

/// Records every message in delivery order
pub struct RecordingSender {
    messages: Mutex<Vec<(Snowflake, String)>>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
        })
    }

    /// Snapshot of everything sent so far
    pub fn log(&self) -> Vec<(Snowflake, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Drain and return everything sent so far
    pub fn take(&self) -> Vec<(Snowflake, String)> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, channel_id: Snowflake, content: &str) -> Result<(), SendError> {
        self.messages
            .lock()
            .unwrap()
            .push((channel_id, content.to_string()));
        Ok(())
    }
}

/// Serves one fixed question forever
pub struct FixedQuestionStore {
    question: Question,
}

impl FixedQuestionStore {
    pub fn new(category: &str, text: &str, answer: &str) -> Arc<Self> {
        Arc::new(Self {
            question: Question {
                category: category.to_string(),
                text: text.to_string(),
                answer: answer.to_string(),
            },
        })
    }

    /// The classic fixture
    pub fn paris() -> Arc<Self> {
        Self::new("Geography", "What is the capital of France?", "Paris")
    }
}

#[async_trait]
impl QuestionStore for FixedQuestionStore {
    async fn random_question(&self) -> StoreResult<Question> {
        Ok(self.question.clone())
    }
}

/// Always fails, as if the backing store were gone
pub struct BrokenQuestionStore;

#[async_trait]
impl QuestionStore for BrokenQuestionStore {
    async fn random_question(&self) -> StoreResult<Question> {
        Err(StoreError::Unavailable("store is down".into()))
    }
}

/// HashMap-backed score store
#[derive(Default)]
pub struct MemoryScoreStore {
    records: Mutex<HashMap<Snowflake, ScoreRecord>>,
}

impl MemoryScoreStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Pre-seed a prior record
    pub fn seed(&self, record: ScoreRecord) {
        self.records.lock().unwrap().insert(record.user_id, record);
    }

    pub fn record(&self, user_id: Snowflake) -> Option<ScoreRecord> {
        self.records.lock().unwrap().get(&user_id).copied()
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn get(&self, user_id: Snowflake) -> StoreResult<Option<ScoreRecord>> {
        Ok(self.records.lock().unwrap().get(&user_id).copied())
    }

    async fn insert(&self, record: &ScoreRecord) -> StoreResult<()> {
        self.records.lock().unwrap().insert(record.user_id, *record);
        Ok(())
    }

    async fn update(&self, record: &ScoreRecord) -> StoreResult<()> {
        self.records.lock().unwrap().insert(record.user_id, *record);
        Ok(())
    }
}

/// Vec-backed custom script store
#[derive(Default)]
pub struct MemoryScriptStore {
    scripts: Mutex<Vec<CustomScript>>,
}

impl MemoryScriptStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_script(guild_id: Snowflake, name: &str, script: &str) -> Arc<Self> {
        let store = Self::new();
        store.scripts.lock().unwrap().push(CustomScript {
            guild_id,
            command_name: name.to_string(),
            script: script.to_string(),
        });
        store
    }
}

#[async_trait]
impl CustomScriptStore for MemoryScriptStore {
    async fn load_all(&self) -> StoreResult<Vec<CustomScript>> {
        Ok(self.scripts.lock().unwrap().clone())
    }

    async fn get(&self, guild_id: Snowflake, name: &str) -> StoreResult<Option<CustomScript>> {
        Ok(self
            .scripts
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.guild_id == guild_id && s.command_name == name)
            .cloned())
    }

    async fn upsert(&self, script: &CustomScript) -> StoreResult<UpsertOutcome> {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts
            .iter_mut()
            .find(|s| s.guild_id == script.guild_id && s.command_name == script.command_name)
        {
            Some(existing) => {
                existing.script = script.script.clone();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                scripts.push(script.clone());
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

/// Sandbox that replies with the script source and the argument tail
pub struct EchoSandbox;

#[async_trait]
impl ScriptSandbox for EchoSandbox {
    async fn execute(
        &self,
        script: &str,
        context: ScriptContext,
    ) -> Result<Vec<String>, SandboxError> {
        Ok(vec![format!("ran `{script}` with args `{}`", context.args)])
    }
}

pub struct EchoSandboxFactory;

impl SandboxFactory for EchoSandboxFactory {
    fn create(&self, _guild_id: Snowflake) -> Box<dyn ScriptSandbox> {
        Box::new(EchoSandbox)
    }
}
