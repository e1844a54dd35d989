//! Collaborator traits (ports) - interfaces to everything outside the core
//!
//! The domain defines what it needs; the infrastructure crates provide the
//! implementations (SQLite stores, REST sender) and the tests provide
//! in-memory doubles.

mod sandbox;
mod sender;
mod stores;

pub use sandbox::{
    ChannelSnapshot, GuildSnapshot, MemberSnapshot, RoleSnapshot, SandboxFactory, ScriptContext,
    ScriptSandbox,
};
pub use sender::MessageSender;
pub use stores::{
    CustomScript, CustomScriptStore, Question, QuestionStore, ScoreRecord, ScoreStore,
    StoreResult, UpsertOutcome,
};
