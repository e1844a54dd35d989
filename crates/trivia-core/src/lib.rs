//! # trivia-core
//!
//! Domain layer containing entities, value objects, gateway event payloads,
//! and the traits for external collaborators (stores, message sender, script
//! sandbox). This crate has zero dependencies on the transport or persistence
//! implementations.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Channel, ChannelKind, Guild, GuildMember, PresenceStatus, Role, User};
pub use error::{SandboxError, SendError, StoreError};
pub use events::GatewayEvent;
pub use traits::{
    ChannelSnapshot, CustomScript, CustomScriptStore, GuildSnapshot, MemberSnapshot,
    MessageSender, Question, QuestionStore, RoleSnapshot, SandboxFactory, ScoreRecord,
    ScoreStore, ScriptContext, ScriptSandbox, StoreResult, UpsertOutcome,
};
pub use value_objects::{Snowflake, SnowflakeParseError};
