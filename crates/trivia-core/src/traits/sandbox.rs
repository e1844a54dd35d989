//! Script sandbox trait and snapshot records
//!
//! Custom commands run guild-supplied scripts against read-only snapshots of
//! cache entities. Snapshots are owned plain records: a script can never
//! observe (or race with) a cache mutation happening after dispatch.

use async_trait::async_trait;

use crate::error::SandboxError;
use crate::value_objects::Snowflake;

/// Read-only view of a guild for script execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSnapshot {
    pub id: Snowflake,
    pub name: String,
    pub owner_id: Snowflake,
    pub region: Option<String>,
    pub member_count: usize,
    pub channel_count: usize,
}

/// Read-only view of a channel for script execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub id: Snowflake,
    pub name: String,
    pub topic: Option<String>,
}

/// Read-only view of a role for script execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    pub id: Snowflake,
    pub name: String,
    pub colour: i64,
}

/// Read-only view of the invoking member for script execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub user_id: Snowflake,
    pub username: String,
    pub discriminator: String,
    pub nickname: Option<String>,
    pub bot: bool,
    pub role_names: Vec<String>,
}

/// Everything a script invocation gets to see
#[derive(Debug, Clone)]
pub struct ScriptContext {
    pub guild: GuildSnapshot,
    pub channel: ChannelSnapshot,
    pub sender: MemberSnapshot,
    pub roles: Vec<RoleSnapshot>,
    /// Argument tail of the invoking message (everything after the command)
    pub args: String,
}

/// Port for executing one guild's custom command scripts
#[async_trait]
pub trait ScriptSandbox: Send + Sync {
    /// Run a script; returns the chat replies it produced
    async fn execute(&self, script: &str, context: ScriptContext)
        -> Result<Vec<String>, SandboxError>;
}

/// Creates one sandbox per guild, bound on the guild's first appearance
pub trait SandboxFactory: Send + Sync {
    fn create(&self, guild_id: Snowflake) -> Box<dyn ScriptSandbox>;
}
