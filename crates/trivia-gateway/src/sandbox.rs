//! Sandbox context building and the default no-op sandbox
//!
//! The embedded script engine lives behind the `ScriptSandbox` trait and is
//! supplied by the embedder. Scripts only ever see owned snapshot records
//! built here from the cache at dispatch time.

use async_trait::async_trait;

use trivia_cache::EntityCache;
use trivia_core::{
    ChannelSnapshot, GuildSnapshot, MemberSnapshot, RoleSnapshot, SandboxError, SandboxFactory,
    ScriptContext, ScriptSandbox, Snowflake,
};

/// Snapshot the entities a script invocation is allowed to see
///
/// Returns `None` when the guild, channel, or invoking member is not fully
/// resolvable in the cache.
pub fn build_context(
    cache: &EntityCache,
    guild_id: Snowflake,
    channel_id: Snowflake,
    user_id: Snowflake,
    args: String,
) -> Option<ScriptContext> {
    let guild = cache.guild(guild_id)?;
    let channel = cache.channel(channel_id)?;
    let user = cache.user(user_id)?;
    let member = cache.member(guild_id, user_id)?;

    let role_names = member
        .role_ids
        .iter()
        .filter_map(|id| cache.role(*id))
        .map(|r| r.name.clone())
        .collect();

    let roles = guild
        .role_ids
        .iter()
        .filter_map(|id| cache.role(*id))
        .map(|r| RoleSnapshot {
            id: r.id,
            name: r.name.clone(),
            colour: r.colour,
        })
        .collect();

    Some(ScriptContext {
        guild: GuildSnapshot {
            id: guild.id,
            name: guild.name.clone(),
            owner_id: guild.owner_id,
            region: guild.region.clone(),
            member_count: guild.member_ids.len(),
            channel_count: guild.channel_ids.len(),
        },
        channel: ChannelSnapshot {
            id: channel.id,
            name: channel.name.clone(),
            topic: channel.topic.clone(),
        },
        sender: MemberSnapshot {
            user_id: user.id,
            username: user.username.clone(),
            discriminator: user.discriminator.clone(),
            nickname: member.nickname.clone(),
            bot: user.bot,
            role_names,
        },
        roles,
        args,
    })
}

/// Sandbox that logs invocations and produces no replies
///
/// Stands in wherever no real script engine has been wired up.
pub struct TracingSandbox {
    guild_id: Snowflake,
}

#[async_trait]
impl ScriptSandbox for TracingSandbox {
    async fn execute(
        &self,
        script: &str,
        context: ScriptContext,
    ) -> Result<Vec<String>, SandboxError> {
        tracing::info!(
            guild_id = %self.guild_id,
            invoked_by = %context.sender.user_id,
            script_bytes = script.len(),
            "Custom script invoked with no script engine configured"
        );
        Ok(Vec::new())
    }
}

/// Factory producing [`TracingSandbox`] bindings
pub struct TracingSandboxFactory;

impl SandboxFactory for TracingSandboxFactory {
    fn create(&self, guild_id: Snowflake) -> Box<dyn ScriptSandbox> {
        Box::new(TracingSandbox { guild_id })
    }
}
