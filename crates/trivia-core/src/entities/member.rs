//! Member entity - a user's membership in a guild

use chrono::{DateTime, Utc};

use crate::entities::User;
use crate::value_objects::Snowflake;

/// Guild member entity (junction between User and Guild)
///
/// Identified by the composite key (guild_id, user_id). Roles are held as
/// IDs and resolved through the cache, never as copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildMember {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub nickname: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    pub deaf: bool,
    pub mute: bool,
    pub role_ids: Vec<Snowflake>,
}

impl GuildMember {
    /// Create a new GuildMember
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            guild_id,
            user_id,
            nickname: None,
            joined_at: None,
            deaf: false,
            mute: false,
            role_ids: Vec::new(),
        }
    }

    /// Get display name (nickname if set, otherwise fallback)
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.nickname.as_deref().unwrap_or(username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Set the member's roles (replaces all existing roles wholesale)
    pub fn set_roles(&mut self, role_ids: Vec<Snowflake>) {
        self.role_ids = role_ids;
    }

    /// Multi-line human-readable dump for the `debug` command
    pub fn describe(&self, user: &User) -> String {
        format!(
            "**__GuildMember {}__**\n**mention:** {} / {}\n**bot:** {}\n\
             **mfa_enabled:** {}\n**avatar:** {}\n**status:** {}\n**activity:** {}\n\
             **nick:** {}\n**joined_at:** {}\n**deaf:** {}\n**mute:** {}\n**roles:** {}",
            self.user_id,
            user.mention(),
            user.tag(),
            user.bot,
            user.mfa_enabled,
            user.avatar.as_deref().unwrap_or("none"),
            user.status.name(),
            user.activity.as_deref().unwrap_or("none"),
            self.nickname.as_deref().unwrap_or("none"),
            self.joined_at
                .map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339()),
            self.deaf,
            self.mute,
            self.role_ids.len(),
        )
    }
}
