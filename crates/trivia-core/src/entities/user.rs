//! User entity - a process-wide singleton per ID, shared across guilds

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Online status carried by presence updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
}

impl PresenceStatus {
    /// Get the wire name of this status
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Offline => "offline",
        }
    }
}

/// User entity
///
/// A user is kept in the cache only while it is visible through at least one
/// guild membership; `guild_ids` tracks that visibility set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub discriminator: String,
    pub avatar: Option<String>,
    pub bot: bool,
    pub mfa_enabled: bool,
    // transient presence
    pub status: PresenceStatus,
    pub activity: Option<String>,
    /// Guilds this user is currently visible in
    pub guild_ids: HashSet<Snowflake>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, username: String, discriminator: String) -> Self {
        Self {
            id,
            username,
            discriminator,
            avatar: None,
            bot: false,
            mfa_enabled: false,
            status: PresenceStatus::Offline,
            activity: None,
            guild_ids: HashSet::new(),
        }
    }

    /// Get the full tag: username#discriminator
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }

    /// Get the chat mention form of this user
    pub fn mention(&self) -> String {
        format!("<@!{}>", self.id)
    }

    /// Check if user is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.bot
    }
}
