//! Channel entity - a text or voice channel belonging to a guild

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Channel kind as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Text,
    Voice,
}

impl ChannelKind {
    /// Get the wire name of this kind
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
        }
    }
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    pub position: i64,
    pub topic: Option<String>,
    pub last_message_id: Option<Snowflake>,
    // voice only
    pub bitrate: Option<i64>,
    pub user_limit: Option<i64>,
}

impl Channel {
    /// Create a new text channel
    #[must_use]
    pub fn new_text(id: Snowflake, guild_id: Snowflake, name: String) -> Self {
        Self {
            id,
            guild_id,
            name,
            kind: ChannelKind::Text,
            position: 0,
            topic: None,
            last_message_id: None,
            bitrate: None,
            user_limit: None,
        }
    }

    /// Check if this is a voice channel
    #[inline]
    pub fn is_voice(&self) -> bool {
        self.kind == ChannelKind::Voice
    }

    /// Multi-line human-readable dump for the `debug` command
    pub fn describe(&self) -> String {
        format!(
            "**__Channel {}__**\n**guild_id:** {}\n**name:** {}\n**type:** {}\n\
             **position:** {}\n**topic:** {}\n**last_message_id:** {}",
            self.id,
            self.guild_id,
            self.name,
            self.kind.name(),
            self.position,
            self.topic.as_deref().unwrap_or("none"),
            self.last_message_id
                .map_or_else(|| "none".to_string(), |id| id.to_string()),
        )
    }
}
