//! Role entity - a guild role carrying a raw permission mask

use crate::value_objects::Snowflake;

/// Role entity
///
/// The permission mask is carried exactly as received; this client never
/// evaluates individual permission bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub colour: i64,
    pub hoist: bool,
    pub position: i64,
    pub permissions: u64,
    pub managed: bool,
    pub mentionable: bool,
}

impl Role {
    /// Create a new Role
    pub fn new(id: Snowflake, guild_id: Snowflake, name: String) -> Self {
        Self {
            id,
            guild_id,
            name,
            colour: 0,
            hoist: false,
            position: 0,
            permissions: 0,
            managed: false,
            mentionable: false,
        }
    }

    /// Get the colour as a hex string (without #)
    pub fn colour_hex(&self) -> String {
        format!("{:06x}", self.colour)
    }

    /// Multi-line human-readable dump for the `debug` command
    pub fn describe(&self) -> String {
        format!(
            "**__Role {}__**\n**name:** {}\n**colour:** {}\n**hoist:** {}\n\
             **position:** {}\n**permissions:** {}\n**managed:** {}\n**mentionable:** {}",
            self.id,
            self.name,
            self.colour_hex(),
            self.hoist,
            self.position,
            self.permissions,
            self.managed,
            self.mentionable,
        )
    }
}
