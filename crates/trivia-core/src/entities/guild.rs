//! Guild entity - a top-level community owning channels, roles, and members

use crate::value_objects::Snowflake;

/// Guild entity
///
/// Child channels, roles, and members are held as ID back-references and
/// resolved through the cache on demand, never as embedded copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub icon: Option<String>,
    pub splash: Option<String>,
    pub owner_id: Snowflake,
    pub region: Option<String>,
    pub afk_channel_id: Option<Snowflake>,
    pub afk_timeout: i64,
    pub verification_level: i64,
    pub unavailable: bool,
    /// Set when the gateway marks the guild as too large to send all members
    /// up front; triggers a member-chunk request.
    pub large: bool,
    pub channel_ids: Vec<Snowflake>,
    pub role_ids: Vec<Snowflake>,
    /// User IDs of this guild's members
    pub member_ids: Vec<Snowflake>,
}

impl Guild {
    /// Create a new Guild with required fields
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake) -> Self {
        Self {
            id,
            name,
            icon: None,
            splash: None,
            owner_id,
            region: None,
            afk_channel_id: None,
            afk_timeout: 0,
            verification_level: 0,
            unavailable: false,
            large: false,
            channel_ids: Vec::new(),
            role_ids: Vec::new(),
            member_ids: Vec::new(),
        }
    }

    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// Link a channel into the guild's channel list (no-op if already linked)
    pub fn link_channel(&mut self, channel_id: Snowflake) {
        if !self.channel_ids.contains(&channel_id) {
            self.channel_ids.push(channel_id);
        }
    }

    /// Remove a channel from the guild's channel list by ID-equality search
    pub fn unlink_channel(&mut self, channel_id: Snowflake) {
        if let Some(pos) = self.channel_ids.iter().position(|&id| id == channel_id) {
            self.channel_ids.remove(pos);
        }
    }

    /// Link a role into the guild's role list (no-op if already linked)
    pub fn link_role(&mut self, role_id: Snowflake) {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
    }

    /// Remove a role from the guild's role list by ID-equality search
    pub fn unlink_role(&mut self, role_id: Snowflake) {
        if let Some(pos) = self.role_ids.iter().position(|&id| id == role_id) {
            self.role_ids.remove(pos);
        }
    }

    /// Link a member (by user ID) into the guild's member list
    pub fn link_member(&mut self, user_id: Snowflake) {
        if !self.member_ids.contains(&user_id) {
            self.member_ids.push(user_id);
        }
    }

    /// Remove a member from the guild's member list by ID-equality search
    pub fn unlink_member(&mut self, user_id: Snowflake) {
        if let Some(pos) = self.member_ids.iter().position(|&id| id == user_id) {
            self.member_ids.remove(pos);
        }
    }

    /// Multi-line human-readable dump for the `debug` command
    pub fn describe(&self) -> String {
        format!(
            "**__Guild {}__**\n**name:** {}\n**icon:** {}\n**splash:** {}\n\
             **owner_id:** {}\n**region:** {}\n**afk_channel_id:** {}\n\
             **afk_timeout:** {}\n**verification_level:** {}\n**unavailable:** {}\n\
             **channels:** {}\n**roles:** {}\n**members:** {}",
            self.id,
            self.name,
            self.icon.as_deref().unwrap_or("none"),
            self.splash.as_deref().unwrap_or("none"),
            self.owner_id,
            self.region.as_deref().unwrap_or("none"),
            self.afk_channel_id
                .map_or_else(|| "none".to_string(), |id| id.to_string()),
            self.afk_timeout,
            self.verification_level,
            self.unavailable,
            self.channel_ids.len(),
            self.role_ids.len(),
            self.member_ids.len(),
        )
    }
}
