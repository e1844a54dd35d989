//! Dispatch event payload definitions
//!
//! One serde struct per dispatch payload shape, plus the conversions into
//! domain entities. Nested sub-payloads (channels/roles/members inside a
//! guild) default to empty so partial payloads decode cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Channel, ChannelKind, Guild, GuildMember, PresenceStatus, Role, User};
use crate::value_objects::Snowflake;

/// Payload of the READY event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPayload {
    /// The bot's own user object
    pub user: UserPayload,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, rename = "v", skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
}

/// User object as carried inside dispatch payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub discriminator: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default)]
    pub bot: bool,

    #[serde(default)]
    pub mfa_enabled: bool,
}

impl UserPayload {
    /// Build a fresh User entity (no guild visibility yet)
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            discriminator: self.discriminator,
            avatar: self.avatar,
            bot: self.bot,
            mfa_enabled: self.mfa_enabled,
            status: PresenceStatus::Offline,
            activity: None,
            guild_ids: std::collections::HashSet::new(),
        }
    }

    /// Refresh the identity fields of an existing User in place
    pub fn apply_to(&self, user: &mut User) {
        user.username = self.username.clone();
        user.discriminator = self.discriminator.clone();
        user.avatar = self.avatar.clone();
        user.bot = self.bot;
        user.mfa_enabled = self.mfa_enabled;
    }
}

/// Guild object for GUILD_CREATE / GUILD_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildPayload {
    pub id: Snowflake,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash: Option<String>,

    #[serde(default)]
    pub owner_id: Snowflake,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afk_channel_id: Option<Snowflake>,

    #[serde(default)]
    pub afk_timeout: i64,

    #[serde(default)]
    pub verification_level: i64,

    #[serde(default)]
    pub unavailable: bool,

    #[serde(default)]
    pub large: bool,

    #[serde(default)]
    pub channels: Vec<ChannelPayload>,

    #[serde(default)]
    pub roles: Vec<RolePayload>,

    #[serde(default)]
    pub members: Vec<MemberPayload>,

    #[serde(default)]
    pub presences: Vec<PresencePayload>,
}

impl GuildPayload {
    /// Build a Guild entity from the scalar fields (link lists start empty;
    /// the cache fills them while applying the nested sub-payloads)
    #[must_use]
    pub fn to_guild(&self) -> Guild {
        Guild {
            id: self.id,
            name: self.name.clone(),
            icon: self.icon.clone(),
            splash: self.splash.clone(),
            owner_id: self.owner_id,
            region: self.region.clone(),
            afk_channel_id: self.afk_channel_id,
            afk_timeout: self.afk_timeout,
            verification_level: self.verification_level,
            unavailable: self.unavailable,
            large: self.large,
            channel_ids: Vec::new(),
            role_ids: Vec::new(),
            member_ids: Vec::new(),
        }
    }

    /// Patch the scalar fields of an existing Guild, leaving links intact
    pub fn apply_to(&self, guild: &mut Guild) {
        guild.name = self.name.clone();
        guild.icon = self.icon.clone();
        guild.splash = self.splash.clone();
        guild.owner_id = self.owner_id;
        guild.region = self.region.clone();
        guild.afk_channel_id = self.afk_channel_id;
        guild.afk_timeout = self.afk_timeout;
        guild.verification_level = self.verification_level;
        guild.unavailable = self.unavailable;
    }
}

/// Payload of GUILD_DELETE (a stub guild reference)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildDeletePayload {
    pub id: Snowflake,

    #[serde(default)]
    pub unavailable: bool,
}

/// Channel object for CHANNEL_* events and nested GUILD_CREATE lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub id: Snowflake,

    /// Absent when nested inside GUILD_CREATE; the cache injects the parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: ChannelKind,

    #[serde(default)]
    pub position: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_limit: Option<i64>,
}

impl ChannelPayload {
    /// Build a Channel entity under the given parent guild
    #[must_use]
    pub fn to_channel(&self, guild_id: Snowflake) -> Channel {
        Channel {
            id: self.id,
            guild_id,
            name: self.name.clone(),
            kind: self.kind,
            position: self.position,
            topic: self.topic.clone(),
            last_message_id: self.last_message_id,
            bitrate: self.bitrate,
            user_limit: self.user_limit,
        }
    }

    /// Patch an existing Channel in place (parent guild never changes)
    pub fn apply_to(&self, channel: &mut Channel) {
        channel.name = self.name.clone();
        channel.kind = self.kind;
        channel.position = self.position;
        channel.topic = self.topic.clone();
        channel.last_message_id = self.last_message_id;
        channel.bitrate = self.bitrate;
        channel.user_limit = self.user_limit;
    }
}

/// Role object for GUILD_ROLE_* events and nested GUILD_CREATE lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePayload {
    pub id: Snowflake,

    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "color")]
    pub colour: i64,

    #[serde(default)]
    pub hoist: bool,

    #[serde(default)]
    pub position: i64,

    #[serde(default)]
    pub permissions: u64,

    #[serde(default)]
    pub managed: bool,

    #[serde(default)]
    pub mentionable: bool,
}

impl RolePayload {
    /// Build a Role entity under the given parent guild
    #[must_use]
    pub fn to_role(&self, guild_id: Snowflake) -> Role {
        Role {
            id: self.id,
            guild_id,
            name: self.name.clone(),
            colour: self.colour,
            hoist: self.hoist,
            position: self.position,
            permissions: self.permissions,
            managed: self.managed,
            mentionable: self.mentionable,
        }
    }

    /// Patch an existing Role in place
    pub fn apply_to(&self, role: &mut Role) {
        role.name = self.name.clone();
        role.colour = self.colour;
        role.hoist = self.hoist;
        role.position = self.position;
        role.permissions = self.permissions;
        role.managed = self.managed;
        role.mentionable = self.mentionable;
    }
}

/// Member object for GUILD_MEMBER_ADD / _UPDATE and nested GUILD_CREATE lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPayload {
    pub user: UserPayload,

    /// Absent when nested inside GUILD_CREATE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,

    #[serde(default)]
    pub roles: Vec<Snowflake>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub deaf: bool,

    #[serde(default)]
    pub mute: bool,
}

impl MemberPayload {
    /// Build a GuildMember entity under the given parent guild
    #[must_use]
    pub fn to_member(&self, guild_id: Snowflake) -> GuildMember {
        GuildMember {
            guild_id,
            user_id: self.user.id,
            nickname: self.nick.clone(),
            joined_at: self.joined_at,
            deaf: self.deaf,
            mute: self.mute,
            role_ids: self.roles.clone(),
        }
    }
}

/// Payload of GUILD_MEMBER_REMOVE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRemovePayload {
    pub guild_id: Snowflake,
    pub user: UserPayload,
}

/// Payload of GUILD_ROLE_CREATE / GUILD_ROLE_UPDATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildRolePayload {
    pub guild_id: Snowflake,
    pub role: RolePayload,
}

/// Payload of GUILD_ROLE_DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildRoleDeletePayload {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}

/// Payload of MESSAGE_CREATE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub channel_id: Snowflake,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Snowflake>,

    #[serde(default)]
    pub content: String,

    pub author: UserPayload,
}

/// User reference inside a presence payload (identity fields may be absent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUserRef {
    pub id: Snowflake,
}

/// Activity carried by a presence payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload of PRESENCE_UPDATE and nested GUILD_CREATE presence lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresencePayload {
    pub user: PresenceUserRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Snowflake>,

    #[serde(default)]
    pub status: PresenceStatus,

    #[serde(default, rename = "game", skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityPayload>,
}

impl PresencePayload {
    /// The activity name, if one is being played
    pub fn activity_name(&self) -> Option<&str> {
        self.activity.as_ref().and_then(|a| a.name.as_deref())
    }
}
