//! Decoded dispatch events
//!
//! A dispatch frame carries an event name (`t`) and a payload (`d`); this
//! module turns that pair into a typed event. Unknown event names decode to
//! `Unknown` so the caller can log and move on without failing the frame.

use serde_json::Value;

use super::payloads::{
    GuildDeletePayload, GuildPayload, GuildRoleDeletePayload, GuildRolePayload, ChannelPayload,
    MemberPayload, MemberRemovePayload, MessagePayload, PresencePayload, ReadyPayload,
};

/// All dispatch events this client consumes
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(ReadyPayload),
    GuildCreate(GuildPayload),
    GuildUpdate(GuildPayload),
    GuildDelete(GuildDeletePayload),
    GuildMemberAdd(MemberPayload),
    GuildMemberUpdate(MemberPayload),
    GuildMemberRemove(MemberRemovePayload),
    GuildRoleCreate(GuildRolePayload),
    GuildRoleUpdate(GuildRolePayload),
    GuildRoleDelete(GuildRoleDeletePayload),
    ChannelCreate(ChannelPayload),
    ChannelUpdate(ChannelPayload),
    ChannelDelete(ChannelPayload),
    MessageCreate(MessagePayload),
    PresenceUpdate(PresencePayload),
    /// Received and deliberately dropped
    TypingStart,
    /// Event name this client does not consume
    Unknown(String),
}

impl GatewayEvent {
    /// Decode an event from its dispatch name and raw payload
    pub fn decode(name: &str, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match name {
            "READY" => Self::Ready(serde_json::from_value(data)?),
            "GUILD_CREATE" => Self::GuildCreate(serde_json::from_value(data)?),
            "GUILD_UPDATE" => Self::GuildUpdate(serde_json::from_value(data)?),
            "GUILD_DELETE" => Self::GuildDelete(serde_json::from_value(data)?),
            "GUILD_MEMBER_ADD" => Self::GuildMemberAdd(serde_json::from_value(data)?),
            "GUILD_MEMBER_UPDATE" => Self::GuildMemberUpdate(serde_json::from_value(data)?),
            "GUILD_MEMBER_REMOVE" => Self::GuildMemberRemove(serde_json::from_value(data)?),
            "GUILD_ROLE_CREATE" => Self::GuildRoleCreate(serde_json::from_value(data)?),
            "GUILD_ROLE_UPDATE" => Self::GuildRoleUpdate(serde_json::from_value(data)?),
            "GUILD_ROLE_DELETE" => Self::GuildRoleDelete(serde_json::from_value(data)?),
            "CHANNEL_CREATE" => Self::ChannelCreate(serde_json::from_value(data)?),
            "CHANNEL_UPDATE" => Self::ChannelUpdate(serde_json::from_value(data)?),
            "CHANNEL_DELETE" => Self::ChannelDelete(serde_json::from_value(data)?),
            "MESSAGE_CREATE" => Self::MessageCreate(serde_json::from_value(data)?),
            "PRESENCE_UPDATE" => Self::PresenceUpdate(serde_json::from_value(data)?),
            "TYPING_START" => Self::TypingStart,
            other => Self::Unknown(other.to_string()),
        })
    }

    /// Get the dispatch name of this event
    pub fn event_type(&self) -> &str {
        match self {
            Self::Ready(_) => "READY",
            Self::GuildCreate(_) => "GUILD_CREATE",
            Self::GuildUpdate(_) => "GUILD_UPDATE",
            Self::GuildDelete(_) => "GUILD_DELETE",
            Self::GuildMemberAdd(_) => "GUILD_MEMBER_ADD",
            Self::GuildMemberUpdate(_) => "GUILD_MEMBER_UPDATE",
            Self::GuildMemberRemove(_) => "GUILD_MEMBER_REMOVE",
            Self::GuildRoleCreate(_) => "GUILD_ROLE_CREATE",
            Self::GuildRoleUpdate(_) => "GUILD_ROLE_UPDATE",
            Self::GuildRoleDelete(_) => "GUILD_ROLE_DELETE",
            Self::ChannelCreate(_) => "CHANNEL_CREATE",
            Self::ChannelUpdate(_) => "CHANNEL_UPDATE",
            Self::ChannelDelete(_) => "CHANNEL_DELETE",
            Self::MessageCreate(_) => "MESSAGE_CREATE",
            Self::PresenceUpdate(_) => "PRESENCE_UPDATE",
            Self::TypingStart => "TYPING_START",
            Self::Unknown(name) => name,
        }
    }
}
