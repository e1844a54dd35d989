//! Gateway dispatch events - typed payloads and the decoded event enum

mod gateway_event;
mod payloads;

pub use gateway_event::GatewayEvent;
pub use payloads::{
    ActivityPayload, ChannelPayload, GuildDeletePayload, GuildPayload, GuildRoleDeletePayload,
    GuildRolePayload, MemberPayload, MemberRemovePayload, MessagePayload, PresencePayload,
    PresenceUserRef, ReadyPayload, RolePayload, UserPayload,
};
