//! Event payload builders for driving the cache and router in tests

use serde_json::json;

use trivia_core::events::{
    ChannelPayload, GuildDeletePayload, GuildPayload, MemberPayload, MemberRemovePayload,
    MessagePayload,
};
use trivia_core::Snowflake;

/// A guild payload with one text channel (`id * 10`), one role (`id * 100`),
/// and the given member user IDs
pub fn guild(id: u64, member_ids: &[u64]) -> GuildPayload {
    let members: Vec<serde_json::Value> = member_ids
        .iter()
        .map(|uid| {
            json!({
                "user": {
                    "id": uid.to_string(),
                    "username": format!("user-{uid}"),
                    "discriminator": format!("{uid:04}"),
                }
            })
        })
        .collect();

    serde_json::from_value(json!({
        "id": id.to_string(),
        "name": format!("guild-{id}"),
        "owner_id": member_ids.first().unwrap_or(&1).to_string(),
        "channels": [
            {"id": (id * 10).to_string(), "name": format!("general-{id}"), "type": "text"},
        ],
        "roles": [
            {"id": (id * 100).to_string(), "name": "@everyone"},
        ],
        "members": members,
    }))
    .unwrap()
}

pub fn guild_delete(id: u64) -> GuildDeletePayload {
    serde_json::from_value(json!({"id": id.to_string()})).unwrap()
}

pub fn channel(id: u64, guild_id: u64, name: &str) -> ChannelPayload {
    serde_json::from_value(json!({
        "id": id.to_string(),
        "guild_id": guild_id.to_string(),
        "name": name,
        "type": "text",
    }))
    .unwrap()
}

pub fn member_add(guild_id: u64, user_id: u64) -> MemberPayload {
    serde_json::from_value(json!({
        "guild_id": guild_id.to_string(),
        "user": {
            "id": user_id.to_string(),
            "username": format!("user-{user_id}"),
            "discriminator": format!("{user_id:04}"),
        }
    }))
    .unwrap()
}

pub fn member_remove(guild_id: u64, user_id: u64) -> MemberRemovePayload {
    serde_json::from_value(json!({
        "guild_id": guild_id.to_string(),
        "user": {"id": user_id.to_string()}
    }))
    .unwrap()
}

/// A chat message from the given author in the given channel
pub fn message(channel_id: u64, author_id: u64, content: &str) -> MessagePayload {
    serde_json::from_value(json!({
        "channel_id": channel_id.to_string(),
        "content": content,
        "author": {
            "id": author_id.to_string(),
            "username": format!("user-{author_id}"),
            "discriminator": format!("{author_id:04}"),
        }
    }))
    .unwrap()
}

/// Channel ID of the fixture guild's text channel
pub fn channel_of(guild_id: u64) -> Snowflake {
    Snowflake::new(guild_id * 10)
}
