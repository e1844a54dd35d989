//! Client payload definitions
//!
//! Payload structures for the non-dispatch messages this client exchanges.

use serde::{Deserialize, Serialize};

use trivia_core::Snowflake;

/// Payload of op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload of op 2 (Identify)
///
/// Sent by the client exactly once per connection, immediately after Hello.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authentication token
    pub token: String,

    pub properties: IdentifyProperties,

    pub compress: bool,

    /// Member-list threshold above which a guild is sent as "large"
    pub large_threshold: u32,

    /// `[shard_id, shard_count]`
    pub shard: [u32; 2],
}

impl IdentifyPayload {
    /// Compression is never requested
    pub const COMPRESS: bool = false;

    /// Member count above which guilds arrive without full member lists
    pub const LARGE_THRESHOLD: u32 = 250;

    /// Create the standard single-shard identify payload
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            properties: IdentifyProperties::default(),
            compress: Self::COMPRESS,
            large_threshold: Self::LARGE_THRESHOLD,
            shard: [0, 1],
        }
    }
}

/// Client connection properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    #[serde(rename = "$browser")]
    pub browser: String,

    #[serde(rename = "$device")]
    pub device: String,

    #[serde(rename = "$referrer")]
    pub referrer: String,

    #[serde(rename = "$referring_domain")]
    pub referring_domain: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            browser: std::env::consts::OS.to_string(),
            device: concat!("triviabot-", env!("CARGO_PKG_VERSION")).to_string(),
            referrer: String::new(),
            referring_domain: String::new(),
        }
    }
}

/// Payload of op 8 (Request Guild Members)
///
/// Asks the server to stream the full member list of a large guild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestGuildMembersPayload {
    pub guild_id: Snowflake,

    /// Username prefix filter; empty requests everyone
    pub query: String,

    /// Maximum members to return; 0 means no limit
    pub limit: u32,
}

impl RequestGuildMembersPayload {
    /// Request every member of a guild
    #[must_use]
    pub fn all(guild_id: Snowflake) -> Self {
        Self {
            guild_id,
            query: String::new(),
            limit: 0,
        }
    }
}
