//! Gateway message format
//!
//! All frames on the connection are a JSON envelope `{op, d, s?, t?}`; `s`
//! and `t` are only present on op 0 (Dispatch).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{HelloPayload, IdentifyPayload, OpCode, RequestGuildMembersPayload};

/// A single frame failed to decode; the frame is skipped, the connection
/// stays up
#[derive(Debug, Error)]
pub enum ProtocolDecodeError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame missing required field: {0}")]
    MissingField(&'static str),
}

/// Gateway message envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    // === Outbound messages ===

    /// Create a Heartbeat message (op=1) echoing the last seen sequence
    #[must_use]
    pub fn heartbeat(last_seq: u64) -> Self {
        Self {
            op: OpCode::Heartbeat,
            t: None,
            s: None,
            d: Some(Value::Number(last_seq.into())),
        }
    }

    /// Create an Identify message (op=2)
    #[must_use]
    pub fn identify(payload: &IdentifyPayload) -> Self {
        Self {
            op: OpCode::Identify,
            t: None,
            s: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    /// Create a Request Guild Members message (op=8)
    #[must_use]
    pub fn request_guild_members(payload: &RequestGuildMembersPayload) -> Self {
        Self {
            op: OpCode::RequestGuildMembers,
            t: None,
            s: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    // === Parsing inbound messages ===

    /// Try to parse as a Hello payload (op=10)
    pub fn as_hello(&self) -> Result<HelloPayload, ProtocolDecodeError> {
        let data = self.d.as_ref().ok_or(ProtocolDecodeError::MissingField("d"))?;
        Ok(serde_json::from_value(data.clone())?)
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, ProtocolDecodeError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl std::fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayMessage(op={})", self.op)
        }
    }
}
