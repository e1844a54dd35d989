//! Gateway operation codes
//!
//! Defines the protocol-version-5 op code table.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway operation codes
///
/// Op codes define the type of message being sent or received over the
/// persistent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Server dispatches a named state-change event (server only)
    Dispatch = 0,
    /// Heartbeat - keep connection alive (client only)
    Heartbeat = 1,
    /// Identify - client handshake (client only)
    Identify = 2,
    /// Status Update - update the client status (client only)
    StatusUpdate = 3,
    /// Voice State Update - join/move/leave voice channels (client only)
    VoiceStateUpdate = 4,
    /// Voice Server Ping (client only)
    VoiceServerPing = 5,
    /// Resume - resume a closed connection (client only)
    Resume = 6,
    /// Reconnect - server requests a fresh connection (server only)
    Reconnect = 7,
    /// Request Guild Members - ask for member chunks (client only)
    RequestGuildMembers = 8,
    /// Invalid Session - session id rejected (server only)
    InvalidSession = 9,
    /// Hello - sent on connect, carries the heartbeat interval (server only)
    Hello = 10,
    /// Heartbeat ACK - acknowledges a client heartbeat (server only)
    HeartbeatAck = 11,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            3 => Some(Self::StatusUpdate),
            4 => Some(Self::VoiceStateUpdate),
            5 => Some(Self::VoiceServerPing),
            6 => Some(Self::Resume),
            7 => Some(Self::Reconnect),
            8 => Some(Self::RequestGuildMembers),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this op code is sent by the server
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(
            self,
            Self::Dispatch | Self::Reconnect | Self::InvalidSession | Self::Hello | Self::HeartbeatAck
        )
    }

    /// Check if this op code is sent by the client
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::Identify
                | Self::StatusUpdate
                | Self::VoiceStateUpdate
                | Self::VoiceServerPing
                | Self::Resume
                | Self::RequestGuildMembers
        )
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::StatusUpdate => "StatusUpdate",
            Self::VoiceStateUpdate => "VoiceStateUpdate",
            Self::VoiceServerPing => "VoiceServerPing",
            Self::Resume => "Resume",
            Self::Reconnect => "Reconnect",
            Self::RequestGuildMembers => "RequestGuildMembers",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_u8() {
        assert_eq!(OpCode::from_u8(0), Some(OpCode::Dispatch));
        assert_eq!(OpCode::from_u8(1), Some(OpCode::Heartbeat));
        assert_eq!(OpCode::from_u8(2), Some(OpCode::Identify));
        assert_eq!(OpCode::from_u8(8), Some(OpCode::RequestGuildMembers));
        assert_eq!(OpCode::from_u8(10), Some(OpCode::Hello));
        assert_eq!(OpCode::from_u8(11), Some(OpCode::HeartbeatAck));
        assert_eq!(OpCode::from_u8(12), None);
        assert_eq!(OpCode::from_u8(255), None);
    }

    #[test]
    fn test_direction_split() {
        assert!(OpCode::Hello.is_inbound());
        assert!(OpCode::Dispatch.is_inbound());
        assert!(OpCode::HeartbeatAck.is_inbound());
        assert!(!OpCode::Hello.is_outbound());

        assert!(OpCode::Heartbeat.is_outbound());
        assert!(OpCode::Identify.is_outbound());
        assert!(OpCode::RequestGuildMembers.is_outbound());
        assert!(!OpCode::Identify.is_inbound());
    }

    #[test]
    fn test_opcode_serialization() {
        let json = serde_json::to_string(&OpCode::Hello).unwrap();
        assert_eq!(json, "10");

        let op: OpCode = serde_json::from_str("2").unwrap();
        assert_eq!(op, OpCode::Identify);

        assert!(serde_json::from_str::<OpCode>("42").is_err());
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(format!("{}", OpCode::Hello), "Hello (10)");
        assert_eq!(format!("{}", OpCode::Dispatch), "Dispatch (0)");
    }
}
