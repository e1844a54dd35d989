//! Gateway wire protocol
//!
//! JSON envelope `{op, d, s?, t?}` over a persistent connection.

mod messages;
mod opcodes;
mod payloads;

pub use messages::{GatewayMessage, ProtocolDecodeError};
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, RequestGuildMembersPayload};
