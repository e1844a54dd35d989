//! Outbound message sender trait

use async_trait::async_trait;

use crate::error::SendError;
use crate::value_objects::Snowflake;

/// Port for sending chat messages to a channel
///
/// Implementations retry transient failures internally; a returned error
/// means the message was given up on. Callers never tear anything down over
/// a failed send.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, channel_id: Snowflake, content: &str) -> Result<(), SendError>;
}
