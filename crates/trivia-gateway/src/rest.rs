//! REST message sender
//!
//! Posts chat messages over HTTP with bounded retry: up to 2 extra attempts
//! with a fixed backoff on non-success responses, then give up and log.
//! Oversized messages are split once at the 2000-character limit; anything
//! past twice the limit is refused outright.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use trivia_core::{MessageSender, SendError, Snowflake};

/// Hard per-message length limit imposed by the API
const MESSAGE_LIMIT: usize = 2000;

/// Extra attempts after the first failed send
const SEND_RETRIES: u32 = 2;

/// Fixed delay between attempts
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Pause between the two halves of a split message
const SPLIT_DELAY: Duration = Duration::from_millis(50);

/// `MessageSender` implementation over the REST API
pub struct RestMessageSender {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestMessageSender {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    async fn post_chunk(&self, channel_id: Snowflake, content: &str) -> Result<(), SendError> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let body = serde_json::json!({ "content": content });

        let mut attempt = 0;
        loop {
            let response = self
                .http
                .post(&url)
                .header(AUTHORIZATION, format!("Bot {}", self.token))
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    let status = response.status().as_u16();
                    if attempt >= SEND_RETRIES {
                        tracing::warn!(
                            channel_id = %channel_id,
                            status,
                            "Giving up on sending message"
                        );
                        return Err(SendError::Status { status });
                    }
                    tracing::warn!(
                        channel_id = %channel_id,
                        status,
                        attempt,
                        "Non-success response, retrying"
                    );
                }
                Err(e) => {
                    if attempt >= SEND_RETRIES {
                        tracing::warn!(
                            channel_id = %channel_id,
                            error = %e,
                            "Giving up on sending message"
                        );
                        return Err(SendError::Request(e.to_string()));
                    }
                    tracing::warn!(channel_id = %channel_id, error = %e, attempt, "Send failed, retrying");
                }
            }

            attempt += 1;
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }
}

#[async_trait]
impl MessageSender for RestMessageSender {
    async fn send_message(&self, channel_id: Snowflake, content: &str) -> Result<(), SendError> {
        if content.is_empty() {
            tracing::warn!(channel_id = %channel_id, "Refusing to send empty message");
            return Err(SendError::Empty);
        }
        if content.len() > MESSAGE_LIMIT * 2 {
            tracing::warn!(
                channel_id = %channel_id,
                len = content.len(),
                "Refusing to send oversized message"
            );
            return Err(SendError::TooLong { len: content.len() });
        }

        if content.len() > MESSAGE_LIMIT {
            let (first, second) = split_at_boundary(content, MESSAGE_LIMIT);
            self.post_chunk(channel_id, first).await?;
            tokio::time::sleep(SPLIT_DELAY).await;
            return self.post_chunk(channel_id, second).await;
        }

        self.post_chunk(channel_id, content).await
    }
}

/// Split at the largest char boundary not exceeding `limit` bytes
fn split_at_boundary(content: &str, limit: usize) -> (&str, &str) {
    let mut index = limit.min(content.len());
    while !content.is_char_boundary(index) {
        index -= 1;
    }
    content.split_at(index)
}
