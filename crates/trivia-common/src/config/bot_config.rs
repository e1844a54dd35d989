//! Bot configuration
//!
//! Loads configuration from environment variables (with `.env` support).
//! Only the authentication token is required; everything else has a default.

use std::env;
use std::time::Duration;

use trivia_core::Snowflake;

/// Main bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Authentication token sent in the Identify payload
    pub token: String,
    /// User ID of the bot owner, if configured
    pub owner_id: Option<Snowflake>,
    /// Gateway WebSocket URL
    pub gateway_url: String,
    /// Base URL for the REST API (message sending)
    pub api_base_url: String,
    /// Command prefix recognized at the start of a message
    pub command_prefix: String,
    /// Path of the SQLite database file
    pub database_path: String,
    /// Questions asked per game when no count argument is given
    pub default_question_count: u32,
    /// Seconds between hint reveals when no delay argument is given
    pub default_hint_interval_secs: u64,
    /// Reconnect attempts before giving up on the gateway
    pub reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,
}

// Default value functions
fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=5&encoding=json".to_string()
}

fn default_api_base_url() -> String {
    "https://discordapp.com/api".to_string()
}

fn default_command_prefix() -> String {
    "`".to_string()
}

fn default_database_path() -> String {
    "db/trivia.db".to_string()
}

fn default_question_count() -> u32 {
    10
}

fn default_hint_interval_secs() -> u64 {
    10
}

fn default_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            token: env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingVar("BOT_TOKEN"))?,
            owner_id: env::var("BOT_OWNER_ID")
                .ok()
                .map(|s| {
                    s.parse::<Snowflake>()
                        .map_err(|_| ConfigError::InvalidValue("BOT_OWNER_ID", s))
                })
                .transpose()?,
            gateway_url: env::var("GATEWAY_URL").unwrap_or_else(|_| default_gateway_url()),
            api_base_url: env::var("API_BASE_URL").unwrap_or_else(|_| default_api_base_url()),
            command_prefix: env::var("COMMAND_PREFIX")
                .unwrap_or_else(|_| default_command_prefix()),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| default_database_path()),
            default_question_count: env::var("TRIVIA_QUESTION_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_question_count),
            default_hint_interval_secs: env::var("TRIVIA_HINT_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_hint_interval_secs),
            reconnect_attempts: env::var("RECONNECT_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_reconnect_attempts),
            reconnect_delay: Duration::from_secs(
                env::var("RECONNECT_DELAY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_reconnect_delay_secs),
            ),
        })
    }

    /// Default hint interval as a [`Duration`]
    #[must_use]
    pub fn default_hint_interval(&self) -> Duration {
        Duration::from_secs(self.default_hint_interval_secs)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_command_prefix(), "`");
        assert_eq!(default_question_count(), 10);
        assert_eq!(default_hint_interval_secs(), 10);
        assert_eq!(default_reconnect_attempts(), 5);
        assert!(default_gateway_url().starts_with("wss://"));
    }

    #[test]
    fn test_hint_interval_duration() {
        let config = BotConfig {
            token: "t".into(),
            owner_id: None,
            gateway_url: default_gateway_url(),
            api_base_url: default_api_base_url(),
            command_prefix: default_command_prefix(),
            database_path: default_database_path(),
            default_question_count: 10,
            default_hint_interval_secs: 7,
            reconnect_attempts: 5,
            reconnect_delay: Duration::from_secs(5),
        };
        assert_eq!(config.default_hint_interval(), Duration::from_secs(7));
    }
}
