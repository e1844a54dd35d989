//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.
//! `RUST_LOG` wins when set; otherwise the configured level applies.

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter (e.g., "info", "debug", "trace")
    pub level: Level,
    /// Enable JSON output format
    pub json: bool,
    /// Include file and line numbers
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            file_line: true,
        }
    }
}

impl TracingConfig {
    /// Create a production configuration with JSON logging
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json: true,
            file_line: false,
        }
    }
}

/// Initialize the tracing subscriber with default configuration
///
/// # Panics
/// Panics if a subscriber is already set.
pub fn init_tracing() {
    let config = TracingConfig::default();
    build(config).init();
}

/// Try to initialize tracing; does not panic if already initialized
pub fn try_init_tracing() -> Result<(), TracingError> {
    let config = TracingConfig::default();
    build(config)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

fn build(
    config: TracingConfig,
) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    if config.json {
        Box::new(
            tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .json()
                    .with_file(config.file_line)
                    .with_line_number(config.file_line),
            ),
        )
    } else {
        Box::new(
            tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .with_file(config.file_line)
                    .with_line_number(config.file_line),
            ),
        )
    }
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
