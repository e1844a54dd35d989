//! # trivia-common
//!
//! Shared utilities: configuration loading and tracing setup.

pub mod config;
pub mod telemetry;

pub use config::{BotConfig, ConfigError};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig};
