//! # trivia-gateway
//!
//! The gateway client: connection lifecycle, heartbeat, dispatch routing
//! into the entity cache, chat command routing, and the REST message sender.

pub mod client;
pub mod commands;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod rest;
pub mod sandbox;

pub use client::{run, GatewayDeps};
pub use error::GatewayError;
