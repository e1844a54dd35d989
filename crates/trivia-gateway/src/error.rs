//! Gateway-level errors

use thiserror::Error;

/// Errors that end the client run loop
///
/// Everything else (malformed frames, failed sends, store hiccups, broken
/// games) is logged and contained; only transport exhaustion surfaces here.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("reconnect attempts exhausted after {attempts} tries")]
    ReconnectExhausted { attempts: u32 },
}
