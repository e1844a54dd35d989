//! Domain errors - enumerated error kinds for collaborator boundaries
//!
//! Errors here are always local to one operation: a failed store access
//! fails that access, a failed send drops that message. Nothing in this
//! module is ever process-fatal.

use thiserror::Error;

/// Errors from the persistent stores (questions, scores, custom scripts)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("malformed record: {0}")]
    Corrupt(String),
}

/// Errors from the outbound message sender
#[derive(Debug, Error)]
pub enum SendError {
    #[error("refusing to send an empty message")]
    Empty,

    #[error("message too long: {len} characters")]
    TooLong { len: usize },

    #[error("non-success response after retries: status {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Request(String),
}

impl SendError {
    /// Check if this failure came back from the remote end (as opposed to a
    /// message we refused to send locally)
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Request(_))
    }
}

/// Errors from the script sandbox
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("script execution failed: {0}")]
    Script(String),

    #[error("sandbox unavailable for guild")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_classification() {
        assert!(SendError::Status { status: 502 }.is_remote());
        assert!(SendError::Request("timed out".into()).is_remote());
        assert!(!SendError::Empty.is_remote());
        assert!(!SendError::TooLong { len: 9000 }.is_remote());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::Query("no such table: Questions".into());
        assert_eq!(err.to_string(), "query failed: no such table: Questions");

        let err = SendError::TooLong { len: 4096 };
        assert_eq!(err.to_string(), "message too long: 4096 characters");
    }
}
