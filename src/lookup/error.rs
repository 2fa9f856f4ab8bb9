//! Lookup failure taxonomy

use thiserror::Error;

/// Why a lookup produced no value.
///
/// None of these reach lookup callers: every variant resolves to the empty
/// value, or to no callback at all for `Cancelled`. Queries too short to look
/// up never get this far; the gate in [`crate::query`] turns them away.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No usable provider credential
    #[error("provider credential not configured")]
    Unavailable,

    /// Provider answered with a non-2xx status
    #[error("HTTP error: {0}")]
    Status(u16),

    /// Request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),

    /// Response body was not the expected JSON
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Superseded by a newer query
    #[error("lookup cancelled")]
    Cancelled,
}

impl LookupError {
    /// Status, transport and decode failures
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Status(_) | Self::Transport(_) | Self::Decode(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Transport(err.to_string()),
        }
    }
}

pub type LookupResult<T> = std::result::Result<T, LookupError>;
