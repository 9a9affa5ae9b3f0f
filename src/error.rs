use std::io;

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid checkpoint: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<reqwest::Error> for HarvestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HarvestError::Timeout
        } else {
            HarvestError::Transport(err)
        }
    }
}

impl From<serde_json::Error> for HarvestError {
    fn from(err: serde_json::Error) -> Self {
        HarvestError::Serialization(err.to_string())
    }
}

/// Coarse classification of a per-item failure, kept next to the message in
/// the failure log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemErrorKind {
    HttpStatus(u16),
    Timeout,
    Transport,
    Payload,
    Other,
}

impl From<&HarvestError> for ItemErrorKind {
    fn from(err: &HarvestError) -> Self {
        match err {
            HarvestError::HttpStatus { status, .. } => ItemErrorKind::HttpStatus(*status),
            HarvestError::Timeout => ItemErrorKind::Timeout,
            HarvestError::Transport(_) => ItemErrorKind::Transport,
            HarvestError::UnexpectedPayload(_) | HarvestError::Serialization(_) => {
                ItemErrorKind::Payload
            }
            _ => ItemErrorKind::Other,
        }
    }
}

pub type Result<T, E = HarvestError> = std::result::Result<T, E>;
