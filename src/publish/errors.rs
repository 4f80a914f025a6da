// Error types for the publishing layer

use std::fmt;

use super::MAX_UPLOAD_BYTES;

#[derive(Debug)]
pub enum PublishError {
    /// The GitHub API rejected the call; status preserved for the caller
    Api { status: u16, message: String },

    /// Transport-level failure talking to the API
    Request(String),

    /// The API answered with an unexpected shape
    InvalidResponse(String),

    /// Object exceeds the contents-API size ceiling
    TooLarge { size: usize },
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api { status, message } => {
                write!(f, "GitHub API error: HTTP {} ({})", status, message.trim())
            }
            Self::Request(msg) => write!(f, "GitHub request failed: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Unexpected GitHub response: {}", msg),
            Self::TooLarge { size } => write!(
                f,
                "File is {} MB; the contents API caps uploads at {} MB. \
                 Use LFS or another host for this one.",
                size / (1024 * 1024),
                MAX_UPLOAD_BYTES / (1024 * 1024)
            ),
        }
    }
}

impl std::error::Error for PublishError {}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.to_string())
    }
}
