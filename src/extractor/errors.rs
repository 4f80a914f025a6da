// Error types for the extraction pipeline

use std::fmt;

#[derive(Debug, Clone)]
pub enum ExtractError {
    /// No controllable browser could be launched (environment problem,
    /// not a content problem)
    BrowserUnavailable(String),

    /// A strategy failed internally; the orchestrator treats this as a miss
    /// and moves on to the next strategy
    StageFailed(String),

    /// Transport-level failure while downloading
    RequestFailed(String),

    /// Terminal HTTP failure after the sanitize/retry cycle
    DownloadFailed { status: u16 },

    /// Every strategy was exhausted without producing a candidate
    AllStrategiesFailed,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrowserUnavailable(msg) => {
                write!(f, "No usable browser available: {}", msg)
            }
            Self::StageFailed(msg) => write!(f, "Extraction stage failed: {}", msg),
            Self::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            Self::DownloadFailed { status } => write!(f, "Download failed: HTTP {}", status),
            Self::AllStrategiesFailed => write!(
                f,
                "Could not extract media from this post; it does not appear \
                 to be publicly reachable from this host"
            ),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<reqwest::Error> for ExtractError {
    fn from(e: reqwest::Error) -> Self {
        Self::RequestFailed(e.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for ExtractError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Self::StageFailed(e.to_string())
    }
}
