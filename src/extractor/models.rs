// Common data models for the extraction pipeline

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which strategy produced a candidate (for logging and diagnostics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategySource {
    /// Raw page markup, no script execution
    Markup,
    /// Headless-browser DOM after client-side rendering
    RenderedDom,
    /// Network traffic observed during a headless-browser session
    NetworkSniff,
}

impl fmt::Display for StrategySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup => write!(f, "markup"),
            Self::RenderedDom => write!(f, "rendered-dom"),
            Self::NetworkSniff => write!(f, "network-sniff"),
        }
    }
}

/// Media classification; decides the target file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// Classification taken from a download's declared content type.
    /// The declared type is verified by the origin, so it wins over a
    /// strategy's guess when the two disagree.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.to_ascii_lowercase();
        if ct.starts_with("video/") {
            Some(Self::Video)
        } else if ct.starts_with("image/") {
            Some(Self::Image)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// A resolved (URL, kind) pair believed to reference the downloadable asset
#[derive(Debug, Clone)]
pub struct MediaCandidate {
    pub url: String,
    pub kind: MediaKind,
    pub source: StrategySource,
}

impl MediaCandidate {
    pub fn new(url: impl Into<String>, kind: MediaKind, source: StrategySource) -> Self {
        Self {
            url: url.into(),
            kind,
            source,
        }
    }

    /// Browser-internal object references cannot be fetched by an external
    /// HTTP client
    pub fn is_blob(&self) -> bool {
        self.url.starts_with("blob:")
    }
}

/// Bytes plus response metadata from a completed download
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub status: u16,
}

impl FetchedMedia {
    /// Final classification: the declared content type when it is
    /// recognizable, the strategy's guess otherwise
    pub fn kind_or(&self, fallback: MediaKind) -> MediaKind {
        MediaKind::from_content_type(&self.content_type).unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(
            MediaKind::from_content_type("video/mp4"),
            Some(MediaKind::Video)
        );
        assert_eq!(
            MediaKind::from_content_type("Image/JPEG"),
            Some(MediaKind::Image)
        );
        assert_eq!(MediaKind::from_content_type("text/html"), None);
        assert_eq!(MediaKind::from_content_type(""), None);
    }

    #[test]
    fn test_declared_type_overrides_strategy_guess() {
        let fetched = FetchedMedia {
            bytes: Vec::new(),
            content_type: "image/jpeg".to_string(),
            status: 200,
        };
        assert_eq!(fetched.kind_or(MediaKind::Video), MediaKind::Image);

        let unknown = FetchedMedia {
            bytes: Vec::new(),
            content_type: "application/octet-stream".to_string(),
            status: 200,
        };
        assert_eq!(unknown.kind_or(MediaKind::Video), MediaKind::Video);
    }

    #[test]
    fn test_blob_detection() {
        let blob = MediaCandidate::new(
            "blob:https://example.com/abc",
            MediaKind::Video,
            StrategySource::RenderedDom,
        );
        assert!(blob.is_blob());

        let direct = MediaCandidate::new(
            "https://cdn.example.com/clip.mp4",
            MediaKind::Video,
            StrategySource::RenderedDom,
        );
        assert!(!direct.is_blob());
    }
}
