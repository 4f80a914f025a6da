// Static markup strategy - scans the raw page HTML without running scripts
//
// The search order encodes the content policy: explicitly tagged video
// first, JSON-embedded video next, still-image fields last. Video is the
// primary content type the tool targets.

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::BROWSER_USER_AGENT;
use crate::extractor::models::{MediaCandidate, MediaKind, StrategySource};
use crate::extractor::traits::ExtractStrategy;

/// Page fetch may take this long; post pages can be slow to first byte
const PAGE_TIMEOUT: Duration = Duration::from_secs(60);

lazy_static! {
    static ref OG_VIDEO_RE: Regex = Regex::new(
        r#"(?i)<meta[^>]+property=["']og:video["'][^>]+content=["']([^"']+)["']"#
    )
    .unwrap();
    static ref OG_VIDEO_SECURE_RE: Regex = Regex::new(
        r#"(?i)<meta[^>]+property=["']og:video:secure_url["'][^>]+content=["']([^"']+)["']"#
    )
    .unwrap();
    static ref VIDEO_URL_RE: Regex =
        Regex::new(r#""video_url"\s*:\s*"([^"]+\.mp4[^"]*)""#).unwrap();
    static ref CONTENT_URL_RE: Regex =
        Regex::new(r#""contentUrl"\s*:\s*"([^"]+\.mp4[^"]*)""#).unwrap();
    static ref OG_IMAGE_RE: Regex = Regex::new(
        r#"(?i)<meta[^>]+property=["']og:image["'][^>]+content=["']([^"']+)["']"#
    )
    .unwrap();
    static ref DISPLAY_URL_RE: Regex = Regex::new(r#""display_url"\s*:\s*"([^"]+)""#).unwrap();
}

pub struct MarkupStrategy {
    client: Client,
}

impl MarkupStrategy {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent(BROWSER_USER_AGENT)
                .timeout(PAGE_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for MarkupStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// Search the markup in priority order. Pure over the text so the policy is
/// testable without a network.
pub fn find_media_in_markup(markup: &str) -> Option<(String, MediaKind)> {
    let video_patterns = [
        &*OG_VIDEO_RE,
        &*OG_VIDEO_SECURE_RE,
        &*VIDEO_URL_RE,
        &*CONTENT_URL_RE,
    ];
    for pattern in video_patterns {
        if let Some(m) = pattern.captures(markup).and_then(|c| c.get(1)) {
            return Some((unescape_entities(m.as_str()), MediaKind::Video));
        }
    }

    for pattern in [&*OG_IMAGE_RE, &*DISPLAY_URL_RE] {
        if let Some(m) = pattern.captures(markup).and_then(|c| c.get(1)) {
            return Some((unescape_entities(m.as_str()), MediaKind::Image));
        }
    }

    None
}

/// Minimal HTML entity unescape for URLs lifted out of markup. `&amp;` goes
/// last so already-escaped entities are not unescaped twice.
fn unescape_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl ExtractStrategy for MarkupStrategy {
    fn name(&self) -> &'static str {
        "markup"
    }

    async fn extract(&self, post_url: &str) -> Result<Option<MediaCandidate>, ExtractError> {
        // This strategy is one rung of a fallback ladder: any failure here,
        // network included, is a miss rather than an error.
        let response = match self.client.get(post_url).send().await {
            Ok(response) => response,
            Err(e) => {
                eprintln!("[Markup] Page fetch failed: {}", e);
                return Ok(None);
            }
        };
        if response.status().as_u16() >= 400 {
            return Ok(None);
        }
        let markup = match response.text().await {
            Ok(text) => text,
            Err(_) => return Ok(None),
        };

        Ok(find_media_in_markup(&markup)
            .map(|(url, kind)| MediaCandidate::new(url, kind, StrategySource::Markup)))
    }
}
