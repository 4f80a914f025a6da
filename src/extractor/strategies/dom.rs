// Rendered-DOM strategy - reads media element attributes once client-side
// rendering has had time to run
//
// blob: sources reference browser-internal object storage and cannot be
// fetched by an external HTTP client. Finding only a blob URL is a miss, so
// the sniffing stage gets its turn at the real stream.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;

use crate::extractor::browser::BrowserSession;
use crate::extractor::errors::ExtractError;
use crate::extractor::models::{MediaCandidate, MediaKind, StrategySource};
use crate::extractor::traits::ExtractStrategy;

/// Time given to client-side script to populate media elements
const RENDER_SETTLE: Duration = Duration::from_secs(4);

pub struct DomStrategy;

impl DomStrategy {
    pub fn new() -> Self {
        Self
    }

    async fn inspect(page: &Page) -> Option<MediaCandidate> {
        if let Some(src) = video_source(page).await {
            if src.starts_with("blob:") {
                eprintln!("[Dom] Video source is a blob URL, not fetchable externally");
                return None;
            }
            return Some(MediaCandidate::new(
                src,
                MediaKind::Video,
                StrategySource::RenderedDom,
            ));
        }

        if has_video_element(page).await {
            // The post is a video whose player exposes no usable src; let
            // the sniffer find the stream instead of settling for a poster
            // image.
            return None;
        }

        content_image(page)
            .await
            .map(|src| MediaCandidate::new(src, MediaKind::Image, StrategySource::RenderedDom))
    }
}

impl Default for DomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// First non-empty src on the video element, falling back to its first
/// `<source>` child
async fn video_source(page: &Page) -> Option<String> {
    for selector in ["video", "video source"] {
        if let Ok(element) = page.find_element(selector).await {
            if let Ok(Some(src)) = element.attribute("src").await {
                if !src.is_empty() {
                    return Some(src);
                }
            }
        }
    }
    None
}

async fn has_video_element(page: &Page) -> bool {
    page.find_element("video").await.is_ok()
}

/// First plausible content image: an http(s) source that is not an obvious
/// icon or vector asset
async fn content_image(page: &Page) -> Option<String> {
    let elements = page.find_elements("img").await.ok()?;
    for element in elements {
        if let Ok(Some(src)) = element.attribute("src").await {
            if src.starts_with("http") && !src.ends_with(".svg") {
                return Some(src);
            }
        }
    }
    None
}

#[async_trait]
impl ExtractStrategy for DomStrategy {
    fn name(&self) -> &'static str {
        "rendered-dom"
    }

    async fn extract(&self, post_url: &str) -> Result<Option<MediaCandidate>, ExtractError> {
        let session = BrowserSession::launch().await?;

        let outcome: Result<Option<MediaCandidate>, ExtractError> = async {
            session.goto(post_url).await?;
            tokio::time::sleep(RENDER_SETTLE).await;
            Ok(Self::inspect(session.page()).await)
        }
        .await;

        session.shutdown().await;
        outcome
    }
}
