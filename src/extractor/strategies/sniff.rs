// Network-sniffing strategy - records every media-looking URL the page
// touches, then picks the best candidate
//
// Candidate ranking: a direct video file beats a streaming playlist, and
// among video files the one with the shortest query string wins. Long query
// strings tend to carry partial-range parameters, so the shortest is the
// most likely to reference the whole asset.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventRequestWillBeSent, EventResponseReceived,
};
use chromiumoxide::Page;
use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;

use crate::extractor::browser::BrowserSession;
use crate::extractor::errors::ExtractError;
use crate::extractor::models::{MediaCandidate, MediaKind, StrategySource};
use crate::extractor::traits::ExtractStrategy;

/// Hostname fragments of CDNs known to serve post media
const MEDIA_HOST_HINTS: [&str; 2] = ["fbcdn", "cdninstagram"];

/// Selectors worth a click to coax the player into loading its stream
const PLAY_SELECTORS: [&str; 4] = [
    "video",
    "button[aria-label='Play']",
    ".vjs-big-play-button",
    "[autoplay]",
];

/// Cap on the wait for network activity to quiet down; pages that stream
/// forever simply run into it
const QUIET_WAIT_LIMIT: Duration = Duration::from_secs(3);

const QUIET_POLL: Duration = Duration::from_millis(250);

/// Default extra settle after the quiet wait, catching late-starting media
/// requests
pub const DEFAULT_SETTLE_SECONDS: u64 = 8;

/// The selection decision plus the full observation set for diagnostics
pub struct SniffOutcome {
    pub candidate: Option<MediaCandidate>,
    pub observed: Vec<String>,
}

/// Insertion-ordered set of observed media URLs, deduplicated by exact
/// match. `events` counts all traffic so quiet detection sees non-media
/// requests too.
#[derive(Default)]
struct TrafficLog {
    seen: HashSet<String>,
    ordered: Vec<String>,
    events: u64,
}

impl TrafficLog {
    fn record(&mut self, url: &str) {
        self.events += 1;
        if is_media_like(url) && self.seen.insert(url.to_string()) {
            self.ordered.push(url.to_string());
        }
    }
}

fn is_media_like(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains(".mp4")
        || lower.contains(".m3u8")
        || (MEDIA_HOST_HINTS.iter().any(|hint| lower.contains(hint))
            && (lower.contains("video") || lower.contains(".mp4")))
}

fn query_len(url: &str) -> usize {
    url.split_once('?').map(|(_, q)| q.len()).unwrap_or(0)
}

/// Pick the best candidate: any video file over any playlist; among video
/// files, the shortest query string; the first-seen playlist otherwise
pub fn select_candidate(observed: &[String]) -> Option<(String, MediaKind)> {
    let best_video = observed
        .iter()
        .filter(|url| url.to_ascii_lowercase().contains(".mp4"))
        .min_by_key(|url| query_len(url));
    if let Some(url) = best_video {
        return Some((url.clone(), MediaKind::Video));
    }

    observed
        .iter()
        .find(|url| url.to_ascii_lowercase().contains(".m3u8"))
        .map(|url| (url.clone(), MediaKind::Video))
}

pub struct SniffStrategy {
    settle: Duration,
}

impl SniffStrategy {
    pub fn new(settle_seconds: u64) -> Self {
        Self {
            settle: Duration::from_secs(settle_seconds),
        }
    }

    /// Run the full sniffing pass. The observation set comes back even when
    /// no candidate is selected, so callers can surface what the page
    /// actually loaded.
    pub async fn sniff(&self, post_url: &str) -> Result<SniffOutcome, ExtractError> {
        let session = BrowserSession::launch().await?;
        let log = Arc::new(Mutex::new(TrafficLog::default()));

        let result = self.observe(&session, post_url, &log).await;
        session.shutdown().await;
        result?;

        let observed = match log.lock() {
            Ok(mut guard) => std::mem::take(&mut guard.ordered),
            Err(_) => Vec::new(),
        };
        eprintln!("[Sniffer] Observed {} media-like URLs", observed.len());

        let candidate = select_candidate(&observed)
            .map(|(url, kind)| MediaCandidate::new(url, kind, StrategySource::NetworkSniff));
        Ok(SniffOutcome {
            candidate,
            observed,
        })
    }

    async fn observe(
        &self,
        session: &BrowserSession,
        post_url: &str,
        log: &Arc<Mutex<TrafficLog>>,
    ) -> Result<(), ExtractError> {
        let page = session.page();
        page.execute(EnableParams::default()).await?;

        // Observers must be live before navigation or early media requests
        // are lost.
        let mut collectors = Vec::new();
        let requests = page.event_listener::<EventRequestWillBeSent>().await?;
        collectors.push(spawn_collector(requests, log.clone(), |event| {
            event.request.url.clone()
        }));
        let responses = page.event_listener::<EventResponseReceived>().await?;
        collectors.push(spawn_collector(responses, log.clone(), |event| {
            event.response.url.clone()
        }));

        let navigated = session.goto(post_url).await;
        if navigated.is_ok() {
            for selector in PLAY_SELECTORS {
                // Best-effort: a missing play button is not an error.
                let _ = try_click(page, selector).await;
            }
            wait_for_quiet(log).await;
            tokio::time::sleep(self.settle).await;
        }

        for collector in collectors {
            collector.abort();
        }
        navigated
    }
}

impl Default for SniffStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_SECONDS)
    }
}

fn spawn_collector<T, F>(
    mut events: impl Stream<Item = Arc<T>> + Unpin + Send + 'static,
    log: Arc<Mutex<TrafficLog>>,
    url_of: F,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> String + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if let Ok(mut log) = log.lock() {
                log.record(&url_of(&event));
            }
        }
    })
}

/// Best-effort click; reports whether anything was actually clicked
async fn try_click(page: &Page, selector: &str) -> bool {
    match page.find_element(selector).await {
        Ok(element) => element.click().await.is_ok(),
        Err(_) => false,
    }
}

/// Wait until no new traffic arrives between polls, bounded by
/// `QUIET_WAIT_LIMIT`. The bound expiring is normal for pages that never go
/// idle.
async fn wait_for_quiet(log: &Arc<Mutex<TrafficLog>>) {
    let started = tokio::time::Instant::now();
    let mut last_seen = log.lock().map(|l| l.events).unwrap_or(0);
    while started.elapsed() < QUIET_WAIT_LIMIT {
        tokio::time::sleep(QUIET_POLL).await;
        let now_seen = log.lock().map(|l| l.events).unwrap_or(last_seen);
        if now_seen == last_seen {
            return;
        }
        last_seen = now_seen;
    }
}

#[async_trait]
impl ExtractStrategy for SniffStrategy {
    fn name(&self) -> &'static str {
        "network-sniff"
    }

    async fn extract(&self, post_url: &str) -> Result<Option<MediaCandidate>, ExtractError> {
        let outcome = self.sniff(post_url).await?;
        if outcome.candidate.is_none() {
            for url in &outcome.observed {
                eprintln!("[Sniffer]   observed: {}", url);
            }
        }
        Ok(outcome.candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_shortest_query_mp4_wins() {
        let observed = urls(&[
            "https://cdn/a.mp4?x=1&y=2",
            "https://cdn/b.mp4?x=1",
            "https://cdn/c.m3u8",
        ]);
        let (url, kind) = select_candidate(&observed).unwrap();
        assert_eq!(url, "https://cdn/b.mp4?x=1");
        assert_eq!(kind, MediaKind::Video);
    }

    #[test]
    fn test_playlist_fallback_keeps_first_seen() {
        let observed = urls(&["https://cdn/late.m3u8", "https://cdn/later.m3u8"]);
        let (url, _) = select_candidate(&observed).unwrap();
        assert_eq!(url, "https://cdn/late.m3u8");
    }

    #[test]
    fn test_empty_observation_set_selects_nothing() {
        assert!(select_candidate(&[]).is_none());
    }

    #[test]
    fn test_media_like_heuristics() {
        assert!(is_media_like("https://cdn/clip.MP4?x=1"));
        assert!(is_media_like("https://cdn/stream.m3u8"));
        assert!(is_media_like("https://scontent.fbcdn.net/v/t2/video-file"));
        assert!(!is_media_like("https://scontent.fbcdn.net/v/t2/profile.jpg"));
        assert!(!is_media_like("https://example.com/page.html"));
    }

    #[test]
    fn test_traffic_log_dedupes_in_first_seen_order() {
        let mut log = TrafficLog::default();
        log.record("https://cdn/a.mp4");
        log.record("https://example.com/page.html");
        log.record("https://cdn/b.mp4");
        log.record("https://cdn/a.mp4");

        assert_eq!(log.ordered, urls(&["https://cdn/a.mp4", "https://cdn/b.mp4"]));
        assert_eq!(log.events, 4);
    }
}
