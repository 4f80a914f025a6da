// Resolution orchestrator - ordered strategy fallback
//
// Strategy order:
// 1. Raw markup scan (no browser, cheapest)
// 2. Rendered DOM inspection (one browser launch, one element read)
// 3. Network sniffing (browser launch plus full traffic capture)
//
// A stage miss, a blob-only result, or an internal stage error all advance
// to the next stage. Only a missing browser aborts the resolution early,
// since the remaining stages need one too.

use super::errors::ExtractError;
use super::models::MediaCandidate;
use super::strategies::{DomStrategy, MarkupStrategy, SniffStrategy};
use super::traits::ExtractStrategy;

pub struct MediaResolver {
    strategies: Vec<Box<dyn ExtractStrategy>>,
}

impl MediaResolver {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Standard ladder: markup, then rendered DOM, then network sniffing
    pub fn with_default_strategies(settle_seconds: u64) -> Self {
        let mut resolver = Self::new();
        resolver.add_strategy(Box::new(MarkupStrategy::new()));
        resolver.add_strategy(Box::new(DomStrategy::new()));
        resolver.add_strategy(Box::new(SniffStrategy::new(settle_seconds)));
        resolver
    }

    pub fn add_strategy(&mut self, strategy: Box<dyn ExtractStrategy>) {
        self.strategies.push(strategy);
    }

    /// Run the strategies in order, returning the first usable candidate
    pub async fn resolve(&self, post_url: &str) -> Result<MediaCandidate, ExtractError> {
        for strategy in &self.strategies {
            eprintln!("[Resolver] Trying strategy: {}", strategy.name());

            match strategy.extract(post_url).await {
                Ok(Some(candidate)) if candidate.is_blob() => {
                    eprintln!(
                        "[Resolver] ✗ {} found only a blob URL, not fetchable externally",
                        strategy.name()
                    );
                }
                Ok(Some(candidate)) => {
                    eprintln!(
                        "[Resolver] ✓ {} found {}: {}",
                        strategy.name(),
                        candidate.kind,
                        candidate.url
                    );
                    return Ok(candidate);
                }
                Ok(None) => {
                    eprintln!("[Resolver] ✗ {} found nothing", strategy.name());
                }
                Err(ExtractError::BrowserUnavailable(msg)) => {
                    return Err(ExtractError::BrowserUnavailable(msg));
                }
                Err(e) => {
                    eprintln!("[Resolver] ✗ {} failed: {}", strategy.name(), e);
                }
            }
        }

        Err(ExtractError::AllStrategiesFailed)
    }
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::{MediaKind, StrategySource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum StubOutcome {
        Found(&'static str),
        Miss,
        Fail,
        NoBrowser,
    }

    struct StubStrategy {
        label: &'static str,
        outcome: StubOutcome,
        calls: Arc<AtomicUsize>,
    }

    fn stub(label: &'static str, outcome: StubOutcome) -> (Box<StubStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Box::new(StubStrategy {
            label,
            outcome,
            calls: calls.clone(),
        });
        (strategy, calls)
    }

    #[async_trait]
    impl ExtractStrategy for StubStrategy {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn extract(
            &self,
            _post_url: &str,
        ) -> Result<Option<MediaCandidate>, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                StubOutcome::Found(url) => Ok(Some(MediaCandidate::new(
                    *url,
                    MediaKind::Video,
                    StrategySource::NetworkSniff,
                ))),
                StubOutcome::Miss => Ok(None),
                StubOutcome::Fail => Err(ExtractError::StageFailed("boom".to_string())),
                StubOutcome::NoBrowser => Err(ExtractError::BrowserUnavailable(
                    "no executable".to_string(),
                )),
            }
        }
    }

    #[tokio::test]
    async fn test_first_hit_short_circuits() {
        let (first, _) = stub("first", StubOutcome::Found("https://cdn/a.mp4"));
        let (second, second_calls) = stub("second", StubOutcome::Found("https://cdn/b.mp4"));

        let mut resolver = MediaResolver::new();
        resolver.add_strategy(first);
        resolver.add_strategy(second);

        let found = resolver.resolve("https://example.com/p/1").await.unwrap();
        assert_eq!(found.url, "https://cdn/a.mp4");
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blob_candidate_falls_through_to_sniffing() {
        let (markup, _) = stub("markup", StubOutcome::Fail);
        let (dom, dom_calls) = stub("dom", StubOutcome::Found("blob:https://page/xyz"));
        let (sniff, sniff_calls) = stub("sniff", StubOutcome::Found("https://cdn/real.mp4"));

        let mut resolver = MediaResolver::new();
        resolver.add_strategy(markup);
        resolver.add_strategy(dom);
        resolver.add_strategy(sniff);

        let found = resolver.resolve("https://example.com/p/1").await.unwrap();
        assert_eq!(found.url, "https://cdn/real.mp4");
        assert_eq!(dom_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sniff_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stage_error_is_absorbed() {
        let (broken, _) = stub("broken", StubOutcome::Fail);
        let (working, _) = stub("working", StubOutcome::Found("https://cdn/a.mp4"));

        let mut resolver = MediaResolver::new();
        resolver.add_strategy(broken);
        resolver.add_strategy(working);

        let found = resolver.resolve("https://example.com/p/1").await.unwrap();
        assert_eq!(found.url, "https://cdn/a.mp4");
    }

    #[tokio::test]
    async fn test_exhaustion_reports_failure() {
        let (a, a_calls) = stub("a", StubOutcome::Miss);
        let (b, b_calls) = stub("b", StubOutcome::Miss);
        let (c, c_calls) = stub("c", StubOutcome::Miss);

        let mut resolver = MediaResolver::new();
        resolver.add_strategy(a);
        resolver.add_strategy(b);
        resolver.add_strategy(c);

        let result = resolver.resolve("https://example.com/p/1").await;
        assert!(matches!(result, Err(ExtractError::AllStrategiesFailed)));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_browser_aborts_early() {
        let (first, _) = stub("first", StubOutcome::NoBrowser);
        let (second, second_calls) = stub("second", StubOutcome::Found("https://cdn/a.mp4"));

        let mut resolver = MediaResolver::new();
        resolver.add_strategy(first);
        resolver.add_strategy(second);

        let result = resolver.resolve("https://example.com/p/1").await;
        assert!(matches!(result, Err(ExtractError::BrowserUnavailable(_))));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }
}
