// Extraction strategy trait

use async_trait::async_trait;

use super::errors::ExtractError;
use super::models::MediaCandidate;

/// One rung of the fallback ladder. `Ok(None)` means "nothing here, try the
/// next strategy" and is the expected outcome for most pages, not an error.
#[async_trait]
pub trait ExtractStrategy: Send + Sync {
    /// Name of the strategy (for logging)
    fn name(&self) -> &'static str;

    /// Inspect the post page and return a candidate when one is found
    async fn extract(&self, post_url: &str) -> Result<Option<MediaCandidate>, ExtractError>;
}
