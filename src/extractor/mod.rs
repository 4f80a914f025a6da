// Extraction module - resolves a post page to a downloadable media URL

pub mod browser;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod orchestrator;
pub mod sanitize;
pub mod strategies;
pub mod traits;

pub use errors::ExtractError;
pub use fetch::MediaFetcher;
pub use models::{FetchedMedia, MediaCandidate, MediaKind, StrategySource};
pub use orchestrator::MediaResolver;
pub use traits::ExtractStrategy;
