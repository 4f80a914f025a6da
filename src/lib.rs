// reel-publisher - resolves the real media URL behind a public post page,
// downloads it, and publishes it to a GitHub repository acting as a feed host

pub mod config;
pub mod extractor;
pub mod publish;
