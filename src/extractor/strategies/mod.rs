// Extraction strategies, cheapest first

pub mod dom;
pub mod markup;
pub mod sniff;

pub use dom::DomStrategy;
pub use markup::MarkupStrategy;
pub use sniff::{SniffStrategy, DEFAULT_SETTLE_SECONDS};
