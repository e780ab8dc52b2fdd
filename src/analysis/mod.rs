//! Chat analysis modules.
//!
//! `text` holds the per-message text helpers; `aggregator` walks the whole
//! export and produces the statistics.

pub mod aggregator;
pub mod text;

pub use aggregator::*;
pub use text::Normalizer;
