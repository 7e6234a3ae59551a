//! Cache Module
//!
//! Per-direction memoization of engine output, keyed on formula text plus
//! normalized options, with LRU eviction.

mod key;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use key::{BackwardKey, ForwardKey, Normalize};
pub use lru::LruList;
pub use stats::CacheStats;
pub use store::ConversionCache;
