//! Cache Module
//!
//! Provides the bounded in-memory record cache with freshness expiration and
//! LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{normalize_key, WeatherCache};
