//! Infrastructure for set interning: the persistent points-to cache and
//! the shared handle stores hold on to it.

pub mod cache;

pub use cache::{CacheStats, OpCounters, PersistentPointsToCache, SharedPointsToCache};
