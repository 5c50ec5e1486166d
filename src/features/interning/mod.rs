//! # Set Interning
//!
//! Hash-consed storage for points-to sets. Every distinct set value lives
//! exactly once in a [`PersistentPointsToCache`] and is named by a small
//! [`PointsToId`]; union, intersection and complement are memoised on ID
//! pairs. The stores in [`features::points_to`](crate::features::points_to)
//! keep only IDs and route every set operation through here.

pub mod domain;
pub mod infrastructure;

pub use domain::{NodeId, PointsToId, PointsToSet, SparseNodeSet};
pub use infrastructure::{CacheStats, OpCounters, PersistentPointsToCache, SharedPointsToCache};
