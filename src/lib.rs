//! # pta-store: Persistent Points-To Data Stores
//!
//! Hash-consed points-to storage for static pointer analysis. A points-to
//! analysis associates every pointer — and, flow-sensitively, every pointer
//! at every program location — with a set of abstract memory objects. Those
//! sets are numerous, repetitive, and merged millions of times on the way
//! to a fixed point; this crate makes that cheap:
//!
//! - Every distinct set value is interned exactly once and named by a small
//!   [`PointsToId`]. Set equality is integer equality.
//! - Union, intersection and complement are memoised on ID pairs, so
//!   repeated work collapses to a hash lookup.
//! - The stores expose points-to semantics (per-key maps, diffs,
//!   flow-sensitive IN/OUT state, incremental change tracking, versioned
//!   namespaces) while performing almost no set copies.
//!
//! ## Usage
//!
//! ```
//! use pta_store::{BasePointsToStore, SharedPointsToCache, SparseNodeSet};
//!
//! let cache = SharedPointsToCache::<SparseNodeSet>::new();
//! let mut store: BasePointsToStore<u32, _> = BasePointsToStore::new(cache, true);
//!
//! store.add_pts(1, 100);
//! store.add_pts(1, 101);
//! store.add_pts(2, 100);
//! assert!(store.union_pts(2, &1)); // {100,101} ∪ {100} strictly grows
//!
//! // Equal sets are interned once; both keys now share the ID.
//! assert_eq!(store.pts_id(&1), store.pts_id(&2));
//! assert!(store.get_rev_pts(100).contains(&1));
//! ```
//!
//! ## Components
//!
//! - [`features::interning`]: the cache and the [`PointsToSet`] plug-in
//!   seam ([`SparseNodeSet`] is the default representation).
//! - [`features::points_to`]: the store family and its polymorphic
//!   [`PointsToData`] surface.
//!
//! The crate is a library for a single-threaded solver; it has no wire
//! format, no persistence, and never reclaims interned sets during a run.

pub mod errors;
pub mod features;

pub use errors::StoreError;
pub use features::interning::{
    CacheStats, NodeId, OpCounters, PersistentPointsToCache, PointsToId, PointsToSet,
    SharedPointsToCache, SparseNodeSet,
};
pub use features::points_to::{
    BasePointsToStore, DataFlowPointsToStore, DiffPointsToStore,
    IncrementalDataFlowPointsToStore, PointsToData, SetUsage, StoreConfig, StoreFactory,
    StoreKind, VersionedPointsToStore,
};
