//! Persistent points-to cache
//!
//! Hash-consing backend shared by every store:
//! - Each distinct set value is interned exactly once and named by a
//!   [`PointsToId`]; ID 0 is the empty set.
//! - Union, intersection and complement are memoised on ID pairs, so the
//!   millionth identical merge is a single map lookup.
//! - Identity and empty-operand shortcuts resolve before the memo tables
//!   are consulted, keeping them sparse.
//!
//! [`SharedPointsToCache`] is the handle stores actually hold: all cache
//! calls are funnelled through one `Rc<RefCell<..>>` owner, which lets any
//! number of stores share a cache under the single-threaded solver.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::interning::domain::points_to_set::{PointsToId, PointsToSet};

/// Hit/miss accounting for one memoised operation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OpCounters {
    /// Resolved by an identity or empty-operand shortcut; no memo involved.
    pub shortcuts: u64,
    /// Answered from the memo table.
    pub hits: u64,
    /// Computed, interned, and memoised.
    pub misses: u64,
}

impl OpCounters {
    /// Total number of calls routed through this operation.
    #[inline]
    pub fn total(&self) -> u64 {
        self.shortcuts + self.hits + self.misses
    }
}

/// Snapshot of cache activity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Distinct sets interned, the empty set included.
    pub interned: u64,
    pub unions: OpCounters,
    pub intersections: OpCounters,
    pub complements: OpCounters,
}

/// Interning cache for points-to sets.
///
/// Owns every set ever produced during an analysis run. Sets are never
/// reclaimed; "mutation" anywhere above this layer means computing a new ID
/// here and overwriting a key→ID mapping there.
pub struct PersistentPointsToCache<S: PointsToSet> {
    /// ID → set. Index is the ID; slot 0 holds the empty set.
    id_to_set: Vec<S>,

    /// Set → ID, for dedup on intern.
    set_to_id: FxHashMap<S, PointsToId>,

    /// Memo tables keyed by ID pairs. Union and intersection are
    /// commutative and canonicalise the pair as (min, max); complement is
    /// ordered.
    union_memo: FxHashMap<(PointsToId, PointsToId), PointsToId>,
    intersect_memo: FxHashMap<(PointsToId, PointsToId), PointsToId>,
    complement_memo: FxHashMap<(PointsToId, PointsToId), PointsToId>,

    stats: CacheStats,
}

impl<S: PointsToSet> Default for PersistentPointsToCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PointsToSet> PersistentPointsToCache<S> {
    pub fn new() -> Self {
        let empty = S::default();
        let mut set_to_id = FxHashMap::default();
        set_to_id.insert(empty.clone(), PointsToId::EMPTY);

        Self {
            id_to_set: vec![empty],
            set_to_id,
            union_memo: FxHashMap::default(),
            intersect_memo: FxHashMap::default(),
            complement_memo: FxHashMap::default(),
            stats: CacheStats {
                interned: 1,
                ..CacheStats::default()
            },
        }
    }

    /// The ID of the empty set.
    #[inline]
    pub const fn empty_id() -> PointsToId {
        PointsToId::EMPTY
    }

    /// Number of interned sets (at least 1: the empty set).
    #[inline]
    pub fn len(&self) -> usize {
        self.id_to_set.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // the empty set is always interned
    }

    /// Intern `set` and return its ID. The empty set always maps to
    /// [`PointsToId::EMPTY`]; any other value gets a fresh ID on first
    /// sight and its existing ID afterwards.
    pub fn emplace(&mut self, set: S) -> PointsToId {
        if set.is_empty() {
            return PointsToId::EMPTY;
        }
        if let Some(&id) = self.set_to_id.get(&set) {
            return id;
        }

        let id = PointsToId::from_index(self.id_to_set.len());
        self.id_to_set.push(set.clone());
        self.set_to_id.insert(set, id);
        self.stats.interned += 1;
        id
    }

    /// The set denoted by `id`.
    ///
    /// # Panics
    /// On an ID this cache never issued; that is a programmer error.
    #[inline]
    pub fn actual(&self, id: PointsToId) -> &S {
        self.id_to_set
            .get(id.index())
            .unwrap_or_else(|| panic!("{id} was never interned in this cache"))
    }

    /// ID of `set(a) ∪ set(b)`.
    pub fn union(&mut self, a: PointsToId, b: PointsToId) -> PointsToId {
        // Shortcuts first so the memo never stores trivial pairs.
        if a == b || b == PointsToId::EMPTY {
            self.stats.unions.shortcuts += 1;
            return a;
        }
        if a == PointsToId::EMPTY {
            self.stats.unions.shortcuts += 1;
            return b;
        }

        let key = commutative_key(a, b);
        if let Some(&c) = self.union_memo.get(&key) {
            self.stats.unions.hits += 1;
            return c;
        }

        self.stats.unions.misses += 1;
        let result = self.actual(a).union(self.actual(b));
        let c = self.emplace(result);
        self.union_memo.insert(key, c);
        c
    }

    /// ID of `set(a) ∩ set(b)`.
    pub fn intersect(&mut self, a: PointsToId, b: PointsToId) -> PointsToId {
        if a == b {
            self.stats.intersections.shortcuts += 1;
            return a;
        }
        if a == PointsToId::EMPTY || b == PointsToId::EMPTY {
            self.stats.intersections.shortcuts += 1;
            return PointsToId::EMPTY;
        }

        let key = commutative_key(a, b);
        if let Some(&c) = self.intersect_memo.get(&key) {
            self.stats.intersections.hits += 1;
            return c;
        }

        self.stats.intersections.misses += 1;
        let result = self.actual(a).intersect(self.actual(b));
        let c = self.emplace(result);
        self.intersect_memo.insert(key, c);
        c
    }

    /// ID of `set(a) ∖ set(b)`. Not commutative; the memo key is ordered.
    pub fn complement(&mut self, a: PointsToId, b: PointsToId) -> PointsToId {
        if a == b || a == PointsToId::EMPTY {
            self.stats.complements.shortcuts += 1;
            return PointsToId::EMPTY;
        }
        if b == PointsToId::EMPTY {
            self.stats.complements.shortcuts += 1;
            return a;
        }

        if let Some(&c) = self.complement_memo.get(&(a, b)) {
            self.stats.complements.hits += 1;
            return c;
        }

        self.stats.complements.misses += 1;
        let result = self.actual(a).difference(self.actual(b));
        let c = self.emplace(result);
        self.complement_memo.insert((a, b), c);
        c
    }

    /// Activity counters since construction.
    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Sizes of the three memo tables (union, intersection, complement).
    #[inline]
    pub fn memo_sizes(&self) -> (usize, usize, usize) {
        (
            self.union_memo.len(),
            self.intersect_memo.len(),
            self.complement_memo.len(),
        )
    }

    /// Emit a debug-level summary of cache activity.
    pub fn log_stats(&self) {
        let (u, i, c) = self.memo_sizes();
        debug!(
            interned = self.stats.interned,
            union_total = self.stats.unions.total(),
            union_memo = u,
            intersect_total = self.stats.intersections.total(),
            intersect_memo = i,
            complement_total = self.stats.complements.total(),
            complement_memo = c,
            "points-to cache activity"
        );
    }
}

/// Canonical memo key for a commutative operation.
#[inline]
fn commutative_key(a: PointsToId, b: PointsToId) -> (PointsToId, PointsToId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Shared handle to one [`PersistentPointsToCache`].
///
/// Clones are cheap and all refer to the same cache, so several stores can
/// draw IDs from one interning namespace. The solver is single-threaded;
/// exclusive access is enforced at runtime by the inner `RefCell` — holding
/// a [`Ref`] from [`actual`](Self::actual) across a mutating call is a
/// borrow error, matching the contract that set references are invalidated
/// by cache mutation.
pub struct SharedPointsToCache<S: PointsToSet> {
    inner: Rc<RefCell<PersistentPointsToCache<S>>>,
}

impl<S: PointsToSet> Clone for SharedPointsToCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: PointsToSet> Default for SharedPointsToCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PointsToSet> SharedPointsToCache<S> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PersistentPointsToCache::new())),
        }
    }

    /// See [`PersistentPointsToCache::emplace`].
    #[inline]
    pub fn emplace(&self, set: S) -> PointsToId {
        self.inner.borrow_mut().emplace(set)
    }

    /// See [`PersistentPointsToCache::union`].
    #[inline]
    pub fn union(&self, a: PointsToId, b: PointsToId) -> PointsToId {
        self.inner.borrow_mut().union(a, b)
    }

    /// See [`PersistentPointsToCache::intersect`].
    #[inline]
    pub fn intersect(&self, a: PointsToId, b: PointsToId) -> PointsToId {
        self.inner.borrow_mut().intersect(a, b)
    }

    /// See [`PersistentPointsToCache::complement`].
    #[inline]
    pub fn complement(&self, a: PointsToId, b: PointsToId) -> PointsToId {
        self.inner.borrow_mut().complement(a, b)
    }

    /// Borrow the set denoted by `id`. The borrow must be dropped before
    /// the next mutating cache call.
    #[inline]
    pub fn actual(&self, id: PointsToId) -> Ref<'_, S> {
        Ref::map(self.inner.borrow(), |cache| cache.actual(id))
    }

    /// Number of interned sets.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Activity counters since construction.
    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.inner.borrow().stats()
    }

    /// Sizes of the three memo tables (union, intersection, complement).
    #[inline]
    pub fn memo_sizes(&self) -> (usize, usize, usize) {
        self.inner.borrow().memo_sizes()
    }

    /// Emit a debug-level summary of cache activity.
    pub fn log_stats(&self) {
        self.inner.borrow().log_stats();
    }
}
