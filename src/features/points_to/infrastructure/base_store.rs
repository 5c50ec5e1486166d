//! Base persistent points-to store
//!
//! Maps each key to the ID of its current points-to set and, when enabled,
//! keeps the reverse element → keys index. All set material lives in the
//! shared cache; the store only ever rebinds IDs.

use std::cell::Ref;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::interning::domain::points_to_set::{PointsToId, PointsToSet};
use crate::features::interning::infrastructure::cache::SharedPointsToCache;
use crate::features::points_to::domain::kind::StoreKind;
use crate::features::points_to::domain::usage::{self, SetUsage};

/// Key → points-to store backed by a shared interning cache.
pub struct BasePointsToStore<K, S: PointsToSet> {
    cache: SharedPointsToCache<S>,

    /// Current points-to ID per key. Missing keys read as the empty set.
    pts_map: FxHashMap<K, PointsToId>,

    /// Element → keys whose current set contains it. Maintained only when
    /// `reverse` is set.
    rev_pts_map: FxHashMap<S::Elem, FxHashSet<K>>,

    reverse: bool,
    kind: StoreKind,
}

impl<K, S> BasePointsToStore<K, S>
where
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    pub fn new(cache: SharedPointsToCache<S>, reverse_pt: bool) -> Self {
        Self::with_kind(cache, reverse_pt, StoreKind::Base)
    }

    /// Wrapping stores stamp their own tag on the inner base store.
    pub(crate) fn with_kind(
        cache: SharedPointsToCache<S>,
        reverse_pt: bool,
        kind: StoreKind,
    ) -> Self {
        Self {
            cache,
            pts_map: FxHashMap::default(),
            rev_pts_map: FxHashMap::default(),
            reverse: reverse_pt,
            kind,
        }
    }

    #[inline]
    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    /// Whether reverse points-to queries are supported.
    #[inline]
    pub fn has_reverse(&self) -> bool {
        self.reverse
    }

    #[inline]
    pub(crate) fn cache(&self) -> &SharedPointsToCache<S> {
        &self.cache
    }

    #[inline]
    pub(crate) fn pts_map(&self) -> &FxHashMap<K, PointsToId> {
        &self.pts_map
    }

    /// ID of `var`'s current points-to set.
    #[inline]
    pub fn pts_id(&self, var: &K) -> PointsToId {
        self.pts_map.get(var).copied().unwrap_or(PointsToId::EMPTY)
    }

    /// Borrow `var`'s current points-to set. The borrow must be dropped
    /// before the next mutating operation on any store sharing this cache.
    #[inline]
    pub fn get_pts(&self, var: &K) -> Ref<'_, S> {
        self.cache.actual(self.pts_id(var))
    }

    /// Keys whose points-to set contains `elem`.
    ///
    /// # Panics
    /// If the store was constructed without reverse support.
    pub fn get_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<K> {
        assert!(
            self.reverse,
            "get_rev_pts: store was constructed without reverse points-to support"
        );
        self.rev_pts_map.entry(elem).or_default()
    }

    /// Add one element to `dst`'s points-to set. Returns true if the set
    /// grew.
    pub fn add_pts(&mut self, dst: K, elem: S::Elem) -> bool {
        let src_id = self.cache.emplace(S::singleton(elem));
        self.union_from_id(dst, src_id)
    }

    /// Union `src`'s current set into `dst`. Returns true if `dst` grew.
    pub fn union_pts(&mut self, dst: K, src: &K) -> bool {
        let src_id = self.pts_id(src);
        self.union_from_id(dst, src_id)
    }

    /// Union a raw set into `dst`. Returns true if `dst` grew.
    pub fn union_pts_set(&mut self, dst: K, src: &S) -> bool {
        let src_id = self.cache.emplace(src.clone());
        self.union_from_id(dst, src_id)
    }

    /// Remove one element from `var`'s points-to set.
    pub fn clear_pts(&mut self, var: &K, elem: S::Elem) {
        let to_remove = self.cache.emplace(S::singleton(elem));
        let current = self.pts_id(var);
        let remaining = self.cache.complement(current, to_remove);
        if remaining != current {
            self.pts_map.insert(*var, remaining);
            if self.reverse {
                if let Some(keys) = self.rev_pts_map.get_mut(&elem) {
                    keys.remove(var);
                }
            }
        }
    }

    /// Reset `var` to the empty set, unhooking it from every reverse set
    /// it currently appears in.
    pub fn clear_full_pts(&mut self, var: &K) {
        if self.reverse {
            let current = self.pts_id(var);
            let elems: Vec<S::Elem> = self.cache.actual(current).iter().collect();
            for elem in elems {
                if let Some(keys) = self.rev_pts_map.get_mut(&elem) {
                    keys.remove(var);
                }
            }
        }
        self.pts_map.remove(var);
    }

    /// Drop all per-key state. The cache is untouched; other stores may
    /// still reference its sets.
    pub fn clear(&mut self) {
        self.pts_map.clear();
        self.rev_pts_map.clear();
    }

    /// Union the set named by `src_id` into `dst`'s mapping.
    ///
    /// The one primitive every mutating operation funnels through. Reverse
    /// entries are recorded from the *source* set: elements already in the
    /// destination are already indexed, so only the incoming contribution
    /// can introduce new (element, key) pairs.
    pub(crate) fn union_from_id(&mut self, dst: K, src_id: PointsToId) -> bool {
        let dst_id = self.pts_id(&dst);
        let new_id = self.cache.union(dst_id, src_id);
        if new_id == dst_id {
            return false;
        }

        self.pts_map.insert(dst, new_id);
        if self.reverse {
            let src = self.cache.actual(src_id);
            for elem in src.iter() {
                self.rev_pts_map.entry(elem).or_default().insert(dst);
            }
        }
        true
    }

    /// Reuse concentration over this store's key→ID map.
    pub fn top_n(&self, n: usize) -> SetUsage {
        usage::top_n(self.pts_map.values().copied(), n)
    }

    /// Distinct set IDs referenced by this store.
    pub fn in_use_points_to_sets(&self) -> u64 {
        usage::in_use(self.pts_map.values().copied())
    }
}
