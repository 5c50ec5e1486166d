//! Flow-sensitive points-to store
//!
//! Keeps IN and OUT points-to state per program location for address-taken
//! variables, while top-level pointers live flow-insensitively in the inner
//! base store — both drawing IDs from the same cache, so a transfer between
//! the two layers is a single ID-level union.
//!
//! Reverse points-to queries are not supported here; asking is fatal.

use std::cell::Ref;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::interning::domain::points_to_set::{PointsToId, PointsToSet};
use crate::features::interning::infrastructure::cache::SharedPointsToCache;
use crate::features::points_to::domain::kind::StoreKind;
use crate::features::points_to::domain::usage::{self, SetUsage};
use crate::features::points_to::infrastructure::base_store::BasePointsToStore;

/// Per-location IN/OUT store over a flow-insensitive base.
pub struct DataFlowPointsToStore<L, K, S: PointsToSet> {
    /// Top-level pointer state; reverse tracking is never enabled here.
    base: BasePointsToStore<K, S>,

    /// IN-state per location: key → set ID.
    df_in: FxHashMap<L, FxHashMap<K, PointsToId>>,

    /// OUT-state per location: key → set ID.
    df_out: FxHashMap<L, FxHashMap<K, PointsToId>>,
}

impl<L, K, S> DataFlowPointsToStore<L, K, S>
where
    L: Copy + Eq + Hash,
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    pub fn new(cache: SharedPointsToCache<S>) -> Self {
        Self::with_kind(cache, StoreKind::DataFlow)
    }

    pub(crate) fn with_kind(cache: SharedPointsToCache<S>, kind: StoreKind) -> Self {
        Self {
            base: BasePointsToStore::with_kind(cache, false, kind),
            df_in: FxHashMap::default(),
            df_out: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> StoreKind {
        self.base.kind()
    }

    // Flow-insensitive surface, delegated to the base store.

    #[inline]
    pub fn pts_id(&self, var: &K) -> PointsToId {
        self.base.pts_id(var)
    }

    #[inline]
    pub fn get_pts(&self, var: &K) -> Ref<'_, S> {
        self.base.get_pts(var)
    }

    /// Reverse points-to is not kept by data-flow stores.
    ///
    /// # Panics
    /// Always.
    pub fn get_rev_pts(&mut self, _elem: S::Elem) -> &FxHashSet<K> {
        panic!("get_rev_pts: reverse points-to is not supported by data-flow stores");
    }

    #[inline]
    pub fn add_pts(&mut self, dst: K, elem: S::Elem) -> bool {
        self.base.add_pts(dst, elem)
    }

    #[inline]
    pub fn union_pts(&mut self, dst: K, src: &K) -> bool {
        self.base.union_pts(dst, src)
    }

    #[inline]
    pub fn union_pts_set(&mut self, dst: K, src: &S) -> bool {
        self.base.union_pts_set(dst, src)
    }

    #[inline]
    pub fn clear_pts(&mut self, var: &K, elem: S::Elem) {
        self.base.clear_pts(var, elem)
    }

    #[inline]
    pub fn clear_full_pts(&mut self, var: &K) {
        self.base.clear_full_pts(var)
    }

    /// Reset base state, both DF maps, and nothing in the cache.
    pub fn clear(&mut self) {
        self.base.clear();
        self.df_in.clear();
        self.df_out.clear();
    }

    // DF state inspection.

    #[inline]
    pub fn has_df_in_set(&self, loc: L) -> bool {
        self.df_in.contains_key(&loc)
    }

    #[inline]
    pub fn has_df_out_set(&self, loc: L) -> bool {
        self.df_out.contains_key(&loc)
    }

    #[inline]
    pub fn has_df_in_set_for(&self, loc: L, var: &K) -> bool {
        self.df_in.get(&loc).is_some_and(|m| m.contains_key(var))
    }

    #[inline]
    pub fn has_df_out_set_for(&self, loc: L, var: &K) -> bool {
        self.df_out.get(&loc).is_some_and(|m| m.contains_key(var))
    }

    /// Borrow the IN points-to set of `var` at `loc`.
    #[inline]
    pub fn get_df_in_pts(&self, loc: L, var: &K) -> Ref<'_, S> {
        self.base.cache().actual(self.df_in_id(loc, var))
    }

    /// Borrow the OUT points-to set of `var` at `loc`.
    #[inline]
    pub fn get_df_out_pts(&self, loc: L, var: &K) -> Ref<'_, S> {
        self.base.cache().actual(self.df_out_id(loc, var))
    }

    // Transfer operations. Each is an ID-level union returning whether the
    // destination changed.

    /// `IN[dst_loc][dst_var] ∪= IN[src_loc][src_var]`
    pub fn update_df_in_from_in(&mut self, src_loc: L, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        let src = self.df_in_id(src_loc, src_var);
        self.union_into_df_in(dst_loc, dst_var, src)
    }

    /// `IN[dst_loc][dst_var] ∪= OUT[src_loc][src_var]`
    pub fn update_df_in_from_out(&mut self, src_loc: L, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        let src = self.df_out_id(src_loc, src_var);
        self.union_into_df_in(dst_loc, dst_var, src)
    }

    /// `OUT[dst_loc][dst_var] ∪= IN[src_loc][src_var]`
    pub fn update_df_out_from_in(&mut self, src_loc: L, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        let src = self.df_in_id(src_loc, src_var);
        self.union_into_df_out(dst_loc, dst_var, src)
    }

    /// Same as [`update_df_in_from_in`](Self::update_df_in_from_in); the
    /// incremental store distinguishes the unconditional variant.
    pub fn update_all_df_in_from_in(
        &mut self,
        src_loc: L,
        src_var: &K,
        dst_loc: L,
        dst_var: K,
    ) -> bool {
        self.update_df_in_from_in(src_loc, src_var, dst_loc, dst_var)
    }

    /// Same as [`update_df_in_from_out`](Self::update_df_in_from_out).
    pub fn update_all_df_in_from_out(
        &mut self,
        src_loc: L,
        src_var: &K,
        dst_loc: L,
        dst_var: K,
    ) -> bool {
        self.update_df_in_from_out(src_loc, src_var, dst_loc, dst_var)
    }

    /// Publish IN-state to OUT-state for every variable known at `loc`.
    /// With `strong_updates`, the proven-killed `singleton` is skipped.
    pub fn update_all_df_out_from_in(&mut self, loc: L, singleton: &K, strong_updates: bool) -> bool {
        let vars: Vec<K> = match self.df_in.get(&loc) {
            Some(in_map) => in_map.keys().copied().collect(),
            None => return false,
        };

        let mut changed = false;
        for var in vars {
            if strong_updates && var == *singleton {
                continue;
            }
            if self.update_df_out_from_in(loc, &var, loc, var) {
                changed = true;
            }
        }
        changed
    }

    /// `pts[dst_var] ∪= IN[src_loc][src_var]` — load into a top-level
    /// pointer.
    pub fn update_tlv_pts(&mut self, src_loc: L, src_var: &K, dst_var: K) -> bool {
        let src = self.df_in_id(src_loc, src_var);
        self.base.union_from_id(dst_var, src)
    }

    /// `OUT[dst_loc][dst_var] ∪= pts[src_var]` — store from a top-level
    /// pointer.
    pub fn update_atv_pts(&mut self, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        let src = self.base.pts_id(src_var);
        self.union_into_df_out(dst_loc, dst_var, src)
    }

    /// Dirty-bit bookkeeping only exists in the incremental store.
    pub fn clear_all_df_out_updated_var(&mut self, _loc: L) {}

    /// Reuse concentration across the base map and every IN/OUT inner map.
    pub fn top_n(&self, n: usize) -> SetUsage {
        usage::top_n(self.all_ids(), n)
    }

    /// Distinct set IDs across the base map and every IN/OUT inner map.
    pub fn in_use_points_to_sets(&self) -> u64 {
        usage::in_use(self.all_ids())
    }

    fn all_ids(&self) -> impl Iterator<Item = PointsToId> + '_ {
        self.base
            .pts_map()
            .values()
            .chain(self.df_in.values().flat_map(|m| m.values()))
            .chain(self.df_out.values().flat_map(|m| m.values()))
            .copied()
    }

    // Internals shared with the incremental store.

    #[inline]
    pub(crate) fn df_in_id(&self, loc: L, var: &K) -> PointsToId {
        self.df_in
            .get(&loc)
            .and_then(|m| m.get(var))
            .copied()
            .unwrap_or(PointsToId::EMPTY)
    }

    #[inline]
    pub(crate) fn df_out_id(&self, loc: L, var: &K) -> PointsToId {
        self.df_out
            .get(&loc)
            .and_then(|m| m.get(var))
            .copied()
            .unwrap_or(PointsToId::EMPTY)
    }

    pub(crate) fn union_into_df_in(&mut self, loc: L, var: K, src: PointsToId) -> bool {
        let dst = self.df_in_id(loc, &var);
        let new = self.base.cache().union(dst, src);
        if new == dst {
            return false;
        }
        self.df_in.entry(loc).or_default().insert(var, new);
        true
    }

    pub(crate) fn union_into_df_out(&mut self, loc: L, var: K, src: PointsToId) -> bool {
        let dst = self.df_out_id(loc, &var);
        let new = self.base.cache().union(dst, src);
        if new == dst {
            return false;
        }
        self.df_out.entry(loc).or_default().insert(var, new);
        true
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interning::domain::sparse_set::SparseNodeSet;

    type Store = DataFlowPointsToStore<u64, u32, SparseNodeSet>;

    fn store() -> Store {
        DataFlowPointsToStore::new(SharedPointsToCache::new())
    }

    fn seed_in(s: &mut Store, loc: u64, var: u32, elems: &[u32]) {
        let set: SparseNodeSet = elems.iter().copied().collect();
        let id = s.base.cache().emplace(set);
        s.union_into_df_in(loc, var, id);
    }

    #[test]
    fn test_kind_tag() {
        assert_eq!(store().kind(), StoreKind::DataFlow);
    }

    #[test]
    fn test_absent_state_reads_empty() {
        let s = store();
        assert!(!s.has_df_in_set(1));
        assert!(!s.has_df_in_set_for(1, &2));
        assert!(s.get_df_in_pts(1, &2).is_empty());
        assert!(s.get_df_out_pts(1, &2).is_empty());
    }

    #[test]
    fn test_update_df_in_from_in() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);

        assert!(s.update_df_in_from_in(1, &7, 2, 7));
        assert!(!s.update_df_in_from_in(1, &7, 2, 7));
        assert_eq!(s.get_df_in_pts(2, &7).iter().collect::<Vec<_>>(), vec![10]);
        assert!(s.has_df_in_set_for(2, &7));
    }

    #[test]
    fn test_update_df_out_from_in_and_back() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);

        assert!(s.update_df_out_from_in(1, &7, 1, 7));
        assert!(s.has_df_out_set_for(1, &7));

        // OUT of loc 1 feeds IN of loc 2.
        assert!(s.update_df_in_from_out(1, &7, 2, 7));
        assert_eq!(s.get_df_in_pts(2, &7).iter().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_update_all_df_out_from_in_strong_update() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        seed_in(&mut s, 1, 8, &[20]);

        assert!(s.update_all_df_out_from_in(1, &7, true));
        // The singleton is killed; only var 8 is published.
        assert!(s.get_df_out_pts(1, &7).is_empty());
        assert_eq!(s.get_df_out_pts(1, &8).iter().collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn test_update_all_df_out_from_in_weak() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        seed_in(&mut s, 1, 8, &[20]);

        assert!(s.update_all_df_out_from_in(1, &7, false));
        assert_eq!(s.get_df_out_pts(1, &7).iter().collect::<Vec<_>>(), vec![10]);
        assert_eq!(s.get_df_out_pts(1, &8).iter().collect::<Vec<_>>(), vec![20]);

        // Fixed point: nothing changes on the second publish.
        assert!(!s.update_all_df_out_from_in(1, &7, false));
    }

    #[test]
    fn test_tlv_and_atv_bridges() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);

        // Load: IN[1][7] flows into top-level var 99.
        assert!(s.update_tlv_pts(1, &7, 99));
        assert_eq!(s.get_pts(&99).iter().collect::<Vec<_>>(), vec![10]);

        // Store: top-level var 99 flows into OUT[2][8].
        assert!(s.update_atv_pts(&99, 2, 8));
        assert_eq!(s.get_df_out_pts(2, &8).iter().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_shared_interning_across_layers() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10, 11]);
        s.add_pts(99, 10);
        s.add_pts(99, 11);

        // Same set value, same ID, whichever layer produced it.
        assert_eq!(s.df_in_id(1, &7), s.pts_id(&99));
    }

    #[test]
    fn test_clear_resets_df_maps() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        s.update_df_out_from_in(1, &7, 1, 7);
        s.add_pts(99, 10);

        s.clear();
        assert!(!s.has_df_in_set(1));
        assert!(!s.has_df_out_set(1));
        assert!(s.get_pts(&99).is_empty());
        assert_eq!(s.in_use_points_to_sets(), 0);
    }

    #[test]
    fn test_usage_spans_all_maps() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        s.update_df_out_from_in(1, &7, 1, 7);
        s.add_pts(99, 10);

        // {10} appears in IN, OUT, and the base map.
        let usage = s.top_n(1);
        assert_eq!(usage.top_sum, 3);
        assert_eq!(usage.keys, 3);
        assert_eq!(s.in_use_points_to_sets(), 1);
    }

    #[test]
    #[should_panic(expected = "not supported by data-flow stores")]
    fn test_reverse_query_is_fatal() {
        let mut s = store();
        s.get_rev_pts(10);
    }
}
