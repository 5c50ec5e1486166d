//! Incremental flow-sensitive points-to store
//!
//! Extends the data-flow store with per-location updated-variable sets: a
//! variable is dirty at a location while its IN (or OUT) state has changed
//! and not yet been consumed. Transfers from a clean source are skipped
//! outright, so a fixed-point iteration only revisits work whose inputs
//! actually moved — change detection itself is an ID comparison.
//!
//! Dirty life cycle per (location, variable), IN shown (OUT symmetric):
//! clean → dirty when a transfer changes the state; dirty → clean when the
//! solver consumes it (publishing IN to OUT, or loading into a top-level
//! pointer) or explicitly clears it.

use std::cell::Ref;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::interning::domain::points_to_set::{PointsToId, PointsToSet};
use crate::features::interning::infrastructure::cache::SharedPointsToCache;
use crate::features::points_to::domain::kind::StoreKind;
use crate::features::points_to::domain::usage::SetUsage;
use crate::features::points_to::infrastructure::data_flow_store::DataFlowPointsToStore;

/// Data-flow store with updated-variable tracking.
pub struct IncrementalDataFlowPointsToStore<L, K, S: PointsToSet> {
    df: DataFlowPointsToStore<L, K, S>,

    /// Variables whose IN state changed at a location and was not yet
    /// consumed.
    in_updated: FxHashMap<L, FxHashSet<K>>,

    /// Same for OUT state.
    out_updated: FxHashMap<L, FxHashSet<K>>,
}

impl<L, K, S> IncrementalDataFlowPointsToStore<L, K, S>
where
    L: Copy + Eq + Hash,
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    pub fn new(cache: SharedPointsToCache<S>) -> Self {
        Self {
            df: DataFlowPointsToStore::with_kind(cache, StoreKind::IncDataFlow),
            in_updated: FxHashMap::default(),
            out_updated: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> StoreKind {
        self.df.kind()
    }

    // Flow-insensitive surface, delegated through the DF store.

    #[inline]
    pub fn pts_id(&self, var: &K) -> PointsToId {
        self.df.pts_id(var)
    }

    #[inline]
    pub fn get_pts(&self, var: &K) -> Ref<'_, S> {
        self.df.get_pts(var)
    }

    /// # Panics
    /// Always; data-flow stores keep no reverse maps.
    pub fn get_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<K> {
        self.df.get_rev_pts(elem)
    }

    #[inline]
    pub fn add_pts(&mut self, dst: K, elem: S::Elem) -> bool {
        self.df.add_pts(dst, elem)
    }

    #[inline]
    pub fn union_pts(&mut self, dst: K, src: &K) -> bool {
        self.df.union_pts(dst, src)
    }

    #[inline]
    pub fn union_pts_set(&mut self, dst: K, src: &S) -> bool {
        self.df.union_pts_set(dst, src)
    }

    #[inline]
    pub fn clear_pts(&mut self, var: &K, elem: S::Elem) {
        self.df.clear_pts(var, elem)
    }

    #[inline]
    pub fn clear_full_pts(&mut self, var: &K) {
        self.df.clear_full_pts(var)
    }

    pub fn clear(&mut self) {
        self.df.clear();
        self.in_updated.clear();
        self.out_updated.clear();
    }

    // DF state inspection, delegated.

    #[inline]
    pub fn has_df_in_set(&self, loc: L) -> bool {
        self.df.has_df_in_set(loc)
    }

    #[inline]
    pub fn has_df_out_set(&self, loc: L) -> bool {
        self.df.has_df_out_set(loc)
    }

    #[inline]
    pub fn has_df_in_set_for(&self, loc: L, var: &K) -> bool {
        self.df.has_df_in_set_for(loc, var)
    }

    #[inline]
    pub fn has_df_out_set_for(&self, loc: L, var: &K) -> bool {
        self.df.has_df_out_set_for(loc, var)
    }

    #[inline]
    pub fn get_df_in_pts(&self, loc: L, var: &K) -> Ref<'_, S> {
        self.df.get_df_in_pts(loc, var)
    }

    #[inline]
    pub fn get_df_out_pts(&self, loc: L, var: &K) -> Ref<'_, S> {
        self.df.get_df_out_pts(loc, var)
    }

    // Dirty-bit inspection.

    /// Whether `var`'s IN state at `loc` changed since last consumed.
    #[inline]
    pub fn var_has_new_df_in_pts(&self, loc: L, var: &K) -> bool {
        self.in_updated.get(&loc).is_some_and(|s| s.contains(var))
    }

    /// Whether `var`'s OUT state at `loc` changed since last consumed.
    #[inline]
    pub fn var_has_new_df_out_pts(&self, loc: L, var: &K) -> bool {
        self.out_updated.get(&loc).is_some_and(|s| s.contains(var))
    }

    // Transfer operations.

    /// Skipped unless the source is IN-dirty; marks the destination
    /// IN-dirty on change.
    pub fn update_df_in_from_in(&mut self, src_loc: L, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        if !self.var_has_new_df_in_pts(src_loc, src_var) {
            return false;
        }
        if self.df.update_df_in_from_in(src_loc, src_var, dst_loc, dst_var) {
            self.mark_in_updated(dst_loc, dst_var);
            return true;
        }
        false
    }

    /// Skipped unless the source is OUT-dirty; marks the destination
    /// IN-dirty on change.
    pub fn update_df_in_from_out(&mut self, src_loc: L, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        if !self.var_has_new_df_out_pts(src_loc, src_var) {
            return false;
        }
        if self.df.update_df_in_from_out(src_loc, src_var, dst_loc, dst_var) {
            self.mark_in_updated(dst_loc, dst_var);
            return true;
        }
        false
    }

    /// Skipped unless the source is IN-dirty. The source dirty bit is
    /// consumed before the union regardless of whether the union changes
    /// anything; the destination becomes OUT-dirty only on change.
    pub fn update_df_out_from_in(&mut self, src_loc: L, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        if !self.var_has_new_df_in_pts(src_loc, src_var) {
            return false;
        }
        self.unmark_in_updated(src_loc, src_var);
        if self.df.update_df_out_from_in(src_loc, src_var, dst_loc, dst_var) {
            self.mark_out_updated(dst_loc, dst_var);
            return true;
        }
        false
    }

    /// Unconditional union; marks the destination IN-dirty on change.
    pub fn update_all_df_in_from_in(
        &mut self,
        src_loc: L,
        src_var: &K,
        dst_loc: L,
        dst_var: K,
    ) -> bool {
        if self.df.update_df_in_from_in(src_loc, src_var, dst_loc, dst_var) {
            self.mark_in_updated(dst_loc, dst_var);
            return true;
        }
        false
    }

    /// Unconditional union; marks the destination IN-dirty on change.
    pub fn update_all_df_in_from_out(
        &mut self,
        src_loc: L,
        src_var: &K,
        dst_loc: L,
        dst_var: K,
    ) -> bool {
        if self.df.update_df_in_from_out(src_loc, src_var, dst_loc, dst_var) {
            self.mark_in_updated(dst_loc, dst_var);
            return true;
        }
        false
    }

    /// Publish IN to OUT for the variables that are IN-dirty at `loc`,
    /// skipping the `singleton` under strong updates. Iterates a snapshot,
    /// since each publish clears the variable's dirty bit.
    pub fn update_all_df_out_from_in(&mut self, loc: L, singleton: &K, strong_updates: bool) -> bool {
        if !self.df.has_df_in_set(loc) {
            return false;
        }
        let vars: Vec<K> = self
            .in_updated
            .get(&loc)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();

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

    /// Load into a top-level pointer, gated on the source being IN-dirty;
    /// consumes the dirty bit.
    pub fn update_tlv_pts(&mut self, src_loc: L, src_var: &K, dst_var: K) -> bool {
        if !self.var_has_new_df_in_pts(src_loc, src_var) {
            return false;
        }
        self.unmark_in_updated(src_loc, src_var);
        self.df.update_tlv_pts(src_loc, src_var, dst_var)
    }

    /// Store from a top-level pointer; unconditional, marks the
    /// destination OUT-dirty on change.
    pub fn update_atv_pts(&mut self, src_var: &K, dst_loc: L, dst_var: K) -> bool {
        if self.df.update_atv_pts(src_var, dst_loc, dst_var) {
            self.mark_out_updated(dst_loc, dst_var);
            return true;
        }
        false
    }

    /// Drop every OUT-dirty bit at `loc`.
    pub fn clear_all_df_out_updated_var(&mut self, loc: L) {
        if let Some(vars) = self.out_updated.get_mut(&loc) {
            vars.clear();
        }
    }

    #[inline]
    pub fn top_n(&self, n: usize) -> SetUsage {
        self.df.top_n(n)
    }

    #[inline]
    pub fn in_use_points_to_sets(&self) -> u64 {
        self.df.in_use_points_to_sets()
    }

    // Dirty-bit bookkeeping.

    #[inline]
    fn mark_in_updated(&mut self, loc: L, var: K) {
        self.in_updated.entry(loc).or_default().insert(var);
    }

    #[inline]
    fn unmark_in_updated(&mut self, loc: L, var: &K) {
        if let Some(vars) = self.in_updated.get_mut(&loc) {
            vars.remove(var);
        }
    }

    #[inline]
    fn mark_out_updated(&mut self, loc: L, var: K) {
        self.out_updated.entry(loc).or_default().insert(var);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interning::domain::sparse_set::SparseNodeSet;

    type Store = IncrementalDataFlowPointsToStore<u64, u32, SparseNodeSet>;

    fn store() -> Store {
        IncrementalDataFlowPointsToStore::new(SharedPointsToCache::new())
    }

    /// Route `elems` into IN[loc][var] the way a solver would: store them
    /// through a scratch top-level pointer into OUT of a scratch location,
    /// then propagate OUT → IN.
    fn seed_in(s: &mut Store, loc: u64, var: u32, elems: &[u32]) {
        const SCRATCH_LOC: u64 = u64::MAX;
        const SCRATCH_TL: u32 = u32::MAX;

        s.clear_full_pts(&SCRATCH_TL);
        for &elem in elems {
            s.add_pts(SCRATCH_TL, elem);
        }
        s.update_atv_pts(&SCRATCH_TL, SCRATCH_LOC, var);
        assert!(s.update_df_in_from_out(SCRATCH_LOC, &var, loc, var));
    }

    #[test]
    fn test_kind_tag() {
        assert_eq!(store().kind(), StoreKind::IncDataFlow);
    }

    #[test]
    fn test_seed_marks_in_dirty() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        assert!(s.var_has_new_df_in_pts(1, &7));
        assert!(!s.var_has_new_df_out_pts(1, &7));
    }

    #[test]
    fn test_out_from_in_consumes_dirty_bit() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);

        assert!(s.update_df_out_from_in(1, &7, 1, 7));
        assert_eq!(s.get_df_out_pts(1, &7).iter().collect::<Vec<_>>(), vec![10]);
        assert!(!s.var_has_new_df_in_pts(1, &7));
        assert!(s.var_has_new_df_out_pts(1, &7));

        // Source is clean now; a second publish is skipped.
        assert!(!s.update_df_out_from_in(1, &7, 1, 7));
    }

    #[test]
    fn test_dirty_bit_consumed_even_when_union_is_noop() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        s.update_df_out_from_in(1, &7, 1, 7);

        // OUT races ahead of IN through a top-level store, then IN catches
        // up: publishing no longer changes OUT, but the dirty bit must
        // still be consumed.
        s.add_pts(99, 11);
        assert!(s.update_atv_pts(&99, 1, 7)); // OUT[1][7] = {10, 11}
        seed_in(&mut s, 1, 7, &[11]); // IN[1][7] = {10, 11}, dirty again
        assert!(s.var_has_new_df_in_pts(1, &7));
        assert!(!s.update_df_out_from_in(1, &7, 1, 7));
        assert!(!s.var_has_new_df_in_pts(1, &7));
    }

    #[test]
    fn test_in_from_in_gated_on_source_dirty() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        s.update_df_out_from_in(1, &7, 1, 7); // cleans IN at loc 1

        // Clean source: skipped even though destination has never seen it.
        assert!(!s.update_df_in_from_in(1, &7, 2, 7));
        assert!(s.get_df_in_pts(2, &7).is_empty());

        // The unconditional variant still propagates.
        assert!(s.update_all_df_in_from_in(1, &7, 2, 7));
        assert!(s.var_has_new_df_in_pts(2, &7));
    }

    #[test]
    fn test_in_from_out_gated_on_out_dirty() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        s.update_df_out_from_in(1, &7, 1, 7); // OUT[1][7] dirty now

        assert!(s.update_df_in_from_out(1, &7, 2, 7));
        assert!(s.var_has_new_df_in_pts(2, &7));

        // Propagating again: source still OUT-dirty, but the union no
        // longer changes the destination.
        assert!(!s.update_df_in_from_out(1, &7, 2, 7));
    }

    #[test]
    fn test_update_all_df_out_from_in_visits_only_dirty_vars() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        seed_in(&mut s, 1, 8, &[20]);
        s.update_df_out_from_in(1, &7, 1, 7); // var 7 now clean

        assert!(s.update_all_df_out_from_in(1, &0, false));
        // Var 7 was clean, so only var 8 was published; OUT[1][7] kept its
        // earlier value.
        assert_eq!(s.get_df_out_pts(1, &8).iter().collect::<Vec<_>>(), vec![20]);
        assert!(!s.var_has_new_df_in_pts(1, &8));

        // Everything clean: publishing is a no-op.
        assert!(!s.update_all_df_out_from_in(1, &0, false));
    }

    #[test]
    fn test_update_all_df_out_from_in_strong_update_spares_singleton() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        seed_in(&mut s, 1, 8, &[20]);

        assert!(s.update_all_df_out_from_in(1, &7, true));
        assert!(s.get_df_out_pts(1, &7).is_empty());
        // The skipped singleton keeps its dirty bit.
        assert!(s.var_has_new_df_in_pts(1, &7));
        assert!(!s.var_has_new_df_in_pts(1, &8));
    }

    #[test]
    fn test_tlv_pts_gated_and_consuming() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);

        assert!(s.update_tlv_pts(1, &7, 99));
        assert_eq!(s.get_pts(&99).iter().collect::<Vec<_>>(), vec![10]);
        assert!(!s.var_has_new_df_in_pts(1, &7));

        // Consumed: a second load is skipped.
        assert!(!s.update_tlv_pts(1, &7, 98));
        assert!(s.get_pts(&98).is_empty());
    }

    #[test]
    fn test_atv_pts_marks_out_dirty() {
        let mut s = store();
        s.add_pts(99, 10);

        assert!(s.update_atv_pts(&99, 2, 8));
        assert!(s.var_has_new_df_out_pts(2, &8));
        assert!(!s.update_atv_pts(&99, 2, 8));
    }

    #[test]
    fn test_clear_all_df_out_updated_var() {
        let mut s = store();
        s.add_pts(99, 10);
        s.update_atv_pts(&99, 2, 8);
        assert!(s.var_has_new_df_out_pts(2, &8));

        s.clear_all_df_out_updated_var(2);
        assert!(!s.var_has_new_df_out_pts(2, &8));
        // The OUT state itself survives; only the dirty bit is dropped.
        assert_eq!(s.get_df_out_pts(2, &8).iter().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_clear_resets_dirty_state() {
        let mut s = store();
        seed_in(&mut s, 1, 7, &[10]);
        s.clear();
        assert!(!s.var_has_new_df_in_pts(1, &7));
        assert!(!s.has_df_in_set(1));
    }
}
