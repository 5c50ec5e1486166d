//! Differential points-to store
//!
//! A base store plus two ID maps per key: what has already been propagated
//! outward (`propa`) and the most recently computed remainder (`diff`). A
//! propagation-based solver pushes only the diff, so converged parts of the
//! points-to relation stop generating work.

use std::cell::Ref;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::interning::domain::points_to_set::{PointsToId, PointsToSet};
use crate::features::interning::infrastructure::cache::SharedPointsToCache;
use crate::features::points_to::domain::kind::StoreKind;
use crate::features::points_to::domain::usage::SetUsage;
use crate::features::points_to::infrastructure::base_store::BasePointsToStore;

/// Base store with propagated-vs-new diff tracking.
pub struct DiffPointsToStore<K, S: PointsToSet> {
    base: BasePointsToStore<K, S>,

    /// Most recent diff per key: full set minus what was propagated.
    diff_pts: FxHashMap<K, PointsToId>,

    /// What has already been propagated per key.
    propa_pts: FxHashMap<K, PointsToId>,
}

impl<K, S> DiffPointsToStore<K, S>
where
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    pub fn new(cache: SharedPointsToCache<S>, reverse_pt: bool) -> Self {
        Self {
            base: BasePointsToStore::with_kind(cache, reverse_pt, StoreKind::Diff),
            diff_pts: FxHashMap::default(),
            propa_pts: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> StoreKind {
        self.base.kind()
    }

    // Base delegation.

    #[inline]
    pub fn pts_id(&self, var: &K) -> PointsToId {
        self.base.pts_id(var)
    }

    #[inline]
    pub fn get_pts(&self, var: &K) -> Ref<'_, S> {
        self.base.get_pts(var)
    }

    #[inline]
    pub fn get_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<K> {
        self.base.get_rev_pts(elem)
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

    pub fn clear(&mut self) {
        self.base.clear();
        self.diff_pts.clear();
        self.propa_pts.clear();
    }

    // Diff layer.

    /// ID of `var`'s most recently computed diff.
    #[inline]
    pub fn diff_pts_id(&self, var: &K) -> PointsToId {
        self.diff_pts.get(var).copied().unwrap_or(PointsToId::EMPTY)
    }

    /// Borrow `var`'s most recently computed diff set.
    #[inline]
    pub fn get_diff_pts(&self, var: &K) -> Ref<'_, S> {
        self.base.cache().actual(self.diff_pts_id(var))
    }

    /// Compute `var`'s diff against what was already propagated, record
    /// `all` as now fully propagated, and report whether the diff is
    /// non-empty.
    pub fn compute_diff_pts(&mut self, var: K, all: &S) -> bool {
        let propagated = self.propa_pts.get(&var).copied().unwrap_or(PointsToId::EMPTY);
        let all_id = self.base.cache().emplace(all.clone());
        let diff_id = self.base.cache().complement(all_id, propagated);

        self.diff_pts.insert(var, diff_id);
        self.propa_pts.insert(var, all_id);

        diff_id != PointsToId::EMPTY
    }

    /// After merging `src` into `dst`, only what both have already
    /// propagated counts as propagated at `dst`.
    pub fn update_propa_pts(&mut self, src: K, dst: K) {
        let dst_id = self.propa_pts.get(&dst).copied().unwrap_or(PointsToId::EMPTY);
        let src_id = self.propa_pts.get(&src).copied().unwrap_or(PointsToId::EMPTY);
        let met = self.base.cache().intersect(dst_id, src_id);
        self.propa_pts.insert(dst, met);
    }

    /// Forget that anything was propagated for `var`.
    pub fn clear_propa_pts(&mut self, var: &K) {
        self.propa_pts.remove(var);
    }

    #[inline]
    pub fn top_n(&self, n: usize) -> SetUsage {
        self.base.top_n(n)
    }

    #[inline]
    pub fn in_use_points_to_sets(&self) -> u64 {
        self.base.in_use_points_to_sets()
    }
}
