//! Versioned points-to store
//!
//! Two base stores behind one cache: top-level pointers keyed by plain
//! keys, address-taken objects keyed by versioned keys (an object renamed
//! per SSA version). Because both namespaces intern into the same cache, a
//! union across them is a plain ID-level union on the counterparty's
//! current ID — no set material moves.

use std::cell::Ref;
use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::features::interning::domain::points_to_set::{PointsToId, PointsToSet};
use crate::features::interning::infrastructure::cache::SharedPointsToCache;
use crate::features::points_to::domain::kind::StoreKind;
use crate::features::points_to::domain::usage::{self, SetUsage};
use crate::features::points_to::infrastructure::base_store::BasePointsToStore;

/// Store with a top-level (`K`) and an address-taken (`VK`) namespace.
pub struct VersionedPointsToStore<K, VK, S: PointsToSet> {
    /// Top-level pointers.
    tl: BasePointsToStore<K, S>,
    /// Address-taken objects, SSA-renamed by version.
    at: BasePointsToStore<VK, S>,
}

impl<K, VK, S> VersionedPointsToStore<K, VK, S>
where
    K: Copy + Eq + Hash,
    VK: Copy + Eq + Hash,
    S: PointsToSet,
{
    pub fn new(cache: SharedPointsToCache<S>, reverse_pt: bool) -> Self {
        Self {
            tl: BasePointsToStore::with_kind(cache.clone(), reverse_pt, StoreKind::Versioned),
            at: BasePointsToStore::with_kind(cache, reverse_pt, StoreKind::Versioned),
        }
    }

    #[inline]
    pub fn kind(&self) -> StoreKind {
        StoreKind::Versioned
    }

    // Top-level namespace.

    #[inline]
    pub fn tl_pts_id(&self, var: &K) -> PointsToId {
        self.tl.pts_id(var)
    }

    #[inline]
    pub fn get_tl_pts(&self, var: &K) -> Ref<'_, S> {
        self.tl.get_pts(var)
    }

    /// # Panics
    /// If constructed without reverse support.
    #[inline]
    pub fn get_tl_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<K> {
        self.tl.get_rev_pts(elem)
    }

    #[inline]
    pub fn add_tl_pts(&mut self, dst: K, elem: S::Elem) -> bool {
        self.tl.add_pts(dst, elem)
    }

    #[inline]
    pub fn union_tl_pts(&mut self, dst: K, src: &K) -> bool {
        self.tl.union_pts(dst, src)
    }

    #[inline]
    pub fn union_tl_pts_set(&mut self, dst: K, src: &S) -> bool {
        self.tl.union_pts_set(dst, src)
    }

    #[inline]
    pub fn clear_tl_pts(&mut self, var: &K, elem: S::Elem) {
        self.tl.clear_pts(var, elem)
    }

    #[inline]
    pub fn clear_full_tl_pts(&mut self, var: &K) {
        self.tl.clear_full_pts(var)
    }

    // Address-taken namespace.

    #[inline]
    pub fn at_pts_id(&self, var: &VK) -> PointsToId {
        self.at.pts_id(var)
    }

    #[inline]
    pub fn get_at_pts(&self, var: &VK) -> Ref<'_, S> {
        self.at.get_pts(var)
    }

    /// # Panics
    /// If constructed without reverse support.
    #[inline]
    pub fn get_at_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<VK> {
        self.at.get_rev_pts(elem)
    }

    #[inline]
    pub fn add_at_pts(&mut self, dst: VK, elem: S::Elem) -> bool {
        self.at.add_pts(dst, elem)
    }

    #[inline]
    pub fn union_at_pts(&mut self, dst: VK, src: &VK) -> bool {
        self.at.union_pts(dst, src)
    }

    #[inline]
    pub fn union_at_pts_set(&mut self, dst: VK, src: &S) -> bool {
        self.at.union_pts_set(dst, src)
    }

    #[inline]
    pub fn clear_at_pts(&mut self, var: &VK, elem: S::Elem) {
        self.at.clear_pts(var, elem)
    }

    #[inline]
    pub fn clear_full_at_pts(&mut self, var: &VK) {
        self.at.clear_full_pts(var)
    }

    // Cross-namespace unions: both namespaces draw from the same cache, so
    // the counterparty's current ID unions directly.

    /// `at[dst] ∪= tl[src]`. Returns true if `dst` grew.
    pub fn union_at_from_tl(&mut self, dst: VK, src: &K) -> bool {
        let src_id = self.tl.pts_id(src);
        self.at.union_from_id(dst, src_id)
    }

    /// `tl[dst] ∪= at[src]`. Returns true if `dst` grew.
    pub fn union_tl_from_at(&mut self, dst: K, src: &VK) -> bool {
        let src_id = self.at.pts_id(src);
        self.tl.union_from_id(dst, src_id)
    }

    /// Drop all per-key state in both namespaces.
    pub fn clear(&mut self) {
        self.tl.clear();
        self.at.clear();
    }

    /// Reuse concentration across both namespaces.
    pub fn top_n(&self, n: usize) -> SetUsage {
        usage::top_n(
            self.tl
                .pts_map()
                .values()
                .chain(self.at.pts_map().values())
                .copied(),
            n,
        )
    }

    /// Distinct set IDs across both namespaces.
    pub fn in_use_points_to_sets(&self) -> u64 {
        usage::in_use(
            self.tl
                .pts_map()
                .values()
                .chain(self.at.pts_map().values())
                .copied(),
        )
    }
}
