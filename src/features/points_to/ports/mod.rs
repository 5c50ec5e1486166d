//! Ports for the persistent store family
//!
//! A solver usually holds whichever store its configuration chose behind
//! one interface:
//! - [`PointsToData`]: the flow-insensitive contract every store honours;
//!   object-safe, so `Box<dyn PointsToData<K, S>>` works.
//! - [`StoreFactory`]: construction from a [`StoreConfig`], either as the
//!   concrete type or boxed. The [`StoreKind`] tag on every store is
//!   authoritative when a consumer needs to know what it is holding.
//!
//! Flow-sensitive and versioned operations stay on the concrete types —
//! they name location or versioned-key types the common interface has no
//! business knowing.

use std::cell::Ref;
use std::hash::Hash;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::errors::StoreError;
use crate::features::interning::domain::points_to_set::{PointsToId, PointsToSet};
use crate::features::interning::infrastructure::cache::SharedPointsToCache;
use crate::features::points_to::domain::kind::{StoreConfig, StoreKind};
use crate::features::points_to::domain::usage::SetUsage;
use crate::features::points_to::infrastructure::base_store::BasePointsToStore;
use crate::features::points_to::infrastructure::data_flow_store::DataFlowPointsToStore;
use crate::features::points_to::infrastructure::diff_store::DiffPointsToStore;
use crate::features::points_to::infrastructure::incremental_store::IncrementalDataFlowPointsToStore;
use crate::features::points_to::infrastructure::versioned_store::VersionedPointsToStore;

/// Flow-insensitive points-to operations common to every store.
///
/// Change-reporting booleans are convergence signals for the solver, not
/// error indicators. Reverse queries on stores without reverse support are
/// fatal; on data-flow stores they are always fatal.
pub trait PointsToData<K, S: PointsToSet> {
    /// Authoritative kind tag.
    fn kind(&self) -> StoreKind;

    /// Reset all per-key state. Never touches the shared cache.
    fn clear(&mut self);

    /// ID of `var`'s current points-to set.
    fn pts_id(&self, var: &K) -> PointsToId;

    /// Borrow `var`'s current points-to set.
    fn get_pts(&self, var: &K) -> Ref<'_, S>;

    /// Keys whose points-to set contains `elem`.
    fn get_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<K>;

    /// Add one element to `dst`. Returns true if `dst` grew.
    fn add_pts(&mut self, dst: K, elem: S::Elem) -> bool;

    /// Union `src`'s set into `dst`. Returns true if `dst` grew.
    fn union_pts(&mut self, dst: K, src: &K) -> bool;

    /// Union a raw set into `dst`. Returns true if `dst` grew.
    fn union_pts_set(&mut self, dst: K, src: &S) -> bool;

    /// Remove one element from `var`'s set.
    fn clear_pts(&mut self, var: &K, elem: S::Elem);

    /// Reset `var` to the empty set.
    fn clear_full_pts(&mut self, var: &K);

    /// Reuse concentration across this store's maps.
    fn top_n(&self, n: usize) -> SetUsage;

    /// Distinct set IDs across this store's maps.
    fn in_use_points_to_sets(&self) -> u64;
}

macro_rules! delegate_points_to_data {
    () => {
        #[inline]
        fn kind(&self) -> StoreKind {
            self.kind()
        }
        #[inline]
        fn clear(&mut self) {
            self.clear()
        }
        #[inline]
        fn pts_id(&self, var: &K) -> PointsToId {
            self.pts_id(var)
        }
        #[inline]
        fn get_pts(&self, var: &K) -> Ref<'_, S> {
            self.get_pts(var)
        }
        #[inline]
        fn get_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<K> {
            self.get_rev_pts(elem)
        }
        #[inline]
        fn add_pts(&mut self, dst: K, elem: S::Elem) -> bool {
            self.add_pts(dst, elem)
        }
        #[inline]
        fn union_pts(&mut self, dst: K, src: &K) -> bool {
            self.union_pts(dst, src)
        }
        #[inline]
        fn union_pts_set(&mut self, dst: K, src: &S) -> bool {
            self.union_pts_set(dst, src)
        }
        #[inline]
        fn clear_pts(&mut self, var: &K, elem: S::Elem) {
            self.clear_pts(var, elem)
        }
        #[inline]
        fn clear_full_pts(&mut self, var: &K) {
            self.clear_full_pts(var)
        }
        #[inline]
        fn top_n(&self, n: usize) -> SetUsage {
            self.top_n(n)
        }
        #[inline]
        fn in_use_points_to_sets(&self) -> u64 {
            self.in_use_points_to_sets()
        }
    };
}

impl<K, S> PointsToData<K, S> for BasePointsToStore<K, S>
where
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    delegate_points_to_data!();
}

impl<K, S> PointsToData<K, S> for DiffPointsToStore<K, S>
where
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    delegate_points_to_data!();
}

impl<L, K, S> PointsToData<K, S> for DataFlowPointsToStore<L, K, S>
where
    L: Copy + Eq + Hash,
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    delegate_points_to_data!();
}

impl<L, K, S> PointsToData<K, S> for IncrementalDataFlowPointsToStore<L, K, S>
where
    L: Copy + Eq + Hash,
    K: Copy + Eq + Hash,
    S: PointsToSet,
{
    delegate_points_to_data!();
}

/// The versioned store serves the common interface from its top-level
/// namespace; address-taken operations live on the concrete type.
impl<K, VK, S> PointsToData<K, S> for VersionedPointsToStore<K, VK, S>
where
    K: Copy + Eq + Hash,
    VK: Copy + Eq + Hash,
    S: PointsToSet,
{
    #[inline]
    fn kind(&self) -> StoreKind {
        self.kind()
    }

    #[inline]
    fn clear(&mut self) {
        self.clear()
    }

    #[inline]
    fn pts_id(&self, var: &K) -> PointsToId {
        self.tl_pts_id(var)
    }

    #[inline]
    fn get_pts(&self, var: &K) -> Ref<'_, S> {
        self.get_tl_pts(var)
    }

    #[inline]
    fn get_rev_pts(&mut self, elem: S::Elem) -> &FxHashSet<K> {
        self.get_tl_rev_pts(elem)
    }

    #[inline]
    fn add_pts(&mut self, dst: K, elem: S::Elem) -> bool {
        self.add_tl_pts(dst, elem)
    }

    #[inline]
    fn union_pts(&mut self, dst: K, src: &K) -> bool {
        self.union_tl_pts(dst, src)
    }

    #[inline]
    fn union_pts_set(&mut self, dst: K, src: &S) -> bool {
        self.union_tl_pts_set(dst, src)
    }

    #[inline]
    fn clear_pts(&mut self, var: &K, elem: S::Elem) {
        self.clear_tl_pts(var, elem)
    }

    #[inline]
    fn clear_full_pts(&mut self, var: &K) {
        self.clear_full_tl_pts(var)
    }

    #[inline]
    fn top_n(&self, n: usize) -> SetUsage {
        self.top_n(n)
    }

    #[inline]
    fn in_use_points_to_sets(&self) -> u64 {
        self.in_use_points_to_sets()
    }
}

/// Constructs stores over a shared cache.
pub struct StoreFactory;

impl StoreFactory {
    pub fn base<K, S>(cache: SharedPointsToCache<S>, reverse_pt: bool) -> BasePointsToStore<K, S>
    where
        K: Copy + Eq + Hash,
        S: PointsToSet,
    {
        BasePointsToStore::new(cache, reverse_pt)
    }

    pub fn diff<K, S>(cache: SharedPointsToCache<S>, reverse_pt: bool) -> DiffPointsToStore<K, S>
    where
        K: Copy + Eq + Hash,
        S: PointsToSet,
    {
        DiffPointsToStore::new(cache, reverse_pt)
    }

    pub fn data_flow<L, K, S>(cache: SharedPointsToCache<S>) -> DataFlowPointsToStore<L, K, S>
    where
        L: Copy + Eq + Hash,
        K: Copy + Eq + Hash,
        S: PointsToSet,
    {
        DataFlowPointsToStore::new(cache)
    }

    pub fn incremental<L, K, S>(
        cache: SharedPointsToCache<S>,
    ) -> IncrementalDataFlowPointsToStore<L, K, S>
    where
        L: Copy + Eq + Hash,
        K: Copy + Eq + Hash,
        S: PointsToSet,
    {
        IncrementalDataFlowPointsToStore::new(cache)
    }

    pub fn versioned<K, VK, S>(
        cache: SharedPointsToCache<S>,
        reverse_pt: bool,
    ) -> VersionedPointsToStore<K, VK, S>
    where
        K: Copy + Eq + Hash,
        VK: Copy + Eq + Hash,
        S: PointsToSet,
    {
        VersionedPointsToStore::new(cache, reverse_pt)
    }

    /// Build a store from `config` behind the common interface. `L` is the
    /// location type used when the configuration names a data-flow kind.
    ///
    /// Versioned stores cannot be built here — their second key namespace
    /// does not fit the single-key interface — and data-flow kinds reject
    /// reverse tracking via [`StoreConfig::validate`].
    pub fn create_boxed<L, K, S>(
        config: &StoreConfig,
        cache: SharedPointsToCache<S>,
    ) -> Result<Box<dyn PointsToData<K, S>>, StoreError>
    where
        L: Copy + Eq + Hash + 'static,
        K: Copy + Eq + Hash + 'static,
        S: PointsToSet + 'static,
    {
        config.validate()?;
        debug!(kind = ?config.kind, reverse_pt = config.reverse_pt, "constructing points-to store");

        match config.kind {
            StoreKind::Base => Ok(Box::new(Self::base::<K, S>(cache, config.reverse_pt))),
            StoreKind::Diff => Ok(Box::new(Self::diff::<K, S>(cache, config.reverse_pt))),
            StoreKind::DataFlow => Ok(Box::new(Self::data_flow::<L, K, S>(cache))),
            StoreKind::IncDataFlow => Ok(Box::new(Self::incremental::<L, K, S>(cache))),
            StoreKind::Versioned => Err(StoreError::VersionedKeysRequired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interning::domain::sparse_set::SparseNodeSet;

    type Boxed = Box<dyn PointsToData<u32, SparseNodeSet>>;

    fn boxed(kind: StoreKind, reverse_pt: bool) -> Result<Boxed, StoreError> {
        let config = StoreConfig::new(kind).with_reverse_pt(reverse_pt);
        StoreFactory::create_boxed::<u64, u32, SparseNodeSet>(&config, SharedPointsToCache::new())
    }

    #[test]
    fn test_boxed_kinds() {
        for kind in [
            StoreKind::Base,
            StoreKind::Diff,
            StoreKind::DataFlow,
            StoreKind::IncDataFlow,
        ] {
            let reverse = kind.supports_reverse();
            let store = boxed(kind, reverse).unwrap();
            assert_eq!(store.kind(), kind);
        }
    }

    #[test]
    fn test_boxed_store_is_usable() {
        let mut store = boxed(StoreKind::Base, true).unwrap();
        assert!(store.add_pts(1, 10));
        assert!(store.union_pts(2, &1));
        assert_eq!(store.get_pts(&2).iter().collect::<Vec<_>>(), vec![10]);
        assert_eq!(store.pts_id(&1), store.pts_id(&2));
    }

    #[test]
    fn test_reverse_on_data_flow_is_rejected() {
        assert_eq!(
            boxed(StoreKind::DataFlow, true).err(),
            Some(StoreError::ReverseUnsupported {
                kind: StoreKind::DataFlow
            })
        );
    }

    #[test]
    fn test_versioned_needs_explicit_keys() {
        assert_eq!(
            boxed(StoreKind::Versioned, false).err(),
            Some(StoreError::VersionedKeysRequired)
        );
    }

    #[test]
    fn test_trait_surface_on_versioned_store() {
        let mut store: VersionedPointsToStore<u32, (u32, u32), SparseNodeSet> =
            StoreFactory::versioned(SharedPointsToCache::new(), true);
        // The common interface addresses the top-level namespace.
        assert!(PointsToData::add_pts(&mut store, 1, 10));
        assert_eq!(PointsToData::get_pts(&store, &1).len(), 1);
        assert_eq!(PointsToData::kind(&store), StoreKind::Versioned);
    }

    #[test]
    fn test_shared_cache_across_boxed_stores() {
        let cache = SharedPointsToCache::new();
        let config = StoreConfig::default();
        let mut a: Boxed =
            StoreFactory::create_boxed::<u64, u32, SparseNodeSet>(&config, cache.clone()).unwrap();
        let mut b: Boxed =
            StoreFactory::create_boxed::<u64, u32, SparseNodeSet>(&config, cache.clone()).unwrap();

        a.add_pts(1, 10);
        b.add_pts(2, 10);
        assert_eq!(a.pts_id(&1), b.pts_id(&2));
        assert_eq!(cache.len(), 2);
    }
}
