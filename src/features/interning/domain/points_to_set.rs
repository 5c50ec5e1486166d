//! Abstract points-to set seam
//!
//! The stores never commit to a concrete set encoding. Anything that can
//! report equality, hash itself, iterate, and compute union / intersection /
//! difference plugs in through [`PointsToSet`]; the interning cache handles
//! everything else. [`SparseNodeSet`](super::sparse_set::SparseNodeSet) is
//! the default implementation.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Opaque identifier of an abstract memory object.
pub type NodeId = u32;

/// Identifier of one interned points-to set.
///
/// IDs are assigned monotonically by the cache and are never reused within
/// an analysis run. Two IDs are equal iff the sets they denote are equal,
/// so set comparison collapses to integer comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PointsToId(u32);

impl PointsToId {
    /// The unique empty set. Every cache hands out ID 0 for it.
    pub const EMPTY: PointsToId = PointsToId(0);

    /// Whether this ID denotes the empty set.
    #[inline]
    pub fn is_empty_set(self) -> bool {
        self == Self::EMPTY
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        PointsToId(u32::try_from(index).expect("points-to cache exhausted the u32 id space"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PointsToId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pts#{}", self.0)
    }
}

/// Contract the interning cache requires from a set representation.
///
/// Implementations are immutable values: every operation returns a fresh
/// set, which the cache then deduplicates. `Eq` and `Hash` must agree with
/// set equality (two sets with the same elements hash identically), since
/// the cache keys its intern table on the value itself.
pub trait PointsToSet: Clone + Default + Eq + Hash {
    /// Element type (an abstract memory object identifier).
    type Elem: Copy + Eq + Hash;

    /// Iterator over the elements.
    type Iter<'a>: Iterator<Item = Self::Elem>
    where
        Self: 'a;

    /// The one-element set `{elem}`.
    fn singleton(elem: Self::Elem) -> Self;

    fn contains(&self, elem: Self::Elem) -> bool;

    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> Self::Iter<'_>;

    /// `self ∪ other` as a new set.
    fn union(&self, other: &Self) -> Self;

    /// `self ∩ other` as a new set.
    fn intersect(&self, other: &Self) -> Self;

    /// `self ∖ other` as a new set.
    fn difference(&self, other: &Self) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_id() {
        assert!(PointsToId::EMPTY.is_empty_set());
        assert_eq!(PointsToId::from_index(0), PointsToId::EMPTY);
        assert!(!PointsToId::from_index(1).is_empty_set());
    }

    #[test]
    fn test_id_ordering_follows_assignment() {
        let a = PointsToId::from_index(3);
        let b = PointsToId::from_index(7);
        assert!(a < b);
        assert_eq!(b.index(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PointsToId::from_index(42)), "pts#42");
    }
}
