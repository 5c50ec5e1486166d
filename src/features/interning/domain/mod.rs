//! Domain models for set interning:
//! - PointsToId: stable identifier of one interned set
//! - PointsToSet: the abstract set plug-in contract
//! - SparseNodeSet: default sorted-vector implementation

pub mod points_to_set;
pub mod sparse_set;

pub use points_to_set::{NodeId, PointsToId, PointsToSet};
pub use sparse_set::SparseNodeSet;
