//! Set-reuse accounting
//!
//! Interning pays off exactly as much as sets are shared; these helpers
//! quantify that sharing across any collection of key→ID maps.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::features::interning::domain::points_to_set::PointsToId;

/// How concentrated set reuse is across a store's maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetUsage {
    /// Sum of the occurrence counts of the `n` most common non-empty sets.
    pub top_sum: u64,
    /// Number of keys mapped to a non-empty set.
    pub keys: u64,
}

/// Count how often each non-empty ID occurs in `ids` and sum the top `n`
/// counts. Empty mappings are ignored; they carry no set material.
pub fn top_n(ids: impl IntoIterator<Item = PointsToId>, n: usize) -> SetUsage {
    let mut occurrences: FxHashMap<PointsToId, u64> = FxHashMap::default();
    let mut keys = 0u64;
    for id in ids {
        if !id.is_empty_set() {
            *occurrences.entry(id).or_default() += 1;
            keys += 1;
        }
    }

    let mut counts: Vec<u64> = occurrences.into_values().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    SetUsage {
        top_sum: counts.iter().take(n).sum(),
        keys,
    }
}

/// Number of distinct IDs appearing in `ids`.
pub fn in_use(ids: impl IntoIterator<Item = PointsToId>) -> u64 {
    let distinct: FxHashSet<PointsToId> = ids.into_iter().collect();
    distinct.len() as u64
}
