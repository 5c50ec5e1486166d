//! Store kinds and configuration
//!
//! Every store carries a [`StoreKind`] tag so a solver holding stores
//! polymorphically can discriminate without reflection; the tag is
//! authoritative for downcasts.

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// Which flavour of persistent points-to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKind {
    /// Plain key → points-to mapping with optional reverse tracking.
    Base,
    /// Base plus propagated/new diff tracking.
    Diff,
    /// Per-location IN/OUT maps for flow-sensitive analysis.
    DataFlow,
    /// Data-flow store that also tracks which variables changed where.
    IncDataFlow,
    /// Two key namespaces (top-level and versioned address-taken) over one
    /// cache.
    Versioned,
}

impl StoreKind {
    /// Whether this kind can answer reverse points-to queries at all.
    /// Data-flow stores never do.
    #[inline]
    pub fn supports_reverse(self) -> bool {
        !matches!(self, StoreKind::DataFlow | StoreKind::IncDataFlow)
    }
}

/// Construction-time options for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Maintain element → keys reverse maps. Reverse queries on a store
    /// built without them are fatal.
    pub reverse_pt: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Base,
            reverse_pt: true,
        }
    }
}

impl StoreConfig {
    pub fn new(kind: StoreKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_reverse_pt(mut self, reverse_pt: bool) -> Self {
        self.reverse_pt = reverse_pt;
        self
    }

    /// Reject combinations the stores cannot honour.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.reverse_pt && !self.kind.supports_reverse() {
            return Err(StoreError::ReverseUnsupported { kind: self.kind });
        }
        Ok(())
    }
}
