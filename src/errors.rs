//! Error types for `pta-store`
//!
//! Store operations themselves never return recoverable errors: missing
//! keys read as empty, and precondition violations (reverse queries on a
//! store without reverse support) are programmer errors that abort with a
//! diagnostic. What remains fallible is the configuration surface.

use thiserror::Error;

use crate::features::points_to::domain::kind::StoreKind;

/// Errors from store configuration and construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Reverse points-to tracking requested on a kind that never answers
    /// reverse queries.
    #[error("reverse points-to tracking is not supported by {kind:?} stores")]
    ReverseUnsupported { kind: StoreKind },

    /// Versioned stores carry two key namespaces and cannot be built
    /// behind the single-key polymorphic interface.
    #[error("versioned stores take two key types; construct them with StoreFactory::versioned")]
    VersionedKeysRequired,
}
