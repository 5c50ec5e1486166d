//! # Persistent Points-To Stores
//!
//! The store family a pointer-analysis solver drives:
//! - **Base**: key → interned set ID, with optional reverse tracking
//! - **Diff**: propagated-vs-new sets for propagation-based solvers
//! - **DataFlow**: per-location IN/OUT state for flow-sensitive analysis
//! - **IncDataFlow**: data-flow plus updated-variable change tracking
//! - **Versioned**: top-level and SSA-versioned address-taken namespaces
//!
//! Every mutation resolves to a handful of cache queries returning new IDs
//! and an update to a key→ID mapping; set material is never copied between
//! stores.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{SetUsage, StoreConfig, StoreKind};
pub use infrastructure::{
    BasePointsToStore, DataFlowPointsToStore, DiffPointsToStore,
    IncrementalDataFlowPointsToStore, VersionedPointsToStore,
};
pub use ports::{PointsToData, StoreFactory};
