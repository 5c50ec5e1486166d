//! Store implementations over the shared interning cache:
//! - BasePointsToStore: key → set ID, optional reverse index
//! - DiffPointsToStore: base plus propagated/new diff tracking
//! - DataFlowPointsToStore: per-location IN/OUT state
//! - IncrementalDataFlowPointsToStore: DF plus updated-variable sets
//! - VersionedPointsToStore: top-level and versioned namespaces

pub mod base_store;
pub mod data_flow_store;
pub mod diff_store;
pub mod incremental_store;
pub mod versioned_store;

pub use base_store::BasePointsToStore;
pub use data_flow_store::DataFlowPointsToStore;
pub use diff_store::DiffPointsToStore;
pub use incremental_store::IncrementalDataFlowPointsToStore;
pub use versioned_store::VersionedPointsToStore;
