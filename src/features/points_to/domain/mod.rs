//! Domain models for the store family:
//! - StoreKind / StoreConfig: kind tags and construction options
//! - SetUsage: set-reuse accounting shared by every store

pub mod kind;
pub mod usage;

pub use kind::{StoreConfig, StoreKind};
pub use usage::SetUsage;
