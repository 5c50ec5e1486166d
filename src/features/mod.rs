//! Feature modules:
//! - interning: hash-consed set storage and memoised set algebra
//! - points_to: the store family built on top of it

pub mod interning;
pub mod points_to;
