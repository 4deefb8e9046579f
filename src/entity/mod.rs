//! Entity module
//!
//! Plain data models exposed by the hierarchy engine. No framework types
//! leak through this boundary; storage adapters map these to their own rows.

pub mod department;

pub use department::{Department, DepartmentTree};
