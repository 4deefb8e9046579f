//! Orgtree - organizational hierarchy engine
//!
//! Maintains a department tree using a materialized-path encoding: every
//! node carries the `/`-delimited chain of its ancestor ids, which makes
//! subtree queries a prefix scan and makes moving a subtree a single atomic
//! batch of path rewrites. Persistence, the employee directory and the
//! cache are pluggable collaborators behind traits.

pub mod cache;
pub mod config;
pub mod directory;
pub mod entity;
pub mod error;
pub mod path;
pub mod query;
pub mod service;
pub mod store;
pub mod validate;

// Re-export commonly used types
pub use config::Config;
pub use entity::{Department, DepartmentTree};
pub use error::{HierarchyError, HierarchyResult};
pub use query::{DepartmentStatistics, QueryEngine};
pub use service::{CreateDepartment, HierarchyService, UpdateDepartment};
pub use store::{InMemoryStore, NodeStore, PathUpdate};
