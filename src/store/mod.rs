//! Node store abstraction
//!
//! Persistence boundary for the hierarchy engine. The engine owns tree
//! consistency; implementations own durability and must honor the atomicity
//! contract of [`NodeStore::batch_update_path_level`].

pub mod memory;

use async_trait::async_trait;

use crate::entity::Department;
use crate::error::HierarchyResult;

pub use memory::InMemoryStore;

/// One row of an atomic path rewrite batch.
///
/// `parent_id` is written as given: the moved node carries its new parent,
/// descendants carry their unchanged one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathUpdate {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub path: String,
    pub level: i32,
}

/// Persistence abstraction for department nodes.
///
/// Writes must be serialized against each other by the implementation.
/// Readers may observe the pre- or post-state of any write but never a
/// partially applied batch.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Fetch a single node by id.
    async fn get(&self, id: i64) -> HierarchyResult<Option<Department>>;

    /// Fetch the children of a node (`None` = roots), ordered by
    /// `sort_order` then `id`.
    async fn get_by_parent(&self, parent_id: Option<i64>) -> HierarchyResult<Vec<Department>>;

    /// Fetch a node by its unique code, disabled nodes included.
    async fn get_by_code(&self, code: &str) -> HierarchyResult<Option<Department>>;

    /// Fetch the node whose path equals `prefix` plus every node below it,
    /// ordered by path.
    async fn scan_by_path_prefix(&self, prefix: &str) -> HierarchyResult<Vec<Department>>;

    /// Fetch every node, ordered by id.
    async fn all(&self) -> HierarchyResult<Vec<Department>>;

    /// Current value of the store's monotonic write counter.
    async fn version(&self) -> HierarchyResult<u64>;

    /// Reserve a fresh node id so the caller can derive the self-inclusive
    /// path before inserting.
    async fn allocate_id(&self) -> HierarchyResult<i64>;

    /// Insert a new node.
    async fn create(&self, node: Department) -> HierarchyResult<Department>;

    /// Overwrite an existing node. Fails with `NodeNotFound` if absent.
    async fn save(&self, node: Department) -> HierarchyResult<Department>;

    /// Apply a path/level rewrite batch atomically.
    ///
    /// Fails with `ConcurrentModification` (writing nothing) when the write
    /// counter no longer equals `expected_version`.
    async fn batch_update_path_level(
        &self,
        updates: &[PathUpdate],
        expected_version: u64,
    ) -> HierarchyResult<()>;

    /// Remove a node. Fails with `NodeNotFound` if absent.
    async fn delete(&self, id: i64) -> HierarchyResult<()>;
}
