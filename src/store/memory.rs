//! In-memory node store
//!
//! Backs the test suite and embedders that do not need durability. A single
//! `RwLock` over the node table gives every write the atomicity the trait
//! demands; the version counter provides the optimistic check that rejects
//! stale move batches.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entity::Department;
use crate::error::{HierarchyError, HierarchyResult};
use crate::path;
use crate::store::{NodeStore, PathUpdate};

#[derive(Default)]
struct Inner {
    nodes: BTreeMap<i64, Department>,
    next_id: i64,
    version: u64,
}

/// RwLock-guarded node table with a monotonic write counter.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                nodes: BTreeMap::new(),
                next_id: 1,
                version: 0,
            }),
        }
    }

    /// Number of stored nodes.
    pub async fn len(&self) -> usize {
        self.inner.read().await.nodes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.nodes.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStore for InMemoryStore {
    async fn get(&self, id: i64) -> HierarchyResult<Option<Department>> {
        Ok(self.inner.read().await.nodes.get(&id).cloned())
    }

    async fn get_by_parent(&self, parent_id: Option<i64>) -> HierarchyResult<Vec<Department>> {
        let inner = self.inner.read().await;
        let mut children: Vec<Department> = inner
            .nodes
            .values()
            .filter(|n| n.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by_key(|n| (n.sort_order, n.id));
        Ok(children)
    }

    async fn get_by_code(&self, code: &str) -> HierarchyResult<Option<Department>> {
        let inner = self.inner.read().await;
        Ok(inner.nodes.values().find(|n| n.code == code).cloned())
    }

    async fn scan_by_path_prefix(&self, prefix: &str) -> HierarchyResult<Vec<Department>> {
        let inner = self.inner.read().await;
        let mut matched: Vec<Department> = inner
            .nodes
            .values()
            .filter(|n| n.path == prefix || path::is_prefix_of(prefix, &n.path))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(matched)
    }

    async fn all(&self) -> HierarchyResult<Vec<Department>> {
        Ok(self.inner.read().await.nodes.values().cloned().collect())
    }

    async fn version(&self) -> HierarchyResult<u64> {
        Ok(self.inner.read().await.version)
    }

    async fn allocate_id(&self) -> HierarchyResult<i64> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        Ok(id)
    }

    async fn create(&self, node: Department) -> HierarchyResult<Department> {
        let mut inner = self.inner.write().await;
        if inner.nodes.contains_key(&node.id) {
            return Err(HierarchyError::Internal(format!(
                "duplicate node id on insert: {}",
                node.id
            )));
        }
        // Keep the allocator ahead of externally chosen ids
        if node.id >= inner.next_id {
            inner.next_id = node.id + 1;
        }
        inner.nodes.insert(node.id, node.clone());
        inner.version += 1;
        Ok(node)
    }

    async fn save(&self, node: Department) -> HierarchyResult<Department> {
        let mut inner = self.inner.write().await;
        if !inner.nodes.contains_key(&node.id) {
            return Err(HierarchyError::NodeNotFound(node.id));
        }
        inner.nodes.insert(node.id, node.clone());
        inner.version += 1;
        Ok(node)
    }

    async fn batch_update_path_level(
        &self,
        updates: &[PathUpdate],
        expected_version: u64,
    ) -> HierarchyResult<()> {
        let mut inner = self.inner.write().await;
        if inner.version != expected_version {
            return Err(HierarchyError::ConcurrentModification);
        }
        // Verify the whole batch before touching anything
        for update in updates {
            if !inner.nodes.contains_key(&update.id) {
                return Err(HierarchyError::NodeNotFound(update.id));
            }
        }
        for update in updates {
            let node = inner
                .nodes
                .get_mut(&update.id)
                .ok_or(HierarchyError::NodeNotFound(update.id))?;
            node.parent_id = update.parent_id;
            node.path = update.path.clone();
            node.level = update.level;
        }
        inner.version += 1;
        Ok(())
    }

    async fn delete(&self, id: i64) -> HierarchyResult<()> {
        let mut inner = self.inner.write().await;
        if inner.nodes.remove(&id).is_none() {
            return Err(HierarchyError::NodeNotFound(id));
        }
        inner.version += 1;
        Ok(())
    }
}
