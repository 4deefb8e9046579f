//! Read-only tree traversal
//!
//! Everything here goes through the store (or a cache in front of it) and
//! never mutates. The store's atomic batch guarantee means these reads see
//! either the pre- or post-state of a move, never a half-rewritten subtree.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::entity::{Department, DepartmentTree};
use crate::error::{HierarchyResult, OptionExt};
use crate::path;
use crate::store::NodeStore;

/// Aggregate statistics for one department
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentStatistics {
    #[serde(rename = "directChildren")]
    pub direct_children: usize,
    #[serde(rename = "totalDescendants")]
    pub total_descendants: usize,
    /// Deepest descendant level relative to this department (0 = leaf)
    #[serde(rename = "maxDepth")]
    pub max_depth: i32,
    #[serde(rename = "hasManager")]
    pub has_manager: bool,
}

pub struct QueryEngine {
    store: Arc<dyn NodeStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store }
    }

    /// Fetch a single department.
    pub async fn get(&self, id: i64) -> HierarchyResult<Department> {
        self.store.get(id).await?.ok_or_node_not_found(id)
    }

    /// Every department, ordered by id.
    pub async fn list_all(&self) -> HierarchyResult<Vec<Department>> {
        self.store.all().await
    }

    /// Direct children ordered by sort_order.
    pub async fn get_children(&self, parent_id: i64) -> HierarchyResult<Vec<Department>> {
        self.store.get_by_parent(Some(parent_id)).await
    }

    /// Root departments ordered by sort_order.
    pub async fn get_roots(&self) -> HierarchyResult<Vec<Department>> {
        self.store.get_by_parent(None).await
    }

    /// The department and all its descendants as a nested tree.
    ///
    /// One prefix scan, then in-memory grouping by parent; no recursive
    /// store round-trips.
    pub async fn get_subtree(&self, root_id: i64) -> HierarchyResult<DepartmentTree> {
        let root = self.get(root_id).await?;
        let nodes = self.store.scan_by_path_prefix(&root.path).await?;

        let mut by_parent: HashMap<i64, Vec<Department>> = HashMap::new();
        for node in nodes {
            if node.id == root_id {
                continue;
            }
            if let Some(parent_id) = node.parent_id {
                by_parent.entry(parent_id).or_default().push(node);
            }
        }
        for children in by_parent.values_mut() {
            children.sort_by_key(|n| (n.sort_order, n.id));
        }

        Ok(Self::assemble(root, &mut by_parent))
    }

    fn assemble(node: Department, by_parent: &mut HashMap<i64, Vec<Department>>) -> DepartmentTree {
        let children = by_parent.remove(&node.id).unwrap_or_default();
        let mut tree = DepartmentTree::from(node);
        tree.children = children
            .into_iter()
            .map(|child| Self::assemble(child, by_parent))
            .collect();
        tree
    }

    /// Ancestors of a department in root-to-parent order, self excluded.
    pub async fn get_ancestors(&self, id: i64) -> HierarchyResult<Vec<Department>> {
        let node = self.get(id).await?;
        let chain = path::decode(&node.path)?;

        let mut ancestors = Vec::with_capacity(chain.len().saturating_sub(1));
        for ancestor_id in chain.into_iter().filter(|aid| *aid != id) {
            let ancestor = self.get(ancestor_id).await?;
            ancestors.push(ancestor);
        }
        Ok(ancestors)
    }

    /// Flat, path-ordered list of all descendants, self excluded.
    pub async fn get_descendants(&self, id: i64) -> HierarchyResult<Vec<Department>> {
        let node = self.get(id).await?;
        let mut nodes = self.store.scan_by_path_prefix(&node.path).await?;
        nodes.retain(|n| n.id != id);
        Ok(nodes)
    }

    /// Child/descendant counts and depth for one department.
    pub async fn get_statistics(&self, id: i64) -> HierarchyResult<DepartmentStatistics> {
        let node = self.get(id).await?;
        let descendants = self.get_descendants(id).await?;

        let direct_children = descendants
            .iter()
            .filter(|n| n.parent_id == Some(id))
            .count();
        let max_depth = descendants
            .iter()
            .map(|n| n.level - node.level)
            .max()
            .unwrap_or(0);

        Ok(DepartmentStatistics {
            direct_children,
            total_descendants: descendants.len(),
            max_depth,
            has_manager: node.manager_id.is_some(),
        })
    }

    /// Human-readable ancestor chain, e.g. `"Company/Engineering/Platform"`.
    pub async fn name_path(&self, id: i64) -> HierarchyResult<String> {
        let node = self.get(id).await?;
        let chain = path::decode(&node.path)?;

        let mut names = Vec::with_capacity(chain.len());
        for ancestor_id in chain {
            if ancestor_id == id {
                names.push(node.name.clone());
            } else {
                names.push(self.get(ancestor_id).await?.name);
            }
        }
        Ok(names.join("/"))
    }
}
