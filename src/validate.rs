//! Pre-mutation invariant checks
//!
//! Each check reads a snapshot through the store and decides whether the
//! requested mutation keeps the tree consistent. Nothing here writes.

use std::sync::Arc;

use crate::directory::EmployeeDirectory;
use crate::entity::Department;
use crate::error::{HierarchyError, HierarchyResult, OptionExt};
use crate::path;
use crate::store::NodeStore;

pub struct ConsistencyValidator {
    store: Arc<dyn NodeStore>,
    directory: Arc<dyn EmployeeDirectory>,
}

impl ConsistencyValidator {
    pub fn new(store: Arc<dyn NodeStore>, directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self { store, directory }
    }

    /// Check a pending create: the parent (if any) must exist and be
    /// enabled, the code must be unused. Returns the resolved parent.
    pub async fn validate_create(
        &self,
        parent_id: Option<i64>,
        code: &str,
    ) -> HierarchyResult<Option<Department>> {
        let parent = match parent_id {
            Some(pid) => {
                let parent = self.store.get(pid).await?.ok_or_parent_not_found(pid)?;
                if !parent.enabled {
                    return Err(HierarchyError::ParentNotFound(pid));
                }
                Some(parent)
            }
            None => None,
        };

        self.ensure_code_unused(code, None).await?;
        Ok(parent)
    }

    /// Check a code change on an existing node.
    pub async fn validate_code_change(&self, id: i64, code: &str) -> HierarchyResult<()> {
        self.ensure_code_unused(code, Some(id)).await
    }

    /// Check a pending move. The target parent must exist and must not lie
    /// inside the moved subtree. Returns the node and the resolved target.
    pub async fn validate_move(
        &self,
        node_id: i64,
        new_parent_id: Option<i64>,
    ) -> HierarchyResult<(Department, Option<Department>)> {
        let node = self.store.get(node_id).await?.ok_or_node_not_found(node_id)?;

        let new_parent = match new_parent_id {
            Some(pid) => {
                if pid == node_id {
                    return Err(HierarchyError::CircularReference {
                        node_id,
                        target_id: pid,
                    });
                }
                let parent = self.store.get(pid).await?.ok_or_parent_not_found(pid)?;
                // The target's current path must not extend the node's own
                // path, otherwise the node would end up under itself.
                if path::is_prefix_of(&node.path, &parent.path) {
                    return Err(HierarchyError::CircularReference {
                        node_id,
                        target_id: pid,
                    });
                }
                Some(parent)
            }
            None => None,
        };

        Ok((node, new_parent))
    }

    /// Check a pending delete: no children, no assigned employees.
    /// Returns the node slated for removal.
    pub async fn validate_delete(&self, node_id: i64) -> HierarchyResult<Department> {
        let node = self.store.get(node_id).await?.ok_or_node_not_found(node_id)?;

        if node.has_children {
            return Err(HierarchyError::HasChildren(node_id));
        }

        let employees = self.directory.count_assigned(node_id).await?;
        if employees > 0 {
            return Err(HierarchyError::InUse {
                id: node_id,
                employees,
            });
        }

        Ok(node)
    }

    /// Check a manager assignment against the employee directory.
    pub async fn validate_manager(&self, manager_id: i64) -> HierarchyResult<()> {
        if !self.directory.is_valid_person(manager_id).await? {
            return Err(HierarchyError::InvalidManager(manager_id));
        }
        Ok(())
    }

    async fn ensure_code_unused(&self, code: &str, allow_id: Option<i64>) -> HierarchyResult<()> {
        if let Some(existing) = self.store.get_by_code(code).await? {
            if Some(existing.id) != allow_id {
                return Err(HierarchyError::DuplicateCode(code.to_string()));
            }
        }
        Ok(())
    }
}
