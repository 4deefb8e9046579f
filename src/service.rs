//! Hierarchy service
//!
//! The only component that writes to the tree. Every mutation validates
//! first, then applies its changes through the store, then notifies the
//! cache invalidator. Derived fields (`path`, `level`, `has_children`)
//! are computed here and nowhere else.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::CacheInvalidator;
use crate::config::Config;
use crate::directory::EmployeeDirectory;
use crate::entity::Department;
use crate::error::{HierarchyError, HierarchyResult, OptionExt};
use crate::path;
use crate::store::{NodeStore, PathUpdate};
use crate::validate::ConsistencyValidator;

/// Create request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
    pub code: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<i64>,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: i32,
    #[serde(rename = "managerId")]
    pub manager_id: Option<i64>,
}

/// Update request; every field is optional, absent fields stay unchanged.
/// Structural fields (parent, path, level) are deliberately not here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<i32>,
    /// `Some(None)` clears the manager
    #[serde(rename = "managerId", default)]
    pub manager_id: Option<Option<i64>>,
    pub enabled: Option<bool>,
}

pub struct HierarchyService {
    store: Arc<dyn NodeStore>,
    cache: Arc<dyn CacheInvalidator>,
    validator: ConsistencyValidator,
    /// Moves hold this shared, rebuild_paths exclusively.
    structural: RwLock<()>,
    config: Config,
}

impl HierarchyService {
    pub fn new(
        store: Arc<dyn NodeStore>,
        directory: Arc<dyn EmployeeDirectory>,
        cache: Arc<dyn CacheInvalidator>,
        config: Config,
    ) -> Self {
        let validator = ConsistencyValidator::new(store.clone(), directory);
        Self {
            store,
            cache,
            validator,
            structural: RwLock::new(()),
            config,
        }
    }

    /// Create a department under the given parent (or as a new root).
    pub async fn create(&self, req: CreateDepartment, actor: &str) -> HierarchyResult<Department> {
        self.check_name(&req.name)?;
        let parent = self.validator.validate_create(req.parent_id, &req.code).await?;
        if let Some(manager_id) = req.manager_id {
            self.validator.validate_manager(manager_id).await?;
        }

        let level = parent.as_ref().map(|p| p.level + 1).unwrap_or(0);
        self.check_depth(level)?;

        let id = self.store.allocate_id().await?;
        let node_path = path::append(parent.as_ref().map(|p| p.path.as_str()), id);
        let now = Utc::now();
        let node = Department {
            id,
            name: req.name,
            code: req.code,
            parent_id: req.parent_id,
            path: node_path,
            level,
            has_children: false,
            sort_order: req.sort_order,
            manager_id: req.manager_id,
            enabled: true,
            created_at: now,
            updated_at: now,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        };
        let node = self.store.create(node).await?;

        if let Some(parent) = parent {
            // validation snapshot may be stale; set_has_children re-reads
            self.set_has_children(parent.id, true, actor).await?;
            self.cache.invalidate_subtree(parent.id);
        }

        info!("Created department {} ({}) at {}", node.id, node.code, node.path);
        Ok(node)
    }

    /// Apply non-structural field changes. Never touches path or level.
    pub async fn update(
        &self,
        id: i64,
        req: UpdateDepartment,
        actor: &str,
    ) -> HierarchyResult<Department> {
        let mut node = self.store.get(id).await?.ok_or_node_not_found(id)?;

        if let Some(name) = req.name {
            self.check_name(&name)?;
            node.name = name;
        }
        if let Some(code) = req.code {
            if code != node.code {
                self.validator.validate_code_change(id, &code).await?;
            }
            node.code = code;
        }
        if let Some(sort_order) = req.sort_order {
            node.sort_order = sort_order;
        }
        if let Some(manager) = req.manager_id {
            if let Some(manager_id) = manager {
                self.validator.validate_manager(manager_id).await?;
            }
            node.manager_id = manager;
        }
        if let Some(enabled) = req.enabled {
            node.enabled = enabled;
        }

        node.updated_at = Utc::now();
        node.updated_by = actor.to_string();
        let node = self.store.save(node).await?;

        self.cache.invalidate_subtree(node.id);
        info!("Updated department {} ({})", node.id, node.code);
        Ok(node)
    }

    /// Move a subtree under a new parent (`None` = promote to root).
    ///
    /// Retries internally a bounded number of times when the optimistic
    /// version check loses to a racing write, then surfaces
    /// `ConcurrentModification` for the caller to retry.
    pub async fn move_department(
        &self,
        node_id: i64,
        new_parent_id: Option<i64>,
        actor: &str,
    ) -> HierarchyResult<()> {
        let _structural = self.structural.read().await;

        let mut attempt = 0;
        loop {
            match self.try_move(node_id, new_parent_id, actor).await {
                Err(HierarchyError::ConcurrentModification)
                    if attempt < self.config.move_retry_limit =>
                {
                    attempt += 1;
                    warn!(
                        "Move of department {} lost an optimistic write race, retrying ({}/{})",
                        node_id, attempt, self.config.move_retry_limit
                    );
                }
                other => return other,
            }
        }
    }

    async fn try_move(
        &self,
        node_id: i64,
        new_parent_id: Option<i64>,
        actor: &str,
    ) -> HierarchyResult<()> {
        let snapshot_version = self.store.version().await?;
        let (node, new_parent) = self.validator.validate_move(node_id, new_parent_id).await?;

        if node.parent_id == new_parent_id {
            debug!("Department {} already under {:?}, nothing to move", node_id, new_parent_id);
            return Ok(());
        }

        let old_parent_id = node.parent_id;
        let old_path = node.path;
        let new_node_path = path::append(new_parent.as_ref().map(|p| p.path.as_str()), node_id);

        // The scan includes the node itself; its suffix is empty.
        let subtree = self.store.scan_by_path_prefix(&old_path).await?;
        let mut updates = Vec::with_capacity(subtree.len());
        for member in &subtree {
            let member_path = format!("{}{}", new_node_path, &member.path[old_path.len()..]);
            let level = path::level_of(&member_path)?;
            self.check_depth(level)?;
            updates.push(PathUpdate {
                id: member.id,
                parent_id: if member.id == node_id {
                    new_parent_id
                } else {
                    member.parent_id
                },
                path: member_path,
                level,
            });
        }

        self.store
            .batch_update_path_level(&updates, snapshot_version)
            .await?;

        if let Some(old_parent_id) = old_parent_id {
            self.refresh_has_children(old_parent_id, actor).await?;
        }
        if let Some(new_parent_id) = new_parent.map(|p| p.id) {
            self.set_has_children(new_parent_id, true, actor).await?;
        }

        self.cache.invalidate_subtree(old_parent_id.unwrap_or(node_id));
        self.cache.invalidate_subtree(new_parent_id.unwrap_or(node_id));
        info!(
            "Moved department {} under {:?}, rewrote {} paths",
            node_id,
            new_parent_id,
            updates.len()
        );
        Ok(())
    }

    /// Delete a childless, unassigned department.
    pub async fn delete(&self, id: i64, actor: &str) -> HierarchyResult<()> {
        let node = self.validator.validate_delete(id).await?;
        self.store.delete(id).await?;

        if let Some(parent_id) = node.parent_id {
            self.refresh_has_children(parent_id, actor).await?;
        }

        self.cache.invalidate_subtree(node.parent_id.unwrap_or(id));
        info!("Deleted department {} ({})", id, node.code);
        Ok(())
    }

    /// Recompute path and level for the whole forest from parent links.
    ///
    /// Maintenance operation for repairing drift after bulk loads. Each
    /// root's subtree is rewritten as its own atomic batch, so the walk can
    /// be interrupted between subtrees without leaving a half-rebuilt one.
    /// Refuses to run while another rebuild or a move holds the tree.
    pub async fn rebuild_paths(&self) -> HierarchyResult<usize> {
        let _structural = self
            .structural
            .try_write()
            .map_err(|_| HierarchyError::RebuildInProgress)?;

        let roots = self.store.get_by_parent(None).await?;
        let mut rewritten = 0;

        for root in roots {
            let snapshot_version = self.store.version().await?;
            let root_id = root.id;
            let mut updates = Vec::new();
            let mut queue: VecDeque<(Department, Option<String>)> =
                VecDeque::from([(root, None)]);

            while let Some((node, parent_path)) = queue.pop_front() {
                let node_path = path::append(parent_path.as_deref(), node.id);
                let level = path::level_of(&node_path)?;
                for child in self.store.get_by_parent(Some(node.id)).await? {
                    queue.push_back((child, Some(node_path.clone())));
                }
                updates.push(PathUpdate {
                    id: node.id,
                    parent_id: node.parent_id,
                    path: node_path,
                    level,
                });
            }

            self.store
                .batch_update_path_level(&updates, snapshot_version)
                .await?;
            self.cache.invalidate_subtree(root_id);
            rewritten += updates.len();
        }

        info!("Rebuilt materialized paths for {} departments", rewritten);
        Ok(rewritten)
    }

    async fn set_has_children(&self, id: i64, value: bool, actor: &str) -> HierarchyResult<()> {
        let mut node = self.store.get(id).await?.ok_or_parent_not_found(id)?;
        if node.has_children != value {
            node.has_children = value;
            node.updated_at = Utc::now();
            node.updated_by = actor.to_string();
            self.store.save(node).await?;
        }
        Ok(())
    }

    async fn refresh_has_children(&self, id: i64, actor: &str) -> HierarchyResult<()> {
        let children = self.store.get_by_parent(Some(id)).await?;
        self.set_has_children(id, !children.is_empty(), actor).await
    }

    fn check_name(&self, name: &str) -> HierarchyResult<()> {
        if name.trim().is_empty() {
            return Err(HierarchyError::InvalidName("name must not be empty".to_string()));
        }
        if name.chars().count() > self.config.max_name_len {
            return Err(HierarchyError::InvalidName(format!(
                "name exceeds {} characters",
                self.config.max_name_len
            )));
        }
        Ok(())
    }

    fn check_depth(&self, level: i32) -> HierarchyResult<()> {
        if self.config.max_depth > 0 && level + 1 > self.config.max_depth {
            return Err(HierarchyError::MaxDepthExceeded(self.config.max_depth));
        }
        Ok(())
    }
}
