//! Department entity
//!
//! A node in the organizational tree. `path`, `level` and `has_children`
//! are projections owned by the hierarchy service; callers never set them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,

    /// Display name, not unique
    pub name: String,

    /// Short identifier, globally unique including disabled departments
    pub code: String,

    /// Parent department id (None for roots)
    pub parent_id: Option<i64>,

    /// Materialized ancestor chain including self, e.g. `/1/4/9`
    pub path: String,

    /// Depth, 0 for roots
    pub level: i32,

    /// Whether at least one department has this one as parent
    pub has_children: bool,

    /// Sibling display order
    pub sort_order: i32,

    /// Manager in the external employee directory
    pub manager_id: Option<i64>,

    /// Soft-disable flag; orthogonal to tree structure
    pub enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

impl Department {
    /// Whether this department is a root of the forest.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Decode the ancestor id chain (inclusive of self) from the path.
    pub fn ancestor_chain(&self) -> crate::error::HierarchyResult<Vec<i64>> {
        path::decode(&self.path)
    }
}

/// Department tree node (for nested display)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepartmentTree {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<i64>,
    pub level: i32,
    #[serde(rename = "sortOrder")]
    pub sort_order: i32,
    #[serde(rename = "managerId")]
    pub manager_id: Option<i64>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DepartmentTree>,
}

impl From<Department> for DepartmentTree {
    fn from(dept: Department) -> Self {
        Self {
            id: dept.id,
            name: dept.name,
            code: dept.code,
            parent_id: dept.parent_id,
            level: dept.level,
            sort_order: dept.sort_order,
            manager_id: dept.manager_id,
            enabled: dept.enabled,
            children: Vec::new(),
        }
    }
}
