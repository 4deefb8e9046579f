//! Employee directory collaborator
//!
//! The engine does not own people; it only asks the directory whether a
//! department can be deleted and whether a manager id resolves to a person.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::HierarchyResult;

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Number of employees currently assigned to a department.
    async fn count_assigned(&self, department_id: i64) -> HierarchyResult<i64>;

    /// Whether the id resolves to an existing person.
    async fn is_valid_person(&self, person_id: i64) -> HierarchyResult<bool>;
}

/// In-memory directory for tests and embedders without an HR system.
#[derive(Default)]
pub struct InMemoryDirectory {
    assigned: DashMap<i64, i64>,
    people: DashMap<i64, ()>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_person(&self, person_id: i64) {
        self.people.insert(person_id, ());
    }

    pub fn set_assigned(&self, department_id: i64, count: i64) {
        if count == 0 {
            self.assigned.remove(&department_id);
        } else {
            self.assigned.insert(department_id, count);
        }
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn count_assigned(&self, department_id: i64) -> HierarchyResult<i64> {
        Ok(self
            .assigned
            .get(&department_id)
            .map(|entry| *entry.value())
            .unwrap_or(0))
    }

    async fn is_valid_person(&self, person_id: i64) -> HierarchyResult<bool> {
        Ok(self.people.contains_key(&person_id))
    }
}
