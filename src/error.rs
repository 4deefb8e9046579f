use thiserror::Error;

/// Hierarchy engine error types
#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("Parent department not found: {0}")]
    ParentNotFound(i64),

    #[error("Department not found: {0}")]
    NodeNotFound(i64),

    #[error("Department code already in use: {0}")]
    DuplicateCode(String),

    #[error("Moving department {node_id} under {target_id} would create a cycle")]
    CircularReference { node_id: i64, target_id: i64 },

    #[error("Department {0} still has child departments")]
    HasChildren(i64),

    #[error("Department {id} has {employees} assigned employees")]
    InUse { id: i64, employees: i64 },

    #[error("Manager does not resolve to a valid person: {0}")]
    InvalidManager(i64),

    #[error("Malformed materialized path: {0}")]
    InvalidPath(String),

    #[error("Invalid department name: {0}")]
    InvalidName(String),

    #[error("Tree depth limit exceeded: {0}")]
    MaxDepthExceeded(i32),

    #[error("Tree was modified concurrently; retry with a fresh read")]
    ConcurrentModification,

    #[error("A path rebuild is already in progress")]
    RebuildInProgress,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HierarchyError {
    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HierarchyError::ConcurrentModification)
    }
}

/// Result type alias for the hierarchy engine
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Helper trait for converting Option lookups to typed not-found errors
pub trait OptionExt<T> {
    fn ok_or_node_not_found(self, id: i64) -> HierarchyResult<T>;
    fn ok_or_parent_not_found(self, id: i64) -> HierarchyResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_node_not_found(self, id: i64) -> HierarchyResult<T> {
        self.ok_or(HierarchyError::NodeNotFound(id))
    }

    fn ok_or_parent_not_found(self, id: i64) -> HierarchyResult<T> {
        self.ok_or(HierarchyError::ParentNotFound(id))
    }
}

/// Helper to convert anyhow errors from store implementations
impl From<anyhow::Error> for HierarchyError {
    fn from(err: anyhow::Error) -> Self {
        HierarchyError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(HierarchyError::ConcurrentModification.is_retryable());
        assert!(!HierarchyError::NodeNotFound(1).is_retryable());
        assert!(!HierarchyError::RebuildInProgress.is_retryable());
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.ok_or_node_not_found(7);
        assert!(matches!(result, Err(HierarchyError::NodeNotFound(7))));
    }
}
