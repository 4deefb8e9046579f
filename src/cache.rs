//! Subtree cache invalidation
//!
//! The engine never writes cached data. After a successful structural
//! mutation it fires [`CacheInvalidator::invalidate_subtree`] for every
//! subtree whose shape may have changed; whoever owns the cache drops the
//! stale entries.

use dashmap::DashMap;

use crate::entity::Department;
use crate::path;

/// Notified after successful writes. Implementations must not block.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_subtree(&self, root_id: i64);
}

/// Invalidator for deployments without a cache.
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate_subtree(&self, _root_id: i64) {}
}

/// Materialized subtree cache keyed by subtree root id.
///
/// An entry is stale whenever the invalidated root appears in the ancestor
/// chain of any cached node, which covers entries keyed above, at, or below
/// the mutated subtree.
#[derive(Default)]
pub struct SubtreeCache {
    entries: DashMap<i64, Vec<Department>>,
}

impl SubtreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, root_id: i64) -> Option<Vec<Department>> {
        self.entries.get(&root_id).map(|entry| entry.value().clone())
    }

    pub fn put(&self, root_id: i64, nodes: Vec<Department>) {
        self.entries.insert(root_id, nodes);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_touches(nodes: &[Department], root_id: i64) -> bool {
        nodes.iter().any(|n| {
            path::decode(&n.path)
                .map(|chain| chain.contains(&root_id))
                .unwrap_or(true)
        })
    }
}

impl CacheInvalidator for SubtreeCache {
    fn invalidate_subtree(&self, root_id: i64) {
        self.entries
            .retain(|_, nodes| !Self::entry_touches(nodes, root_id));
    }
}
