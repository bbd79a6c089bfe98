//! Append-only cache of example trees

use crate::tree::{QueryTree, Term};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Trees keyed by the resource they were built from
///
/// Entries are only ever added, never replaced or removed, so a poisoned lock
/// still guards consistent data and is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: RwLock<HashMap<Term, Arc<QueryTree>>>,
}

impl TreeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached tree of a resource
    pub fn get(&self, id: &Term) -> Option<Arc<QueryTree>> {
        let trees = self.trees.read().unwrap_or_else(PoisonError::into_inner);
        trees.get(id).cloned()
    }

    /// Whether a tree is cached for the resource
    pub fn contains(&self, id: &Term) -> bool {
        let trees = self.trees.read().unwrap_or_else(PoisonError::into_inner);
        trees.contains_key(id)
    }

    /// Insert `tree` unless one is already cached; returns the cached tree
    pub fn insert_if_absent(&self, id: Term, tree: QueryTree) -> Arc<QueryTree> {
        let mut trees = self.trees.write().unwrap_or_else(PoisonError::into_inner);
        trees.entry(id).or_insert_with(|| Arc::new(tree)).clone()
    }

    /// Number of cached trees
    pub fn len(&self) -> usize {
        let trees = self.trees.read().unwrap_or_else(PoisonError::into_inner);
        trees.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
