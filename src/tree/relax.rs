//! Deliberate over-generalization of query trees

use super::query_tree::{QueryTree, ROOT};
use super::term::NodeLabel;

/// Trait for coarsening a tree into a more general one
///
/// Every operation returns a new tree. Pruning and type filtering leave
/// childless trees unchanged.
pub trait Relax {
    /// Drop root children, oldest first, until at most `round(n * keep_ratio)` remain
    ///
    /// Ratios above 1 are treated as 1; ratios that are not positive (or NaN)
    /// remove every root child.
    fn prune_children(&self, keep_ratio: f64) -> Self;

    /// Keep only the root children reached through the type edge
    fn keep_only_type_edges(&self) -> Self;

    /// Replace the label of every leaf with the wildcard
    fn replace_leaves_with_wildcards(&self) -> Self;

    /// Turn the root into a wildcard, then prune its children by `keep_ratio`
    fn generalise(&self, keep_ratio: f64) -> Self;
}

impl Relax for QueryTree {
    fn prune_children(&self, keep_ratio: f64) -> QueryTree {
        let children = self.children(ROOT);
        let target = keep_count(children.len(), keep_ratio);
        let skip = children.len() - target;

        let mut pruned = QueryTree::leaf(self.root_label().clone());
        for (edge, child) in &children[skip..] {
            pruned.copy_from(ROOT, edge.clone(), self, *child);
        }
        pruned.set_provenance(self.provenance().cloned());
        pruned
    }

    fn keep_only_type_edges(&self) -> QueryTree {
        let mut kept = QueryTree::leaf(self.root_label().clone());
        for (edge, child) in self.children(ROOT) {
            if edge.is_type() {
                kept.copy_from(ROOT, edge.clone(), self, *child);
            }
        }
        kept.set_provenance(self.provenance().cloned());
        kept
    }

    fn replace_leaves_with_wildcards(&self) -> QueryTree {
        let mut relaxed = self.clone();
        for leaf in self.leaves() {
            relaxed.set_label(leaf, NodeLabel::Wildcard);
        }
        relaxed
    }

    fn generalise(&self, keep_ratio: f64) -> QueryTree {
        let mut relaxed = self.prune_children(keep_ratio);
        relaxed.set_label(ROOT, NodeLabel::Wildcard);
        relaxed
    }
}

fn keep_count(count: usize, keep_ratio: f64) -> usize {
    if !(keep_ratio > 0.0) {
        return 0;
    }
    let target = (count as f64 * keep_ratio.min(1.0)).round() as usize;
    target.min(count)
}
