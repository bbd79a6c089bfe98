//! Building query trees from graph neighborhoods

use super::GraphAccess;
use crate::tree::{EdgeLabel, NodeId, NodeLabel, QueryTree, Term, Triple, ROOT};
use crate::{Result, SparqlLggError};
use log::debug;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Turns a seed resource and its surrounding statements into a [`QueryTree`]
///
/// Traversal is breadth-first from the seed. Statements whose predicate is in
/// the filter are ignored, nodes at `max_depth` get no children, and an object
/// already on the path from the root becomes a childless leaf.
#[derive(Clone, Debug)]
pub struct QueryTreeFactory {
    max_depth: usize,
    predicate_filter: BTreeSet<String>,
}

impl QueryTreeFactory {
    /// Create a factory with an empty predicate filter
    pub fn new(max_depth: usize) -> Self {
        QueryTreeFactory {
            max_depth,
            predicate_filter: BTreeSet::new(),
        }
    }

    /// Exclude statements with these predicates
    pub fn with_predicate_filter<I, S>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicate_filter = predicates.into_iter().map(Into::into).collect();
        self
    }

    /// Maximum depth of built trees
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Excluded predicates
    pub fn predicate_filter(&self) -> &BTreeSet<String> {
        &self.predicate_filter
    }

    /// Build the tree of `seed` from `statements`
    ///
    /// Fails with `EmptyNeighborhood` when `max_depth > 0` and the seed has no
    /// unfiltered outgoing statement. Sibling order follows (predicate, object)
    /// order, so the result does not depend on the order of `statements`.
    pub fn build(&self, seed: &Term, statements: &[Triple]) -> Result<QueryTree> {
        let mut tree = QueryTree::leaf(seed.clone()).with_provenance(seed.clone());
        if self.max_depth == 0 {
            return Ok(tree);
        }

        let mut outgoing: HashMap<&Term, Vec<&Triple>> = HashMap::new();
        for triple in statements {
            if !self.predicate_filter.contains(&triple.predicate) {
                outgoing.entry(&triple.subject).or_default().push(triple);
            }
        }
        for list in outgoing.values_mut() {
            list.sort_by(|a, b| (&a.predicate, &a.object).cmp(&(&b.predicate, &b.object)));
            list.dedup();
        }
        if !outgoing.contains_key(seed) {
            return Err(SparqlLggError::EmptyNeighborhood(seed.to_string()));
        }

        let mut queue: VecDeque<(NodeId, &Term, usize)> = VecDeque::new();
        queue.push_back((ROOT, seed, 0));
        while let Some((node, term, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }
            let Some(list) = outgoing.get(term) else {
                continue;
            };
            for triple in list {
                let on_path = is_on_path(&tree, node, &triple.object);
                let child = tree.push_child(
                    node,
                    EdgeLabel::from_predicate(&triple.predicate),
                    triple.object.clone(),
                )?;
                if !on_path {
                    queue.push_back((child, &triple.object, depth + 1));
                }
            }
        }

        debug!(
            "built tree for {} with {} nodes (depth {})",
            seed,
            tree.size(),
            tree.max_depth()
        );
        Ok(tree)
    }

    /// Fetch the neighborhood of `seed` from `graph` and build its tree
    pub fn fetch_and_build<G: GraphAccess + ?Sized>(
        &self,
        graph: &G,
        seed: &Term,
    ) -> Result<QueryTree> {
        let statements = graph.fetch_neighborhood(seed, self.max_depth, &self.predicate_filter)?;
        self.build(seed, &statements)
    }
}

/// Whether `term` labels `node` or one of its ancestors
fn is_on_path(tree: &QueryTree, node: NodeId, term: &Term) -> bool {
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        if let NodeLabel::Concrete(label) = tree.label(current) {
            if label == term {
                return true;
            }
        }
        cursor = tree.parent(current);
    }
    false
}
