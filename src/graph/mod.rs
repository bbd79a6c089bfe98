//! Graph access: building trees from neighborhoods and answering pattern queries

mod factory;
mod memory;
mod sparql;

use crate::tree::{Term, Triple};
use crate::Result;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::sync::Arc;

pub use factory::QueryTreeFactory;
pub use memory::InMemoryGraph;
pub use sparql::SelectQuery;

/// High-fan-out, low-information DBpedia predicates excluded by default
pub static DEFAULT_PREDICATE_FILTER: Lazy<BTreeSet<String>> = Lazy::new(|| {
    [
        "http://dbpedia.org/ontology/wikiPageWikiLink",
        "http://dbpedia.org/property/wikiPageUsesTemplate",
    ]
    .into_iter()
    .map(String::from)
    .collect()
});

/// The two capabilities the learner needs from a graph store
///
/// Implementations may block on I/O and are called from several threads while
/// trees are built, hence `Send + Sync`. Timeouts are the implementation's
/// concern and should surface as `QueryFailed`.
pub trait GraphAccess: Send + Sync {
    /// Statements reachable from `seed` within `max_depth` hops, skipping
    /// filtered predicates; failures surface as `GraphAccess` errors
    fn fetch_neighborhood(
        &self,
        seed: &Term,
        max_depth: usize,
        predicate_filter: &BTreeSet<String>,
    ) -> Result<Vec<Triple>>;

    /// Run a SELECT query and return the bindings of its projected variable
    fn execute_pattern_query(&self, query: &str) -> Result<Vec<Term>>;
}

impl<G: GraphAccess + ?Sized> GraphAccess for Arc<G> {
    fn fetch_neighborhood(
        &self,
        seed: &Term,
        max_depth: usize,
        predicate_filter: &BTreeSet<String>,
    ) -> Result<Vec<Triple>> {
        (**self).fetch_neighborhood(seed, max_depth, predicate_filter)
    }

    fn execute_pattern_query(&self, query: &str) -> Result<Vec<Term>> {
        (**self).execute_pattern_query(query)
    }
}

impl<G: GraphAccess + ?Sized> GraphAccess for &G {
    fn fetch_neighborhood(
        &self,
        seed: &Term,
        max_depth: usize,
        predicate_filter: &BTreeSet<String>,
    ) -> Result<Vec<Triple>> {
        (**self).fetch_neighborhood(seed, max_depth, predicate_filter)
    }

    fn execute_pattern_query(&self, query: &str) -> Result<Vec<Term>> {
        (**self).execute_pattern_query(query)
    }
}
