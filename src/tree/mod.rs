//! Query trees and the operations on them

mod term;
mod query_tree;
mod pattern;
mod lgg;
mod relax;

pub use term::{
    EdgeLabel, NodeLabel, Term, Triple, OWL_THING, RDFS_LABEL, RDFS_SUBCLASS_OF, RDF_TYPE,
};
pub use query_tree::{NodeId, QueryTree, QueryTreeBuilder, ROOT};
pub use pattern::{PatternTerm, TriplePattern, OUTPUT_VARIABLE};
pub use lgg::{lgg_all, Generalize};
pub use relax::Relax;
