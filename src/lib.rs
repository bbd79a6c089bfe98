//! # sparql-lgg: learning SPARQL queries from examples
//!
//! This library represents the neighborhood of an RDF resource as a rooted,
//! labeled query tree, generalizes several such trees into their least general
//! generalization (LGG), and serializes the result as a SPARQL graph pattern.
//! An active-learning session grows a set of positive and negative examples by
//! asking an oracle about answers of the current hypothesis.
//!
//! ## Features
//!
//! - **Query Trees**: Arena trees with concrete or wildcard labels and typed edges
//! - **Generalization**: Pairwise and n-ary LGG, relaxation operators
//! - **Graph Access**: Tree building from neighborhoods, an in-memory triple store
//! - **Active Learning**: Oracle-driven sessions with checkpoints and retries

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Query trees, generalization and pattern serialization
pub mod tree;

/// Graph stores and tree building
pub mod graph;

/// The active-learning session
pub mod core;

/// Utility functions and helpers
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    ActiveLearner, Classification, ExampleSet, LearnerConfig, Oracle, SessionState,
};
pub use graph::{GraphAccess, InMemoryGraph, QueryTreeFactory};
pub use tree::{lgg_all, EdgeLabel, Generalize, NodeLabel, QueryTree, Relax, Term};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum SparqlLggError {
    /// Malformed tree: cycle, second parent or unknown node
    #[error("Invalid tree: {0}")]
    InvalidStructure(String),

    /// Seed without any unfiltered outgoing statement
    #[error("Empty neighborhood: {0}")]
    EmptyNeighborhood(String),

    /// Generalization or session over no trees at all
    #[error("Empty input")]
    EmptyInput,

    /// Graph store could not be reached or returned garbage
    #[error("Graph access error: {0}")]
    GraphAccess(String),

    /// Graph store rejected or timed out on a query
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Malformed query or N-Triples text
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource classified twice
    #[error("Duplicate example: {0}")]
    DuplicateExample(String),

    /// Invalid learner configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Round requested on a session that is no longer collecting
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SparqlLggError {
    /// Whether the error comes from the graph store and may go away on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, SparqlLggError::GraphAccess(_) | SparqlLggError::QueryFailed(_))
    }
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, SparqlLggError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        core::{
            ActiveLearner, Checkpoint, Classification, ExampleSelector, ExampleSet,
            FirstUnclassified, FnOracle, HypothesisScore, LearnerConfig, Oracle,
            RandomUnclassified, ReferenceOracle, RoundReport, SessionState, TreeCache,
        },
        graph::{
            GraphAccess, InMemoryGraph, QueryTreeFactory, SelectQuery, DEFAULT_PREDICATE_FILTER,
        },
        tree::{
            lgg_all, EdgeLabel, Generalize, NodeLabel, QueryTree, QueryTreeBuilder, Relax, Term,
            Triple, ROOT,
        },
        Result, SparqlLggError,
    };
}
