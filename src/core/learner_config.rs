//! Configuration of an active-learning session

use crate::graph::{QueryTreeFactory, DEFAULT_PREDICATE_FILTER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Learner configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Depth of example trees
    pub max_depth: usize,
    /// Predicates ignored when building trees
    pub predicate_filter: BTreeSet<String>,
    /// Upper bound on rounds for `run`
    pub max_rounds: usize,
    /// LIMIT appended to every generated query
    pub query_limit: Option<usize>,
    /// Retries for a failing graph-store call before the session fails
    pub max_retries: usize,
    /// Base delay between retries, multiplied by the attempt number
    pub retry_backoff_ms: u64,
    /// Use seeds without any statement as single-node trees instead of failing
    pub allow_isolated_examples: bool,
    /// Share of root children kept per relaxation step
    pub relaxation_ratio: f64,
    /// Build the trees of new examples on the rayon pool
    pub parallel_tree_building: bool,
}

impl LearnerConfig {
    /// Interactive use against a DBpedia-like endpoint
    pub fn for_dbpedia() -> Self {
        LearnerConfig {
            max_depth: 2,
            predicate_filter: DEFAULT_PREDICATE_FILTER.clone(),
            max_rounds: 50,
            query_limit: Some(1000),
            max_retries: 3,
            retry_backoff_ms: 500,
            allow_isolated_examples: true,
            relaxation_ratio: 0.5,
            parallel_tree_building: true,
        }
    }

    /// Automated evaluation against a reference answer set
    ///
    /// No LIMIT, since convergence compares complete answer sets.
    pub fn for_evaluation() -> Self {
        LearnerConfig {
            max_depth: 2,
            predicate_filter: BTreeSet::new(),
            max_rounds: 100,
            query_limit: None,
            max_retries: 1,
            retry_backoff_ms: 0,
            allow_isolated_examples: true,
            relaxation_ratio: 0.5,
            parallel_tree_building: true,
        }
    }

    /// Tree factory matching this configuration
    pub fn factory(&self) -> QueryTreeFactory {
        QueryTreeFactory::new(self.max_depth)
            .with_predicate_filter(self.predicate_filter.iter().cloned())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rounds == 0 {
            return Err("At least one round must be allowed".to_string());
        }

        if !(self.relaxation_ratio > 0.0 && self.relaxation_ratio < 1.0) {
            return Err("Relaxation ratio must lie strictly between 0 and 1".to_string());
        }

        if self.query_limit == Some(0) {
            return Err("Query limit must be positive".to_string());
        }

        Ok(())
    }
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self::for_dbpedia()
    }
}
