//! Quality of a hypothesis against the classified examples

use super::examples::ExampleSet;
use crate::tree::{QueryTree, Term};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How well a hypothesis' answers agree with the examples
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HypothesisScore {
    /// Positives among the answers
    pub covered_positives: BTreeSet<Term>,
    /// Positives missing from the answers
    pub uncovered_positives: BTreeSet<Term>,
    /// Negatives among the answers
    pub covered_negatives: BTreeSet<Term>,
    /// Negatives missing from the answers
    pub uncovered_negatives: BTreeSet<Term>,
    /// Concrete (non-wildcard) nodes of the hypothesis
    pub specific_nodes: usize,
    /// Share of concrete nodes in the hypothesis
    pub specificity: f64,
}

impl HypothesisScore {
    /// Score `hypothesis` given its `answers`
    pub fn compute(hypothesis: &QueryTree, answers: &[Term], examples: &ExampleSet) -> Self {
        let answers: BTreeSet<&Term> = answers.iter().collect();
        let split = |terms: &[Term]| -> (BTreeSet<Term>, BTreeSet<Term>) {
            terms.iter().cloned().partition(|t| answers.contains(t))
        };
        let (covered_positives, uncovered_positives) = split(examples.positives());
        let (covered_negatives, uncovered_negatives) = split(examples.negatives());

        let specific_nodes = hypothesis.specific_node_count();
        HypothesisScore {
            covered_positives,
            uncovered_positives,
            covered_negatives,
            uncovered_negatives,
            specific_nodes,
            specificity: specific_nodes as f64 / hypothesis.size() as f64,
        }
    }

    /// Share of examples classified correctly by the answers
    pub fn accuracy(&self) -> f64 {
        let correct = self.covered_positives.len() + self.uncovered_negatives.len();
        let total = correct + self.uncovered_positives.len() + self.covered_negatives.len();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Whether every positive is an answer and no negative is
    pub fn is_consistent(&self) -> bool {
        self.uncovered_positives.is_empty() && self.covered_negatives.is_empty()
    }
}

impl fmt::Display for HypothesisScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy={:.2} (+{}/{} -{}/{}) specificity={:.2} ({})",
            self.accuracy(),
            self.covered_positives.len(),
            self.covered_positives.len() + self.uncovered_positives.len(),
            self.uncovered_negatives.len(),
            self.covered_negatives.len() + self.uncovered_negatives.len(),
            self.specificity,
            self.specific_nodes,
        )
    }
}
