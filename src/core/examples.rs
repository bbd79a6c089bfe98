//! Positive and negative example sets

use crate::tree::Term;
use crate::{Result, SparqlLggError};
use serde::{Deserialize, Serialize};

/// Label assigned to an example by the oracle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Member of the target answer set
    Positive,
    /// Not a member of the target answer set
    Negative,
}

/// Two disjoint, append-only lists of classified resources
///
/// Insertion order is kept; the learner folds positives in that order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleSet {
    positives: Vec<Term>,
    negatives: Vec<Term>,
}

impl ExampleSet {
    /// Start from a single positive seed
    pub fn new(seed: Term) -> Self {
        ExampleSet {
            positives: vec![seed],
            negatives: Vec::new(),
        }
    }

    /// Add a classified example; each resource may be added once
    pub fn add(&mut self, term: Term, classification: Classification) -> Result<()> {
        if self.is_classified(&term) {
            return Err(SparqlLggError::DuplicateExample(term.to_string()));
        }
        match classification {
            Classification::Positive => self.positives.push(term),
            Classification::Negative => self.negatives.push(term),
        }
        Ok(())
    }

    /// Add a positive example
    pub fn add_positive(&mut self, term: Term) -> Result<()> {
        self.add(term, Classification::Positive)
    }

    /// Add a negative example
    pub fn add_negative(&mut self, term: Term) -> Result<()> {
        self.add(term, Classification::Negative)
    }

    /// Positive examples in insertion order
    pub fn positives(&self) -> &[Term] {
        &self.positives
    }

    /// Negative examples in insertion order
    pub fn negatives(&self) -> &[Term] {
        &self.negatives
    }

    /// Classification of a resource, if it was classified
    pub fn classification(&self, term: &Term) -> Option<Classification> {
        if self.positives.contains(term) {
            Some(Classification::Positive)
        } else if self.negatives.contains(term) {
            Some(Classification::Negative)
        } else {
            None
        }
    }

    /// Whether a resource was already classified
    pub fn is_classified(&self, term: &Term) -> bool {
        self.classification(term).is_some()
    }

    /// Total number of examples
    pub fn len(&self) -> usize {
        self.positives.len() + self.negatives.len()
    }

    /// Whether there are no examples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All examples, positives first
    pub fn iter(&self) -> impl Iterator<Item = (&Term, Classification)> {
        self.positives
            .iter()
            .map(|t| (t, Classification::Positive))
            .chain(self.negatives.iter().map(|t| (t, Classification::Negative)))
    }
}
