//! Strategies for picking the next resource to ask the oracle about

use super::examples::ExampleSet;
use crate::tree::Term;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;

/// Picks one unclassified resource from a candidate answer set
pub trait ExampleSelector {
    /// `None` when every candidate is already classified
    fn select(&mut self, candidates: &[Term], examples: &ExampleSet) -> Option<Term>;
}

/// First unclassified candidate in answer order
///
/// Graph stores return answers sorted, so sessions are reproducible.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstUnclassified;

impl ExampleSelector for FirstUnclassified {
    fn select(&mut self, candidates: &[Term], examples: &ExampleSet) -> Option<Term> {
        candidates.iter().find(|t| !examples.is_classified(t)).cloned()
    }
}

/// Uniformly random unclassified candidate from a seeded generator
#[derive(Clone, Debug)]
pub struct RandomUnclassified {
    rng: StdRng,
}

impl RandomUnclassified {
    /// Create with a fixed seed
    pub fn new(seed: u64) -> Self {
        RandomUnclassified {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ExampleSelector for RandomUnclassified {
    fn select(&mut self, candidates: &[Term], examples: &ExampleSet) -> Option<Term> {
        candidates
            .iter()
            .filter(|t| !examples.is_classified(t))
            .choose(&mut self.rng)
            .cloned()
    }
}
