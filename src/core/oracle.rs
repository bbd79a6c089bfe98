//! Classification sources for candidate examples

use super::examples::Classification;
use crate::graph::GraphAccess;
use crate::tree::Term;
use crate::Result;
use log::debug;
use std::collections::BTreeSet;

/// Whoever labels candidates: a human or a reference answer set
pub trait Oracle {
    /// Classify a resource as a member of the target answer set or not
    fn classify(&self, term: &Term) -> Result<Classification>;

    /// Whether `answers` is already the intended answer set
    ///
    /// An interactive oracle usually cannot tell, so the default says no and
    /// the learner stops only when no unclassified candidate is left.
    fn is_satisfied(&self, _answers: &[Term]) -> bool {
        false
    }
}

/// Oracle backed by a known target answer set, used for evaluation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceOracle {
    target: BTreeSet<Term>,
}

impl ReferenceOracle {
    /// Create from the target answers
    pub fn new(target: impl IntoIterator<Item = Term>) -> Self {
        ReferenceOracle {
            target: target.into_iter().collect(),
        }
    }

    /// Evaluate a reference query against `graph` to get the target answers
    ///
    /// The query goes to the store verbatim; the store decides what it accepts.
    pub fn from_query<G: GraphAccess + ?Sized>(graph: &G, query: &str) -> Result<Self> {
        let answers = graph.execute_pattern_query(query)?;
        debug!("reference query has {} answers", answers.len());
        Ok(Self::new(answers))
    }

    /// The target answers
    pub fn target(&self) -> &BTreeSet<Term> {
        &self.target
    }
}

impl Oracle for ReferenceOracle {
    fn classify(&self, term: &Term) -> Result<Classification> {
        Ok(if self.target.contains(term) {
            Classification::Positive
        } else {
            Classification::Negative
        })
    }

    fn is_satisfied(&self, answers: &[Term]) -> bool {
        let answers: BTreeSet<&Term> = answers.iter().collect();
        answers.len() == self.target.len() && self.target.iter().all(|t| answers.contains(t))
    }
}

/// Oracle from a plain classification function
pub struct FnOracle<F> {
    classify: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&Term) -> Classification,
{
    /// Wrap a classification function
    pub fn new(classify: F) -> Self {
        FnOracle { classify }
    }
}

impl<F> Oracle for FnOracle<F>
where
    F: Fn(&Term) -> Classification,
{
    fn classify(&self, term: &Term) -> Result<Classification> {
        Ok((self.classify)(term))
    }
}
