//! Active learning of a query from positive and negative examples

mod examples;
mod learner_config;
mod oracle;
mod score;
mod selector;
mod session;
mod tree_cache;

pub use examples::{Classification, ExampleSet};
pub use learner_config::LearnerConfig;
pub use oracle::{FnOracle, Oracle, ReferenceOracle};
pub use score::HypothesisScore;
pub use selector::{ExampleSelector, FirstUnclassified, RandomUnclassified};
pub use session::{relaxations, ActiveLearner, Checkpoint, RoundReport, SessionState};
pub use tree_cache::TreeCache;
