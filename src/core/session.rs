//! The active-learning loop
//!
//! A session starts from one positive seed and alternates between generalizing
//! the positives into a hypothesis, querying the graph with it and asking the
//! oracle about one unclassified answer. Rounds are atomic: a round that fails
//! leaves the examples and the hypothesis as they were.

use super::examples::{Classification, ExampleSet};
use super::learner_config::LearnerConfig;
use super::oracle::Oracle;
use super::score::HypothesisScore;
use super::selector::{ExampleSelector, FirstUnclassified};
use super::tree_cache::TreeCache;
use crate::graph::{GraphAccess, QueryTreeFactory};
use crate::tree::{lgg_all, QueryTree, Relax, Term, ROOT};
use crate::utils::{load_json, save_json};
use crate::{Result, SparqlLggError};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Lifecycle of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Rounds may still be run
    Collecting,
    /// The oracle accepted the answers or no unclassified candidate is left
    Converged,
    /// A graph-store call kept failing after all retries
    Failed,
}

/// What happened in one round
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number
    pub round: usize,
    /// Query of the hypothesis
    pub query: String,
    /// Nodes in the hypothesis
    pub hypothesis_size: usize,
    /// Number of answers of the hypothesis
    pub answer_count: usize,
    /// Resource shown to the oracle, if any
    pub candidate: Option<Term>,
    /// The oracle's verdict on the candidate
    pub classification: Option<Classification>,
    /// 0 if the candidate came from the hypothesis itself, k for the k-th relaxation
    pub relaxation_level: Option<usize>,
    /// Agreement of the answers with the examples
    pub score: HypothesisScore,
    /// Time spent generalizing
    pub lgg_time: Duration,
    /// Time spent in graph queries
    pub query_time: Duration,
    /// State after the round
    pub state: SessionState,
}

/// Serializable snapshot for resuming a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Examples collected so far
    pub examples: ExampleSet,
    /// Query of the last hypothesis
    pub hypothesis_query: Option<String>,
    /// Completed rounds
    pub round: usize,
    /// State when the checkpoint was taken
    pub state: SessionState,
}

impl Checkpoint {
    /// Write as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    /// Read from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path)
    }
}

/// Active learner of a SPARQL query from examples
pub struct ActiveLearner<G, O, S = FirstUnclassified> {
    graph: G,
    oracle: O,
    selector: S,
    config: LearnerConfig,
    factory: QueryTreeFactory,
    cache: Arc<TreeCache>,
    examples: ExampleSet,
    hypothesis: Option<QueryTree>,
    state: SessionState,
    round: usize,
    history: Vec<RoundReport>,
}

impl<G: GraphAccess, O: Oracle> ActiveLearner<G, O, FirstUnclassified> {
    /// Start a session from one positive seed
    pub fn new(seed: Term, graph: G, oracle: O, config: LearnerConfig) -> Result<Self> {
        Self::from_examples(ExampleSet::new(seed), 0, graph, oracle, config)
    }

    /// Continue a session from a checkpoint
    ///
    /// A failed session resumes as collecting; the hypothesis is recomputed in
    /// the next round.
    pub fn resume(
        checkpoint: Checkpoint,
        graph: G,
        oracle: O,
        config: LearnerConfig,
    ) -> Result<Self> {
        let mut learner =
            Self::from_examples(checkpoint.examples, checkpoint.round, graph, oracle, config)?;
        if checkpoint.state == SessionState::Converged {
            learner.state = SessionState::Converged;
        }
        info!(
            "resumed session at round {} with {} examples",
            learner.round,
            learner.examples.len()
        );
        Ok(learner)
    }

    fn from_examples(
        examples: ExampleSet,
        round: usize,
        graph: G,
        oracle: O,
        config: LearnerConfig,
    ) -> Result<Self> {
        config.validate().map_err(SparqlLggError::InvalidConfig)?;
        if examples.positives().is_empty() {
            return Err(SparqlLggError::EmptyInput);
        }
        Ok(ActiveLearner {
            graph,
            oracle,
            selector: FirstUnclassified,
            factory: config.factory(),
            config,
            cache: Arc::new(TreeCache::new()),
            examples,
            hypothesis: None,
            state: SessionState::Collecting,
            round,
            history: Vec::new(),
        })
    }
}

impl<G, O, S> ActiveLearner<G, O, S>
where
    G: GraphAccess,
    O: Oracle,
    S: ExampleSelector,
{
    /// Use another example selection strategy
    pub fn with_selector<T: ExampleSelector>(self, selector: T) -> ActiveLearner<G, O, T> {
        ActiveLearner {
            graph: self.graph,
            oracle: self.oracle,
            selector,
            config: self.config,
            factory: self.factory,
            cache: self.cache,
            examples: self.examples,
            hypothesis: self.hypothesis,
            state: self.state,
            round: self.round,
            history: self.history,
        }
    }

    /// Share a tree cache with other sessions over the same graph and config
    pub fn with_cache(mut self, cache: Arc<TreeCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Completed rounds
    pub fn round(&self) -> usize {
        self.round
    }

    /// Examples collected so far
    pub fn examples(&self) -> &ExampleSet {
        &self.examples
    }

    /// Hypothesis of the last completed round
    pub fn hypothesis(&self) -> Option<&QueryTree> {
        self.hypothesis.as_ref()
    }

    /// Query of the last hypothesis
    pub fn current_query(&self) -> Option<String> {
        self.hypothesis
            .as_ref()
            .map(|h| h.to_select_query(self.config.query_limit))
    }

    /// Reports of the rounds run by this instance
    pub fn history(&self) -> &[RoundReport] {
        &self.history
    }

    /// Report of the last round
    pub fn last_report(&self) -> Option<&RoundReport> {
        self.history.last()
    }

    /// Tree cache of the session
    pub fn cache(&self) -> &Arc<TreeCache> {
        &self.cache
    }

    /// Configuration of the session
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Snapshot for [`ActiveLearner::resume`]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            examples: self.examples.clone(),
            hypothesis_query: self.current_query(),
            round: self.round,
            state: self.state,
        }
    }

    /// Run rounds until the session leaves `Collecting` or `max_rounds` is hit
    pub fn run(&mut self) -> Result<SessionState> {
        self.run_until(&AtomicBool::new(false))
    }

    /// Like [`ActiveLearner::run`], also stopping between rounds once `cancel` is set
    pub fn run_until(&mut self, cancel: &AtomicBool) -> Result<SessionState> {
        while self.state == SessionState::Collecting {
            if cancel.load(Ordering::Relaxed) {
                info!("session cancelled after round {}", self.round);
                break;
            }
            if self.round >= self.config.max_rounds {
                warn!("stopping after {} rounds without convergence", self.round);
                break;
            }
            self.run_round()?;
        }
        Ok(self.state)
    }

    /// Run one round
    ///
    /// Fails with `SessionClosed` outside `Collecting`. Graph-store errors that
    /// survive every retry move the session to `Failed`; other errors abort the
    /// round and leave the session unchanged.
    pub fn run_round(&mut self) -> Result<RoundReport> {
        if self.state != SessionState::Collecting {
            return Err(SparqlLggError::SessionClosed(format!("{:?}", self.state)));
        }
        let round = self.round + 1;

        self.build_missing_trees().map_err(|e| self.abort(e))?;

        let lgg_start = Instant::now();
        let trees = self
            .examples
            .positives()
            .iter()
            .map(|term| {
                self.cache.get(term).ok_or_else(|| {
                    SparqlLggError::InvalidStructure(format!("no tree for {}", term))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let hypothesis = lgg_all(trees.iter().map(|tree| &**tree))?;
        let lgg_time = lgg_start.elapsed();

        let query = hypothesis.to_select_query(self.config.query_limit);
        let query_start = Instant::now();
        let answers = self.query(&query).map_err(|e| self.abort(e))?;
        let mut query_time = query_start.elapsed();
        let score = HypothesisScore::compute(&hypothesis, &answers, &self.examples);

        let (candidate, relaxation_level) = if self.oracle.is_satisfied(&answers) {
            info!("oracle accepts the {} answers of the hypothesis", answers.len());
            (None, None)
        } else {
            let search_start = Instant::now();
            let found = self
                .find_candidate(&hypothesis, &answers)
                .map_err(|e| self.abort(e))?;
            query_time += search_start.elapsed();
            match found {
                Some((term, level)) => (Some(term), Some(level)),
                None => {
                    info!("no unclassified candidate left");
                    (None, None)
                }
            }
        };

        let classification = match &candidate {
            Some(term) => {
                let classification = self.oracle.classify(term)?;
                self.examples.add(term.clone(), classification)?;
                Some(classification)
            }
            None => None,
        };

        self.round = round;
        self.state = if candidate.is_some() {
            SessionState::Collecting
        } else {
            SessionState::Converged
        };
        self.hypothesis = Some(hypothesis);

        let report = RoundReport {
            round,
            hypothesis_size: self.hypothesis.as_ref().map_or(0, QueryTree::size),
            query,
            answer_count: answers.len(),
            candidate,
            classification,
            relaxation_level,
            score,
            lgg_time,
            query_time,
            state: self.state,
        };
        info!(
            "round {}: {} answers, {}, state {:?}, query {}",
            round, report.answer_count, report.score, report.state, report.query
        );
        if let (Some(term), Some(classification)) = (&report.candidate, report.classification) {
            info!("{} classified {:?}", term, classification);
        }
        self.history.push(report.clone());
        Ok(report)
    }

    fn abort(&mut self, err: SparqlLggError) -> SparqlLggError {
        if err.is_retryable() {
            warn!("session failed in round {}: {}", self.round + 1, err);
            self.state = SessionState::Failed;
        }
        err
    }

    fn build_missing_trees(&self) -> Result<()> {
        let missing: Vec<&Term> = self
            .examples
            .iter()
            .map(|(term, _)| term)
            .filter(|term| !self.cache.contains(term))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        debug!("building {} example trees", missing.len());

        let (graph, factory, config, cache) =
            (&self.graph, &self.factory, &self.config, &self.cache);
        if !config.parallel_tree_building {
            return missing.into_iter().try_for_each(|term| {
                let tree = build_tree(graph, factory, config, term, config.max_retries)?;
                cache.insert_if_absent(term.clone(), tree);
                Ok(())
            });
        }

        // Pool threads make one attempt each; backoff sleeps stay on this thread
        let pending = missing
            .par_iter()
            .filter_map(|term| match build_tree(graph, factory, config, term, 0) {
                Ok(tree) => {
                    cache.insert_if_absent((*term).clone(), tree);
                    None
                }
                Err(err) if err.is_retryable() && config.max_retries > 0 => {
                    warn!("neighborhood fetch for {} failed: {}", term, err);
                    Some(Ok(*term))
                }
                Err(err) => Some(Err(err)),
            })
            .collect::<Result<Vec<&Term>>>()?;
        if pending.is_empty() {
            return Ok(());
        }
        backoff(config.retry_backoff_ms, 1);
        pending.into_iter().try_for_each(|term| {
            let tree = build_tree(graph, factory, config, term, config.max_retries - 1)?;
            cache.insert_if_absent(term.clone(), tree);
            Ok(())
        })
    }

    fn query(&self, query: &str) -> Result<Vec<Term>> {
        with_retries(
            self.config.max_retries,
            self.config.retry_backoff_ms,
            "query",
            || self.graph.execute_pattern_query(query),
        )
    }

    /// Unclassified answer of the hypothesis, or else of its relaxations
    fn find_candidate(
        &mut self,
        hypothesis: &QueryTree,
        answers: &[Term],
    ) -> Result<Option<(Term, usize)>> {
        if let Some(term) = self.selector.select(answers, &self.examples) {
            return Ok(Some((term, 0)));
        }
        for (level, relaxed) in relaxations(hypothesis, self.config.relaxation_ratio)
            .into_iter()
            .enumerate()
        {
            let answers = self.query(&relaxed.to_select_query(self.config.query_limit))?;
            debug!("relaxation {} has {} answers", level + 1, answers.len());
            if let Some(term) = self.selector.select(&answers, &self.examples) {
                return Ok(Some((term, level + 1)));
            }
        }
        Ok(None)
    }
}

/// Increasingly general versions of `hypothesis`
///
/// Type edges only, then repeated root pruning by `ratio` (at least one child
/// per step), then the hypothesis with every leaf turned into a wildcard.
/// Versions without root children are skipped since they constrain nothing.
pub fn relaxations(hypothesis: &QueryTree, ratio: f64) -> Vec<QueryTree> {
    let mut ladder: Vec<QueryTree> = Vec::new();
    let mut push = |tree: QueryTree| {
        if !tree.is_leaf(ROOT) && tree != *hypothesis && !ladder.contains(&tree) {
            ladder.push(tree);
        }
    };

    push(hypothesis.keep_only_type_edges());

    let mut current = hypothesis.clone();
    while !current.is_leaf(ROOT) {
        let count = current.children(ROOT).len();
        let mut next = current.generalise(ratio);
        if next.children(ROOT).len() >= count {
            next = current.generalise((count - 1) as f64 / count as f64);
        }
        push(next.clone());
        current = next;
    }

    push(hypothesis.replace_leaves_with_wildcards());
    ladder
}

fn build_tree<G: GraphAccess + ?Sized>(
    graph: &G,
    factory: &QueryTreeFactory,
    config: &LearnerConfig,
    seed: &Term,
    retries: usize,
) -> Result<QueryTree> {
    let statements = with_retries(retries, config.retry_backoff_ms, "neighborhood fetch", || {
        graph.fetch_neighborhood(seed, factory.max_depth(), factory.predicate_filter())
    })?;
    match factory.build(seed, &statements) {
        Err(SparqlLggError::EmptyNeighborhood(_)) if config.allow_isolated_examples => {
            warn!("{} has no statements, using a single-node tree", seed);
            Ok(QueryTree::leaf(seed.clone()).with_provenance(seed.clone()))
        }
        built => built,
    }
}

/// Run `op`, retrying retryable errors up to `retries` times with linear backoff
fn with_retries<T>(
    retries: usize,
    backoff_ms: u64,
    what: &str,
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(err) if err.is_retryable() && attempt < retries => {
                attempt += 1;
                warn!("{} failed (attempt {}/{}): {}", what, attempt, retries + 1, err);
                backoff(backoff_ms, attempt);
            }
            result => return result,
        }
    }
}

fn backoff(backoff_ms: u64, attempt: usize) {
    if backoff_ms > 0 {
        thread::sleep(Duration::from_millis(backoff_ms * attempt as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oracle::{FnOracle, ReferenceOracle};
    use crate::graph::InMemoryGraph;
    use crate::tree::{EdgeLabel, NodeLabel, Triple, RDF_TYPE};
    use std::collections::BTreeSet;
    use std::sync::atomic::AtomicUsize;

    fn ex(name: &str) -> Term {
        Term::iri(format!("http://ex.org/{}", name))
    }

    /// Persons a..d with varying extra facts, and two cities
    fn graph() -> InMemoryGraph {
        let mut triples = Vec::new();
        for (name, age) in [("a", "30"), ("b", "40"), ("c", "50"), ("d", "60")] {
            triples.push(Triple::new(ex(name), RDF_TYPE, ex("Person")));
            triples.push(Triple::new(ex(name), "http://ex.org/age", Term::literal(age)));
        }
        for city in ["berlin", "paris"] {
            triples.push(Triple::new(ex(city), RDF_TYPE, ex("City")));
            triples.push(Triple::new(ex(city), "http://ex.org/age", Term::literal("800")));
        }
        InMemoryGraph::from_triples(triples)
    }

    fn config() -> LearnerConfig {
        LearnerConfig {
            parallel_tree_building: false,
            ..LearnerConfig::for_evaluation()
        }
    }

    fn persons() -> ReferenceOracle {
        ReferenceOracle::new(["a", "b", "c", "d"].map(ex))
    }

    /// Fails every call until `failures` calls have been made
    struct Flaky {
        inner: InMemoryGraph,
        failures: usize,
        calls: AtomicUsize,
    }

    impl Flaky {
        fn check(&self) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                Err(SparqlLggError::GraphAccess("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl GraphAccess for Flaky {
        fn fetch_neighborhood(
            &self,
            seed: &Term,
            max_depth: usize,
            predicate_filter: &BTreeSet<String>,
        ) -> Result<Vec<Triple>> {
            self.check()?;
            self.inner.fetch_neighborhood(seed, max_depth, predicate_filter)
        }

        fn execute_pattern_query(&self, query: &str) -> Result<Vec<Term>> {
            self.check()?;
            self.inner.execute_pattern_query(query)
        }
    }

    /// Serves neighborhoods, times out on the first `failures` queries
    struct SlowEndpoint {
        inner: InMemoryGraph,
        failures: usize,
        queries: AtomicUsize,
    }

    impl GraphAccess for SlowEndpoint {
        fn fetch_neighborhood(
            &self,
            seed: &Term,
            max_depth: usize,
            predicate_filter: &BTreeSet<String>,
        ) -> Result<Vec<Triple>> {
            self.inner.fetch_neighborhood(seed, max_depth, predicate_filter)
        }

        fn execute_pattern_query(&self, query: &str) -> Result<Vec<Term>> {
            if self.queries.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(SparqlLggError::QueryFailed("timeout".to_string()));
            }
            self.inner.execute_pattern_query(query)
        }
    }

    #[test]
    fn test_converges_on_type() {
        let mut learner = ActiveLearner::new(ex("a"), graph(), persons(), config()).unwrap();
        let state = learner.run().unwrap();

        assert_eq!(state, SessionState::Converged);
        let hypothesis = learner.hypothesis().unwrap();
        assert_eq!(hypothesis.root_label(), &NodeLabel::Wildcard);
        assert_eq!(
            hypothesis.label(hypothesis.children_by_edge(ROOT, &EdgeLabel::Type)[0]),
            &NodeLabel::iri("http://ex.org/Person")
        );
        assert!(learner.examples().negatives().is_empty());
        assert!(learner.last_report().unwrap().score.is_consistent());
    }

    #[test]
    fn test_first_round_generalizes_via_relaxation() {
        let mut learner = ActiveLearner::new(ex("a"), graph(), persons(), config()).unwrap();
        let report = learner.run_round().unwrap();

        // The seed's own query only returns the seed
        assert_eq!(report.answer_count, 1);
        assert_eq!(report.relaxation_level, Some(1));
        assert_eq!(report.candidate, Some(ex("b")));
        assert_eq!(report.classification, Some(Classification::Positive));
        assert_eq!(report.state, SessionState::Collecting);
        assert_eq!(learner.round(), 1);
        assert_eq!(learner.examples().positives(), &[ex("a"), ex("b")]);
    }

    #[test]
    fn test_converges_without_satisfaction_signal() {
        let oracle = FnOracle::new(|t: &Term| {
            if ["a", "b", "c", "d"].map(ex).contains(t) {
                Classification::Positive
            } else {
                Classification::Negative
            }
        });
        let mut learner = ActiveLearner::new(ex("a"), graph(), oracle, config()).unwrap();
        assert_eq!(learner.run().unwrap(), SessionState::Converged);

        // Every resource reachable by a relaxation ends up classified
        assert_eq!(learner.examples().positives().len(), 4);
        assert!(learner.examples().negatives().contains(&ex("berlin")));
        assert!(learner.examples().negatives().contains(&ex("paris")));
    }

    #[test]
    fn test_closed_session_rejects_rounds() {
        let mut learner = ActiveLearner::new(ex("a"), graph(), persons(), config()).unwrap();
        learner.run().unwrap();
        let rounds = learner.round();

        assert!(matches!(learner.run_round(), Err(SparqlLggError::SessionClosed(_))));
        assert_eq!(learner.run().unwrap(), SessionState::Converged);
        assert_eq!(learner.round(), rounds);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = config();
        config.relaxation_ratio = 2.0;
        let result = ActiveLearner::new(ex("a"), graph(), persons(), config);
        assert!(matches!(result, Err(SparqlLggError::InvalidConfig(_))));
    }

    #[test]
    fn test_retries_then_succeeds() {
        let flaky = Flaky {
            inner: graph(),
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let config = LearnerConfig {
            max_retries: 2,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("a"), flaky, persons(), config).unwrap();
        assert!(learner.run_round().is_ok());
        assert_eq!(learner.state(), SessionState::Collecting);
    }

    #[test]
    fn test_exhausted_retries_fail_session() {
        let flaky = Flaky {
            inner: graph(),
            failures: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let config = LearnerConfig {
            max_retries: 2,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("a"), flaky, persons(), config).unwrap();

        assert!(matches!(learner.run_round(), Err(SparqlLggError::GraphAccess(_))));
        assert_eq!(learner.state(), SessionState::Failed);
        assert_eq!(learner.round(), 0);
        assert_eq!(learner.examples().len(), 1);
        assert!(learner.hypothesis().is_none());
    }

    #[test]
    fn test_query_failure_fails_session_unchanged() {
        let endpoint = SlowEndpoint {
            inner: graph(),
            failures: usize::MAX,
            queries: AtomicUsize::new(0),
        };
        let config = LearnerConfig {
            max_retries: 2,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("a"), endpoint, persons(), config).unwrap();

        assert!(matches!(learner.run_round(), Err(SparqlLggError::QueryFailed(_))));
        assert_eq!(learner.state(), SessionState::Failed);
        assert_eq!(learner.round(), 0);
        assert_eq!(learner.examples().len(), 1);
        assert!(learner.hypothesis().is_none());
        assert!(learner.history().is_empty());
        // One attempt plus two retries
        assert_eq!(learner.graph.queries.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_query_retries_within_budget() {
        let endpoint = SlowEndpoint {
            inner: graph(),
            failures: 2,
            queries: AtomicUsize::new(0),
        };
        let config = LearnerConfig {
            max_retries: 2,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("a"), endpoint, persons(), config).unwrap();

        let report = learner.run_round().unwrap();
        assert_eq!(report.answer_count, 1);
        assert_eq!(learner.state(), SessionState::Collecting);
        assert_eq!(learner.examples().len(), 2);
        assert!(learner.hypothesis().is_some());
    }

    #[test]
    fn test_parallel_tree_building_retries_failed_fetches() {
        let flaky = Flaky {
            inner: graph(),
            failures: 1,
            calls: AtomicUsize::new(0),
        };
        let flaky_config = LearnerConfig {
            max_retries: 1,
            parallel_tree_building: true,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("a"), flaky, persons(), flaky_config).unwrap();

        assert!(learner.run_round().is_ok());
        assert!(learner.cache().contains(&ex("a")));
        assert_eq!(learner.state(), SessionState::Collecting);

        let broken = Flaky {
            inner: graph(),
            failures: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let config = LearnerConfig {
            max_retries: 0,
            parallel_tree_building: true,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("a"), broken, persons(), config).unwrap();
        assert!(matches!(learner.run_round(), Err(SparqlLggError::GraphAccess(_))));
        assert_eq!(learner.state(), SessionState::Failed);
    }

    #[test]
    fn test_isolated_seed() {
        let mut learner = ActiveLearner::new(ex("nobody"), graph(), persons(), config()).unwrap();
        let report = learner.run_round().unwrap();
        // A childless root constrains nothing and has no relaxation to offer
        assert_eq!(report.answer_count, 0);
        assert_eq!(report.state, SessionState::Converged);
        assert_eq!(learner.hypothesis().unwrap().size(), 1);

        let strict = LearnerConfig {
            allow_isolated_examples: false,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("nobody"), graph(), persons(), strict).unwrap();
        assert!(matches!(learner.run_round(), Err(SparqlLggError::EmptyNeighborhood(_))));
        assert_eq!(learner.state(), SessionState::Collecting);
    }

    #[test]
    fn test_cancellation() {
        let cancel = AtomicBool::new(true);
        let mut learner = ActiveLearner::new(ex("a"), graph(), persons(), config()).unwrap();
        assert_eq!(learner.run_until(&cancel).unwrap(), SessionState::Collecting);
        assert_eq!(learner.round(), 0);
    }

    #[test]
    fn test_max_rounds() {
        let config = LearnerConfig {
            max_rounds: 1,
            ..config()
        };
        let mut learner = ActiveLearner::new(ex("a"), graph(), persons(), config).unwrap();
        assert_eq!(learner.run().unwrap(), SessionState::Collecting);
        assert_eq!(learner.round(), 1);
    }

    #[test]
    fn test_checkpoint_resume() {
        let mut learner = ActiveLearner::new(ex("a"), graph(), persons(), config()).unwrap();
        learner.run_round().unwrap();
        let checkpoint = learner.checkpoint();
        assert_eq!(checkpoint.round, 1);
        assert!(checkpoint.hypothesis_query.is_some());

        let json = serde_json::to_string(&checkpoint).unwrap();
        let restored: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, checkpoint);

        let mut resumed = ActiveLearner::resume(restored, graph(), persons(), config()).unwrap();
        assert_eq!(resumed.examples(), learner.examples());
        assert_eq!(resumed.run().unwrap(), SessionState::Converged);
        assert_eq!(resumed.round(), 2);
        learner.run().unwrap();
        assert_eq!(resumed.current_query(), learner.current_query());
    }

    #[test]
    fn test_shared_cache() {
        let cache = Arc::new(TreeCache::new());
        let mut first = ActiveLearner::new(ex("a"), graph(), persons(), config())
            .unwrap()
            .with_cache(cache.clone());
        first.run().unwrap();
        // seed plus the one positive needed to reach the type
        let cached = cache.len();
        assert_eq!(cached, 2);

        let mut second = ActiveLearner::new(ex("a"), graph(), persons(), config())
            .unwrap()
            .with_cache(cache.clone());
        second.run().unwrap();
        assert_eq!(cache.len(), cached);
    }

    #[test]
    fn test_relaxation_ladder() {
        let hypothesis = QueryTree::leaf(ex("a"))
            .with_child(EdgeLabel::Type, QueryTree::leaf(ex("Person")))
            .with_child(EdgeLabel::property("http://ex.org/p"), QueryTree::leaf(ex("x")))
            .with_child(EdgeLabel::property("http://ex.org/q"), QueryTree::leaf(ex("y")));
        let ladder = relaxations(&hypothesis, 0.5);

        assert_eq!(ladder[0].children(ROOT).len(), 1);
        assert!(ladder[0].children(ROOT)[0].0.is_type());
        // 3 -> 2 -> 1 root children
        assert_eq!(ladder[1].children(ROOT).len(), 2);
        assert_eq!(ladder[1].root_label(), &NodeLabel::Wildcard);
        assert_eq!(ladder[2].children(ROOT).len(), 1);
        assert_eq!(ladder.last().unwrap().specific_node_count(), 1);
        assert!(ladder.iter().all(|tree| !tree.is_leaf(ROOT)));

        assert!(relaxations(&QueryTree::wildcard(), 0.5).is_empty());
    }
}
