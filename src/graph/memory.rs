//! In-memory graph store backed by petgraph

use super::sparql::{tokenize, SelectQuery, Token};
use super::GraphAccess;
use crate::tree::{PatternTerm, Term, Triple, TriplePattern};
use crate::{Result, SparqlLggError};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// A small triple store that answers neighborhood fetches and pattern queries
///
/// Terms are nodes and predicates are edge weights; duplicate statements are ignored.
#[derive(Clone, Debug, Default)]
pub struct InMemoryGraph {
    graph: DiGraph<Term, String>,
    index: HashMap<Term, NodeIndex>,
}

type Bindings = HashMap<String, Term>;

impl InMemoryGraph {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `triples`
    pub fn from_triples<I: IntoIterator<Item = Triple>>(triples: I) -> Self {
        let mut graph = Self::new();
        for triple in triples {
            graph.insert(triple);
        }
        graph
    }

    /// Parse N-Triples text; blank lines and `#` comments are skipped
    pub fn from_ntriples(text: &str) -> Result<Self> {
        let mut graph = Self::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let triple = parse_ntriples_line(line).map_err(|msg| {
                SparqlLggError::Parse(format!("line {}: {}", number + 1, msg))
            })?;
            graph.insert(triple);
        }
        Ok(graph)
    }

    /// Render every statement as N-Triples, sorted
    pub fn to_ntriples(&self) -> String {
        self.triples()
            .iter()
            .map(|triple| format!("{}\n", triple.to_ntriples()))
            .collect()
    }

    /// Insert a statement; returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        let subject = self.node(triple.subject);
        let object = self.node(triple.object);
        if self
            .graph
            .edges_connecting(subject, object)
            .any(|edge| *edge.weight() == triple.predicate)
        {
            return false;
        }
        self.graph.add_edge(subject, object, triple.predicate);
        true
    }

    fn node(&mut self, term: Term) -> NodeIndex {
        if let Some(&idx) = self.index.get(&term) {
            return idx;
        }
        let idx = self.graph.add_node(term.clone());
        self.index.insert(term, idx);
        idx
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the store holds no statements
    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// All statements, sorted
    pub fn triples(&self) -> BTreeSet<Triple> {
        self.graph
            .edge_references()
            .map(|edge| self.triple(edge))
            .collect()
    }

    /// Subjects `s` with a statement `(s, predicate, object)`
    pub fn subjects_with(&self, predicate: &str, object: &Term) -> BTreeSet<Term> {
        let Some(&idx) = self.index.get(object) else {
            return BTreeSet::new();
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .filter(|edge| edge.weight() == predicate)
            .map(|edge| self.graph[edge.source()].clone())
            .collect()
    }

    fn triple(&self, edge: EdgeReference<'_, String>) -> Triple {
        Triple::new(
            self.graph[edge.source()].clone(),
            edge.weight().clone(),
            self.graph[edge.target()].clone(),
        )
    }

    /// Evaluate a parsed query; results are distinct and sorted
    pub fn evaluate(&self, query: &SelectQuery) -> Vec<Term> {
        let mut results = BTreeSet::new();
        if !query.patterns.is_empty() {
            let mut remaining: Vec<&TriplePattern> = query.patterns.iter().collect();
            let mut bindings = Bindings::new();
            self.solve(&mut remaining, &mut bindings, &query.variable, &mut results);
        }
        let limit = query.limit.unwrap_or(usize::MAX);
        results.into_iter().take(limit).collect()
    }

    fn solve(
        &self,
        remaining: &mut Vec<&TriplePattern>,
        bindings: &mut Bindings,
        projection: &str,
        results: &mut BTreeSet<Term>,
    ) {
        if remaining.is_empty() {
            if let Some(term) = bindings.get(projection) {
                results.insert(term.clone());
            }
            return;
        }

        let pick = most_bound(remaining, bindings);
        let pattern = remaining.swap_remove(pick);
        for edge in self.candidates(pattern, bindings) {
            let subject = &self.graph[edge.source()];
            let object = &self.graph[edge.target()];
            let mut added = Vec::with_capacity(2);
            if bind(&pattern.subject, subject, bindings, &mut added)
                && bind(&pattern.object, object, bindings, &mut added)
            {
                self.solve(remaining, bindings, projection, results);
            }
            for var in added {
                bindings.remove(&var);
            }
        }
        remaining.push(pattern);
        let last = remaining.len() - 1;
        remaining.swap(pick, last);
    }

    fn candidates<'a>(
        &'a self,
        pattern: &'a TriplePattern,
        bindings: &Bindings,
    ) -> Box<dyn Iterator<Item = EdgeReference<'a, String>> + 'a> {
        let matches_predicate =
            move |edge: &EdgeReference<'a, String>| *edge.weight() == pattern.predicate;
        if let Some(term) = resolve(&pattern.subject, bindings) {
            return match self.index.get(term) {
                Some(&idx) => Box::new(
                    self.graph
                        .edges_directed(idx, Direction::Outgoing)
                        .filter(matches_predicate),
                ),
                None => Box::new(std::iter::empty()),
            };
        }
        if let Some(term) = resolve(&pattern.object, bindings) {
            return match self.index.get(term) {
                Some(&idx) => Box::new(
                    self.graph
                        .edges_directed(idx, Direction::Incoming)
                        .filter(matches_predicate),
                ),
                None => Box::new(std::iter::empty()),
            };
        }
        Box::new(self.graph.edge_references().filter(matches_predicate))
    }
}

fn resolve<'a>(position: &'a PatternTerm, bindings: &'a Bindings) -> Option<&'a Term> {
    match position {
        PatternTerm::Term(term) => Some(term),
        PatternTerm::Variable(name) => bindings.get(name),
    }
}

/// Index of the pattern with the most positions already fixed
fn most_bound(patterns: &[&TriplePattern], bindings: &Bindings) -> usize {
    let score = |pattern: &TriplePattern| {
        let subject = resolve(&pattern.subject, bindings).is_some() as u8;
        let object = resolve(&pattern.object, bindings).is_some() as u8;
        subject * 2 + object
    };
    let mut best = 0;
    for (i, pattern) in patterns.iter().enumerate() {
        if score(*pattern) > score(patterns[best]) {
            best = i;
        }
    }
    best
}

/// Unify a pattern position with a term, recording newly bound variables
fn bind(
    position: &PatternTerm,
    term: &Term,
    bindings: &mut Bindings,
    added: &mut Vec<String>,
) -> bool {
    match position {
        PatternTerm::Term(fixed) => fixed == term,
        PatternTerm::Variable(name) => match bindings.get(name) {
            Some(bound) => bound == term,
            None => {
                bindings.insert(name.clone(), term.clone());
                added.push(name.clone());
                true
            }
        },
    }
}

fn parse_ntriples_line(line: &str) -> std::result::Result<Triple, String> {
    let tokens = tokenize(line)?;
    match tokens.as_slice() {
        [Token::Term(subject), Token::Term(Term::Iri(predicate)), Token::Term(object), Token::Dot]
            if !subject.is_literal() =>
        {
            Ok(Triple::new(subject.clone(), predicate.clone(), object.clone()))
        }
        _ => Err(format!("expected '<s> <p> o .', found {}", line)),
    }
}

impl GraphAccess for InMemoryGraph {
    fn fetch_neighborhood(
        &self,
        seed: &Term,
        max_depth: usize,
        predicate_filter: &BTreeSet<String>,
    ) -> Result<Vec<Triple>> {
        let Some(&start) = self.index.get(seed) else {
            return Ok(Vec::new());
        };
        let mut statements = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back((start, 0usize));

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                if predicate_filter.contains(edge.weight()) {
                    continue;
                }
                statements.insert(self.triple(edge));
                if visited.insert(edge.target()) {
                    queue.push_back((edge.target(), depth + 1));
                }
            }
        }
        Ok(statements.into_iter().collect())
    }

    fn execute_pattern_query(&self, query: &str) -> Result<Vec<Term>> {
        let parsed = SelectQuery::parse(query).map_err(|err| match err {
            SparqlLggError::Parse(msg) => {
                SparqlLggError::QueryFailed(format!("malformed query: {}", msg))
            }
            other => other,
        })?;
        Ok(self.evaluate(&parsed))
    }
}
