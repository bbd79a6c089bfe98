//! Serialization of query trees into SPARQL graph patterns

use super::query_tree::{NodeId, QueryTree, ROOT};
use super::term::{NodeLabel, Term};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Name of the variable the root is bound to
pub const OUTPUT_VARIABLE: &str = "x0";

/// Subject or object position of a triple pattern
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PatternTerm {
    /// A variable, stored without the leading `?`
    Variable(String),
    /// A fixed term
    Term(Term),
}

impl fmt::Display for PatternTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternTerm::Variable(name) => write!(f, "?{}", name),
            PatternTerm::Term(term) => write!(f, "{}", term),
        }
    }
}

/// One statement of a basic graph pattern
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriplePattern {
    /// Subject position
    pub subject: PatternTerm,
    /// Predicate IRI
    pub predicate: String,
    /// Object position
    pub object: PatternTerm,
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

impl QueryTree {
    /// Statements of the graph pattern this tree stands for
    ///
    /// Variables are numbered breadth-first with children visited in canonical
    /// order, so structurally equal trees yield identical patterns. Wildcards,
    /// inner nodes and blank-node leaves become fresh variables; concrete leaves
    /// are emitted as their term.
    pub fn pattern_statements(&self) -> Vec<TriplePattern> {
        let forms = self.canonical_forms();
        let mut statements = Vec::new();
        let mut next_var = 1usize;
        let mut queue: VecDeque<(NodeId, String)> = VecDeque::new();
        queue.push_back((ROOT, OUTPUT_VARIABLE.to_string()));

        while let Some((node, var)) = queue.pop_front() {
            let mut children: Vec<_> = self.children(node).iter().collect();
            children.sort_by(|(e1, c1), (e2, c2)| {
                e1.cmp(e2).then_with(|| forms[*c1].cmp(&forms[*c2]))
            });

            let mut node_statements: Vec<TriplePattern> = Vec::with_capacity(children.len());
            for (edge, child) in children {
                let object = match self.label(*child) {
                    NodeLabel::Concrete(term) if self.is_leaf(*child) && !term.is_blank() => {
                        PatternTerm::Term(term.clone())
                    }
                    _ => {
                        let child_var = format!("x{}", next_var);
                        next_var += 1;
                        queue.push_back((*child, child_var.clone()));
                        PatternTerm::Variable(child_var)
                    }
                };
                node_statements.push(TriplePattern {
                    subject: PatternTerm::Variable(var.clone()),
                    predicate: edge.predicate().to_string(),
                    object,
                });
            }
            node_statements.dedup();
            statements.extend(node_statements);
        }
        statements
    }

    /// Graph-pattern fragment, one statement per line
    pub fn to_query_pattern(&self) -> String {
        self.pattern_statements()
            .iter()
            .map(|statement| statement.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Complete SELECT query projecting the root variable
    pub fn to_select_query(&self, limit: Option<usize>) -> String {
        let mut query = format!("SELECT DISTINCT ?{} WHERE {{\n", OUTPUT_VARIABLE);
        for statement in self.pattern_statements() {
            query.push_str("  ");
            query.push_str(&statement.to_string());
            query.push('\n');
        }
        query.push('}');
        if let Some(limit) = limit {
            query.push_str(&format!("\nLIMIT {}", limit));
        }
        query
    }
}
