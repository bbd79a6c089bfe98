//! Least general generalization of query trees

use super::query_tree::{NodeId, QueryTree, ROOT};
use super::term::{EdgeLabel, NodeLabel};
use crate::utils::timing::Timer;
use crate::{Result, SparqlLggError};
use log::debug;
use std::collections::HashSet;

/// Trait for computing the least general generalization
pub trait Generalize {
    /// Most specific tree whose pattern matches the seeds of both inputs
    ///
    /// Equal labels are kept and unequal ones become the wildcard. Children are
    /// generalized pairwise for every edge label present on both sides:
    /// structurally identical children pair first, then children with equal
    /// labels, then the rest in insertion order. Unpaired children and edges
    /// present on one side only are dropped, and identical generalized siblings
    /// under one edge are merged.
    fn lgg(&self, other: &Self) -> Self;
}

impl Generalize for QueryTree {
    fn lgg(&self, other: &QueryTree) -> QueryTree {
        let left_forms = self.canonical_forms();
        let right_forms = other.canonical_forms();
        generalize_nodes(
            &Side { tree: self, forms: &left_forms },
            ROOT,
            &Side { tree: other, forms: &right_forms },
            ROOT,
        )
    }
}

/// Left-fold [`Generalize::lgg`] over a non-empty sequence of trees
///
/// The fold order is the iteration order; pairing tie-breaks make the result
/// depend on it.
pub fn lgg_all<'a, I>(trees: I) -> Result<QueryTree>
where
    I: IntoIterator<Item = &'a QueryTree>,
{
    let mut trees = trees.into_iter();
    let first = trees.next().ok_or(SparqlLggError::EmptyInput)?;
    let _timer = Timer::new("lgg");

    let mut lgg = first.clone();
    let mut count = 1;
    for tree in trees {
        lgg = lgg.lgg(tree);
        count += 1;
    }
    if count == 1 {
        return Ok(lgg);
    }
    lgg.set_provenance(None);
    debug!("lgg of {} trees has {} nodes", count, lgg.size());
    Ok(lgg)
}

struct Side<'a> {
    tree: &'a QueryTree,
    forms: &'a [String],
}

fn generalize_nodes(left: &Side<'_>, l: NodeId, right: &Side<'_>, r: NodeId) -> QueryTree {
    let left_label = left.tree.label(l);
    let right_label = right.tree.label(r);

    if (left_label.is_wildcard() && left.tree.is_leaf(l))
        || (right_label.is_wildcard() && right.tree.is_leaf(r))
    {
        return QueryTree::wildcard();
    }

    let label = if left_label == right_label {
        left_label.clone()
    } else {
        NodeLabel::Wildcard
    };
    let mut out = QueryTree::leaf(label);
    let mut seen: HashSet<(EdgeLabel, String)> = HashSet::new();

    for edge in left.tree.edges(l) {
        let left_children = left.tree.children_by_edge(l, edge);
        let right_children = right.tree.children_by_edge(r, edge);
        if right_children.is_empty() {
            continue;
        }
        for (lc, rc) in pair_children(left, &left_children, right, &right_children) {
            let child = generalize_nodes(left, lc, right, rc);
            if seen.insert((edge.clone(), child.canonical_form())) {
                out.copy_from(ROOT, edge.clone(), &child, ROOT);
            }
        }
    }
    out
}

/// Pair same-edge children of both sides, in the left side's order
fn pair_children(
    left: &Side<'_>,
    left_children: &[NodeId],
    right: &Side<'_>,
    right_children: &[NodeId],
) -> Vec<(NodeId, NodeId)> {
    let mut matched: Vec<Option<usize>> = vec![None; left_children.len()];
    let mut right_used = vec![false; right_children.len()];

    let tiers: [&dyn Fn(NodeId, NodeId) -> bool; 2] = [
        &|lc: NodeId, rc: NodeId| left.forms[lc] == right.forms[rc],
        &|lc: NodeId, rc: NodeId| left.tree.label(lc) == right.tree.label(rc),
    ];
    for same in tiers {
        for (i, &lc) in left_children.iter().enumerate() {
            if matched[i].is_some() {
                continue;
            }
            let found = right_children
                .iter()
                .enumerate()
                .position(|(j, &rc)| !right_used[j] && same(lc, rc));
            if let Some(j) = found {
                right_used[j] = true;
                matched[i] = Some(j);
            }
        }
    }

    let mut remaining = (0..right_children.len()).filter(|&j| !right_used[j]);
    for slot in matched.iter_mut().filter(|slot| slot.is_none()) {
        match remaining.next() {
            Some(j) => *slot = Some(j),
            None => break,
        }
    }

    matched
        .into_iter()
        .enumerate()
        .filter_map(|(i, j)| j.map(|j| (left_children[i], right_children[j])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::term::Term;

    fn p(name: &str) -> EdgeLabel {
        EdgeLabel::property(format!("http://ex.org/{}", name))
    }

    fn lit(value: &str) -> QueryTree {
        QueryTree::leaf(NodeLabel::literal(value))
    }

    fn iri(name: &str) -> QueryTree {
        QueryTree::leaf(NodeLabel::iri(format!("http://ex.org/{}", name)))
    }

    #[test]
    fn test_lgg_idempotent() {
        let tree = iri("anna")
            .with_child(p("knows"), iri("bob").with_child(p("name"), lit("Bob")))
            .with_child(p("knows"), iri("carl").with_child(p("name"), lit("Carl")))
            .with_child(EdgeLabel::Type, iri("Person"));
        assert_eq!(tree.lgg(&tree), tree);
    }

    #[test]
    fn test_root_labels() {
        assert_eq!(iri("a").lgg(&iri("a")), iri("a"));
        assert_eq!(iri("a").lgg(&iri("b")), QueryTree::wildcard());
    }

    #[test]
    fn test_wildcard_leaf_short_circuits() {
        let rich = iri("a").with_child(p("x"), lit("1"));
        assert_eq!(QueryTree::wildcard().lgg(&rich), QueryTree::wildcard());
        assert_eq!(rich.lgg(&QueryTree::wildcard()), QueryTree::wildcard());
    }

    #[test]
    fn test_one_sided_edges_are_dropped() {
        let a = iri("a").with_child(p("x"), lit("1")).with_child(p("y"), lit("2"));
        let b = iri("b").with_child(p("x"), lit("1")).with_child(p("z"), lit("3"));
        let expected = QueryTree::wildcard().with_child(p("x"), lit("1"));
        assert_eq!(a.lgg(&b), expected);
    }

    #[test]
    fn test_exact_label_pairing_preferred() {
        let a = iri("a")
            .with_child(p("x"), lit("1"))
            .with_child(p("x"), lit("2"));
        let b = iri("b").with_child(p("x"), lit("2"));
        let expected = QueryTree::wildcard().with_child(p("x"), lit("2"));
        assert_eq!(a.lgg(&b), expected);
    }

    #[test]
    fn test_unmatched_children_pair_in_order_and_merge() {
        let a = iri("a")
            .with_child(p("x"), lit("1"))
            .with_child(p("x"), lit("2"));
        let b = iri("b")
            .with_child(p("x"), lit("3"))
            .with_child(p("x"), lit("4"))
            .with_child(p("x"), lit("5"));
        // both pairs generalize to a wildcard leaf and collapse into one child
        let expected = QueryTree::wildcard().with_child(p("x"), QueryTree::wildcard());
        let lgg = a.lgg(&b);
        assert_eq!(lgg, expected);
        assert_eq!(lgg.children(ROOT).len(), 1);
    }

    #[test]
    fn test_nested_generalization() {
        let a = iri("anna").with_child(
            p("birthPlace"),
            iri("Berlin")
                .with_child(p("locatedIn"), lit("Germany"))
                .with_child(p("population"), lit("3.6M")),
        );
        let b = iri("bert").with_child(
            p("birthPlace"),
            iri("Bonn")
                .with_child(p("locatedIn"), lit("Germany"))
                .with_child(p("population"), lit("0.3M")),
        );
        let expected = QueryTree::wildcard().with_child(
            p("birthPlace"),
            QueryTree::wildcard()
                .with_child(p("locatedIn"), lit("Germany"))
                .with_child(p("population"), QueryTree::wildcard()),
        );
        assert_eq!(a.lgg(&b), expected);
    }

    #[test]
    fn test_lgg_all() {
        assert!(matches!(lgg_all(&Vec::<QueryTree>::new()), Err(SparqlLggError::EmptyInput)));

        let single = iri("a").with_provenance(Term::iri("http://ex.org/a"));
        let lgg = lgg_all(std::slice::from_ref(&single)).unwrap();
        assert_eq!(lgg, single);

        let trees = vec![
            iri("a").with_child(p("x"), lit("1")).with_child(p("y"), lit("1")),
            iri("b").with_child(p("x"), lit("1")).with_child(p("y"), lit("2")),
            iri("c").with_child(p("x"), lit("1")),
        ];
        let expected = QueryTree::wildcard().with_child(p("x"), lit("1"));
        let lgg = lgg_all(&trees).unwrap();
        assert_eq!(lgg, expected);
        assert!(lgg.provenance().is_none());
    }
}
