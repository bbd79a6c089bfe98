//! Arena-backed query tree

use super::term::{EdgeLabel, NodeLabel, Term};
use crate::{Result, SparqlLggError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Index of a node inside a [`QueryTree`]
pub type NodeId = usize;

/// Index of the root node
pub const ROOT: NodeId = 0;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Node {
    label: NodeLabel,
    parent: Option<NodeId>,
    children: Vec<(EdgeLabel, NodeId)>,
}

impl Node {
    fn new(label: NodeLabel) -> Self {
        Node {
            label,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A rooted, edge-labeled tree describing the neighborhood of a resource
///
/// - Node 0 is always the root
/// - Nodes live in a contiguous arena; children are index lists in insertion order
/// - The parent index is a back-reference only, ownership runs top-down
/// - Equality and hashing are structural and ignore the provenance tag
///
/// Deserialization replays every edge through [`QueryTree::add_child`], so
/// cyclic or dangling input fails with `InvalidStructure`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawQueryTree")]
pub struct QueryTree {
    nodes: Vec<Node>,
    provenance: Option<Term>,
}

/// Unchecked wire shape of a [`QueryTree`]
#[derive(Deserialize)]
struct RawQueryTree {
    nodes: Vec<Node>,
    provenance: Option<Term>,
}

impl TryFrom<RawQueryTree> for QueryTree {
    type Error = SparqlLggError;

    fn try_from(raw: RawQueryTree) -> Result<Self> {
        let mut nodes = raw.nodes.into_iter();
        let root = nodes
            .next()
            .ok_or_else(|| SparqlLggError::InvalidStructure("tree has no nodes".to_string()))?;

        let mut tree = QueryTree::leaf(root.label);
        let mut edges = vec![root.children];
        for node in nodes {
            tree.add_node(node.label);
            edges.push(node.children);
        }
        for (parent, children) in edges.into_iter().enumerate() {
            for (edge, child) in children {
                tree.add_child(parent, edge, child)?;
            }
        }
        tree.set_provenance(raw.provenance);
        Ok(tree)
    }
}

impl QueryTree {
    /// Create a single-node tree
    pub fn leaf(label: impl Into<NodeLabel>) -> Self {
        QueryTree {
            nodes: vec![Node::new(label.into())],
            provenance: None,
        }
    }

    /// Create a single wildcard node
    pub fn wildcard() -> Self {
        Self::leaf(NodeLabel::Wildcard)
    }

    /// Attach a provenance tag
    pub fn with_provenance(mut self, provenance: Term) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// The resource this tree was built from, if any
    pub fn provenance(&self) -> Option<&Term> {
        self.provenance.as_ref()
    }

    pub(crate) fn set_provenance(&mut self, provenance: Option<Term>) {
        self.provenance = provenance;
    }

    /// Allocate a detached node; attach it with [`QueryTree::add_child`]
    pub fn add_node(&mut self, label: impl Into<NodeLabel>) -> NodeId {
        self.nodes.push(Node::new(label.into()));
        self.nodes.len() - 1
    }

    /// Attach the detached node `child` under `parent` via `edge`
    ///
    /// Fails with `InvalidStructure` when `child` is `parent` itself or one of
    /// its ancestors, when `child` is the root, or when `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, edge: EdgeLabel, child: NodeId) -> Result<()> {
        self.check_node(parent)?;
        self.check_node(child)?;

        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return Err(SparqlLggError::InvalidStructure(format!(
                    "attaching node {} under node {} would create a cycle",
                    child, parent
                )));
            }
            cursor = self.nodes[node].parent;
        }
        if child == ROOT {
            return Err(SparqlLggError::InvalidStructure(
                "the root cannot become a child".to_string(),
            ));
        }
        if let Some(existing) = self.nodes[child].parent {
            return Err(SparqlLggError::InvalidStructure(format!(
                "node {} is already a child of node {}",
                child, existing
            )));
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push((edge.normalized(), child));
        Ok(())
    }

    /// Create a new node labeled `label` under `parent`
    pub fn push_child(
        &mut self,
        parent: NodeId,
        edge: EdgeLabel,
        label: impl Into<NodeLabel>,
    ) -> Result<NodeId> {
        self.check_node(parent)?;
        let child = self.add_node(label);
        self.add_child(parent, edge, child)?;
        Ok(child)
    }

    /// Copy `subtree` under `parent`, returning the id of the copied root
    pub fn graft(
        &mut self,
        parent: NodeId,
        edge: EdgeLabel,
        subtree: &QueryTree,
    ) -> Result<NodeId> {
        self.check_node(parent)?;
        Ok(self.copy_from(parent, edge, subtree, ROOT))
    }

    /// Builder-style graft under the root
    pub fn with_child(mut self, edge: EdgeLabel, subtree: QueryTree) -> Self {
        self.copy_from(ROOT, edge, &subtree, ROOT);
        self
    }

    /// Copy `source`'s subtree at `node` under `parent`; `parent` must exist
    pub(crate) fn copy_from(
        &mut self,
        parent: NodeId,
        edge: EdgeLabel,
        source: &QueryTree,
        node: NodeId,
    ) -> NodeId {
        let copy = self.add_node(source.nodes[node].label.clone());
        self.nodes[copy].parent = Some(parent);
        self.nodes[parent].children.push((edge.normalized(), copy));
        for (child_edge, child) in &source.nodes[node].children {
            self.copy_from(copy, child_edge.clone(), source, *child);
        }
        copy
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if node >= self.nodes.len() {
            return Err(SparqlLggError::InvalidStructure(format!(
                "node {} out of bounds (arena holds {})",
                node,
                self.nodes.len()
            )));
        }
        Ok(())
    }

    /// Label of a node
    pub fn label(&self, node: NodeId) -> &NodeLabel {
        &self.nodes[node].label
    }

    /// Label of the root
    pub fn root_label(&self) -> &NodeLabel {
        self.label(ROOT)
    }

    pub(crate) fn set_label(&mut self, node: NodeId, label: NodeLabel) {
        self.nodes[node].label = label;
    }

    /// Parent of a node (None for the root and for detached nodes)
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    /// Label of the edge leading into `node`
    pub fn incoming_edge(&self, node: NodeId) -> Option<&EdgeLabel> {
        let parent = self.nodes[node].parent?;
        self.nodes[parent]
            .children
            .iter()
            .find(|(_, child)| *child == node)
            .map(|(edge, _)| edge)
    }

    /// Children of a node with their edge labels, in insertion order
    pub fn children(&self, node: NodeId) -> &[(EdgeLabel, NodeId)] {
        &self.nodes[node].children
    }

    /// Children reached through `edge`; empty when there are none
    pub fn children_by_edge(&self, node: NodeId, edge: &EdgeLabel) -> Vec<NodeId> {
        self.nodes[node]
            .children
            .iter()
            .filter(|(e, _)| e.predicate() == edge.predicate())
            .map(|(_, child)| *child)
            .collect()
    }

    /// Distinct outgoing edge labels of a node, in first-seen order
    pub fn edges(&self, node: NodeId) -> Vec<&EdgeLabel> {
        let mut edges: Vec<&EdgeLabel> = Vec::new();
        for (edge, _) in &self.nodes[node].children {
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
        edges
    }

    /// Whether a node has no children
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node].children.is_empty()
    }

    /// Number of nodes reachable from the root
    pub fn size(&self) -> usize {
        self.subtree_size(ROOT)
    }

    /// Number of nodes in the subtree rooted at `node`
    pub fn subtree_size(&self, node: NodeId) -> usize {
        1 + self.nodes[node]
            .children
            .iter()
            .map(|(_, child)| self.subtree_size(*child))
            .sum::<usize>()
    }

    /// Length of the longest root-to-leaf path, in edges
    pub fn max_depth(&self) -> usize {
        self.depth_below(ROOT)
    }

    fn depth_below(&self, node: NodeId) -> usize {
        self.nodes[node]
            .children
            .iter()
            .map(|(_, child)| 1 + self.depth_below(*child))
            .max()
            .unwrap_or(0)
    }

    /// Depth of a node (root is 0)
    pub fn node_depth(&self, mut node: NodeId) -> usize {
        let mut depth = 0;
        while let Some(parent) = self.nodes[node].parent {
            depth += 1;
            node = parent;
        }
        depth
    }

    /// Nodes reachable from the root in breadth-first order
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::new();
        queue.push_back(ROOT);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for (_, child) in &self.nodes[node].children {
                queue.push_back(*child);
            }
        }
        order
    }

    /// Reachable leaves in breadth-first order
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes()
            .into_iter()
            .filter(|&node| self.is_leaf(node))
            .collect()
    }

    /// Number of reachable nodes carrying a concrete label
    pub fn specific_node_count(&self) -> usize {
        self.nodes()
            .into_iter()
            .filter(|&node| !self.label(node).is_wildcard())
            .count()
    }

    /// Copy of the subtree rooted at `node`
    pub fn subtree(&self, node: NodeId) -> QueryTree {
        let mut tree = QueryTree::leaf(self.label(node).clone());
        for (edge, child) in &self.nodes[node].children {
            tree.copy_from(ROOT, edge.clone(), self, *child);
        }
        tree
    }

    /// Whether both trees have the same labels and edges up to sibling order
    pub fn structural_equals(&self, other: &QueryTree) -> bool {
        self.size() == other.size() && self.canonical_form() == other.canonical_form()
    }

    /// Order-independent string encoding of the whole tree
    pub fn canonical_form(&self) -> String {
        self.canonical_form_of(ROOT)
    }

    /// Order-independent string encoding of the subtree at `node`
    pub fn canonical_form_of(&self, node: NodeId) -> String {
        let mut child_forms: Vec<String> = self.nodes[node]
            .children
            .iter()
            .map(|(edge, child)| {
                format!("{}={}", encode_token(&edge.to_string()), self.canonical_form_of(*child))
            })
            .collect();
        child_forms.sort();
        format!(
            "{}({})",
            encode_token(&self.nodes[node].label.to_string()),
            child_forms.join(",")
        )
    }

    /// Canonical forms of every reachable node, indexed by node id
    pub(crate) fn canonical_forms(&self) -> Vec<String> {
        let mut forms = vec![String::new(); self.nodes.len()];
        for node in self.nodes().into_iter().rev() {
            let mut child_forms: Vec<String> = self.nodes[node]
                .children
                .iter()
                .map(|(edge, child)| {
                    format!("{}={}", encode_token(&edge.to_string()), forms[*child])
                })
                .collect();
            child_forms.sort();
            forms[node] = format!(
                "{}({})",
                encode_token(&self.nodes[node].label.to_string()),
                child_forms.join(",")
            );
        }
        forms
    }

    /// Indented text rendering, children in insertion order
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_recursive(&mut out, ROOT, None, 0);
        out
    }

    fn dump_recursive(
        &self,
        out: &mut String,
        node: NodeId,
        edge: Option<&EdgeLabel>,
        indent: usize,
    ) {
        for _ in 0..indent {
            out.push_str("  ");
        }
        match edge {
            Some(edge) => out.push_str(&format!("{} {}\n", edge, self.label(node))),
            None => out.push_str(&format!("{}\n", self.label(node))),
        }
        for (child_edge, child) in &self.nodes[node].children {
            self.dump_recursive(out, *child, Some(child_edge), indent + 1);
        }
    }
}

/// Length-prefixed token so that arbitrary IRIs cannot blur form boundaries
fn encode_token(token: &str) -> String {
    format!("{}:{}", token.len(), token)
}

impl PartialEq for QueryTree {
    fn eq(&self, other: &Self) -> bool {
        self.structural_equals(other)
    }
}

impl Eq for QueryTree {}

impl Hash for QueryTree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_form().hash(state);
    }
}

impl fmt::Debug for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provenance {
            Some(seed) => writeln!(f, "QueryTree(size={}, seed={})", self.size(), seed)?,
            None => writeln!(f, "QueryTree(size={})", self.size())?,
        }
        write!(f, "{}", self.dump())
    }
}

impl Default for QueryTree {
    fn default() -> Self {
        Self::wildcard()
    }
}

/// Builder for constructing trees from explicit node indices
///
/// Indices must be contiguous starting at 0 (the root); `build` validates
/// that every node is labeled, has one parent and is reachable.
pub struct QueryTreeBuilder {
    labels: Vec<Option<NodeLabel>>,
    edges: Vec<(usize, EdgeLabel, usize)>,
    provenance: Option<Term>,
}

impl QueryTreeBuilder {
    /// Create a new builder starting with a root
    pub fn new(root: impl Into<NodeLabel>) -> Self {
        QueryTreeBuilder {
            labels: vec![Some(root.into())],
            edges: Vec::new(),
            provenance: None,
        }
    }

    /// Add node `child` labeled `label` under `parent`
    pub fn add_child(
        &mut self,
        parent: usize,
        child: usize,
        edge: EdgeLabel,
        label: impl Into<NodeLabel>,
    ) -> &mut Self {
        while self.labels.len() <= child {
            self.labels.push(None);
        }
        self.labels[child] = Some(label.into());
        self.edges.push((parent, edge, child));
        self
    }

    /// Set the provenance tag
    pub fn provenance(&mut self, seed: Term) -> &mut Self {
        self.provenance = Some(seed);
        self
    }

    /// Build the tree
    pub fn build(&self) -> Result<QueryTree> {
        let mut labels = self.labels.iter().enumerate().map(|(i, label)| {
            label.clone().ok_or_else(|| {
                SparqlLggError::InvalidStructure(format!("node {} has no label", i))
            })
        });
        let root = match labels.next() {
            Some(label) => label?,
            None => return Err(SparqlLggError::InvalidStructure("empty builder".to_string())),
        };
        let mut tree = QueryTree::leaf(root);
        for label in labels {
            tree.add_node(label?);
        }
        for (parent, edge, child) in &self.edges {
            tree.add_child(*parent, edge.clone(), *child)?;
        }
        if tree.size() != self.labels.len() {
            return Err(SparqlLggError::InvalidStructure(
                "tree is not connected".to_string(),
            ));
        }
        tree.set_provenance(self.provenance.clone());
        Ok(tree)
    }
}
