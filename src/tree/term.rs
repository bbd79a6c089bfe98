//! RDF terms, node labels and edge labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// IRI of `rdf:type`, mapped to [`EdgeLabel::Type`]
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
/// IRI of `rdfs:label`
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
/// IRI of `rdfs:subClassOf`
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
/// IRI of `owl:Thing`
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";

/// A concrete RDF term
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// An IRI, stored without angle brackets
    Iri(String),
    /// A literal with optional datatype IRI or language tag
    Literal {
        /// Lexical form
        value: String,
        /// Datatype IRI
        datatype: Option<String>,
        /// Language tag
        language: Option<String>,
    },
    /// A blank node identifier, stored without the `_:` prefix
    Blank(String),
}

impl Term {
    /// Create an IRI term
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Create a plain literal
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a language-tagged literal
    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// Create a typed literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// Create a blank node
    pub fn blank(id: impl Into<String>) -> Self {
        Term::Blank(id.into())
    }

    /// Whether this term is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Whether this term is a blank node
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    /// The IRI string, if this is an IRI
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

/// Escape a literal's lexical form for the query and N-Triples syntax
pub(crate) fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
            Term::Blank(id) => write!(f, "_:{}", id),
        }
    }
}

/// Label of a query-tree node
///
/// The wildcard is its own variant so that no concrete term can collide with it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    /// A concrete term
    Concrete(Term),
    /// Unconstrained, matches anything
    Wildcard,
}

impl NodeLabel {
    /// Shorthand for a concrete IRI label
    pub fn iri(iri: impl Into<String>) -> Self {
        NodeLabel::Concrete(Term::iri(iri))
    }

    /// Shorthand for a concrete plain-literal label
    pub fn literal(value: impl Into<String>) -> Self {
        NodeLabel::Concrete(Term::literal(value))
    }

    /// Whether the label is the wildcard
    pub fn is_wildcard(&self) -> bool {
        matches!(self, NodeLabel::Wildcard)
    }

    /// The concrete term, if any
    pub fn term(&self) -> Option<&Term> {
        match self {
            NodeLabel::Concrete(term) => Some(term),
            NodeLabel::Wildcard => None,
        }
    }
}

impl From<Term> for NodeLabel {
    fn from(term: Term) -> Self {
        NodeLabel::Concrete(term)
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeLabel::Concrete(term) => write!(f, "{}", term),
            NodeLabel::Wildcard => write!(f, "?"),
        }
    }
}

/// Label of an edge between a node and one of its children
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeLabel {
    /// The reserved is-a edge (`rdf:type`)
    Type,
    /// Any other predicate IRI
    Property(String),
}

impl EdgeLabel {
    /// Map a predicate IRI to an edge label
    pub fn from_predicate(iri: &str) -> Self {
        if iri == RDF_TYPE {
            EdgeLabel::Type
        } else {
            EdgeLabel::Property(iri.to_string())
        }
    }

    /// Shorthand for a property edge
    pub fn property(iri: impl Into<String>) -> Self {
        let iri = iri.into();
        if iri == RDF_TYPE {
            EdgeLabel::Type
        } else {
            EdgeLabel::Property(iri)
        }
    }

    /// The predicate IRI this edge stands for
    pub fn predicate(&self) -> &str {
        match self {
            EdgeLabel::Type => RDF_TYPE,
            EdgeLabel::Property(iri) => iri,
        }
    }

    /// Whether this is the reserved type edge
    pub fn is_type(&self) -> bool {
        matches!(self, EdgeLabel::Type)
    }

    /// Fold a `Property` spelling of `rdf:type` into `Type`
    pub fn normalized(self) -> Self {
        match self {
            EdgeLabel::Property(iri) => EdgeLabel::property(iri),
            edge => edge,
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.predicate())
    }
}

/// A (subject, predicate, object) statement
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    /// Subject term
    pub subject: Term,
    /// Predicate IRI
    pub predicate: String,
    /// Object term
    pub object: Term,
}

impl Triple {
    /// Create a new triple
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Triple {
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    /// Render as one N-Triples line
    pub fn to_ntriples(&self) -> String {
        format!("{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ntriples())
    }
}
