//! Parser for the SELECT dialect emitted by [`QueryTree::to_select_query`]
//!
//! Supported: `SELECT [DISTINCT] ?v [WHERE] { s p o . ... } [LIMIT n]` with IRIs,
//! literals (language tag or datatype), blank nodes, variables and `a` for
//! `rdf:type`. Blank nodes in a pattern act as variables.
//!
//! [`QueryTree::to_select_query`]: crate::tree::QueryTree::to_select_query

use crate::tree::{PatternTerm, Term, TriplePattern, RDF_TYPE};
use crate::{Result, SparqlLggError};
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// A parsed SELECT query over one basic graph pattern
#[derive(Clone, Debug, PartialEq)]
pub struct SelectQuery {
    /// Projected variable, without the leading `?`
    pub variable: String,
    /// Statements of the WHERE block
    pub patterns: Vec<TriplePattern>,
    /// Optional LIMIT
    pub limit: Option<usize>,
}

impl SelectQuery {
    /// Parse a query string
    pub fn parse(query: &str) -> Result<Self> {
        let tokens = tokenize(query).map_err(SparqlLggError::Parse)?;
        Parser { tokens, pos: 0 }.select().map_err(SparqlLggError::Parse)
    }
}

impl FromStr for SelectQuery {
    type Err = SparqlLggError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Word(String),
    Variable(String),
    Term(Term),
    LBrace,
    RBrace,
    Dot,
}

/// Split query or N-Triples text into tokens
pub(crate) fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' => {
                chars.next();
                tokens.push(Token::LBrace);
            }
            '}' => {
                chars.next();
                tokens.push(Token::RBrace);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '?' | '$' => {
                chars.next();
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err("variable without a name".to_string());
                }
                tokens.push(Token::Variable(name));
            }
            '<' => {
                chars.next();
                tokens.push(Token::Term(Term::Iri(read_iri(&mut chars)?)));
            }
            '"' => {
                chars.next();
                tokens.push(Token::Term(read_literal(&mut chars)?));
            }
            '_' => {
                chars.next();
                if chars.next() != Some(':') {
                    return Err("expected ':' after '_'".to_string());
                }
                let id = take_name(&mut chars);
                if id.is_empty() {
                    return Err("blank node without a label".to_string());
                }
                tokens.push(Token::Term(Term::Blank(id)));
            }
            c if c.is_alphanumeric() => {
                tokens.push(Token::Word(take_name(&mut chars)));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

fn take_name(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn read_iri(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<String, String> {
    let mut iri = String::new();
    for c in chars.by_ref() {
        if c == '>' {
            return Ok(iri);
        }
        iri.push(c);
    }
    Err(format!("unterminated IRI <{}", iri))
}

fn read_literal(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Term, String> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('"') => break,
            Some('\\') => match chars.next() {
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some('t') => value.push('\t'),
                Some(c) => value.push(c),
                None => return Err("unterminated escape in literal".to_string()),
            },
            Some(c) => value.push(c),
            None => return Err(format!("unterminated literal \"{}", value)),
        }
    }

    match chars.peek() {
        Some('@') => {
            chars.next();
            let language = take_name(chars);
            if language.is_empty() {
                return Err("empty language tag".to_string());
            }
            Ok(Term::lang_literal(value, language))
        }
        Some('^') => {
            chars.next();
            if chars.next() != Some('^') || chars.next() != Some('<') {
                return Err("expected ^^<datatype> after literal".to_string());
            }
            Ok(Term::typed_literal(value, read_iri(chars)?))
        }
        _ => Ok(Term::literal(value)),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn select(mut self) -> std::result::Result<SelectQuery, String> {
        if !self.keyword("SELECT") {
            return Err("expected SELECT".to_string());
        }
        self.keyword("DISTINCT");
        let variable = match self.next() {
            Some(Token::Variable(name)) => name,
            other => return Err(format!("expected projection variable, found {:?}", other)),
        };
        self.keyword("WHERE");
        if self.next() != Some(Token::LBrace) {
            return Err("expected '{'".to_string());
        }

        let mut patterns = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Dot) => {
                    self.pos += 1;
                }
                Some(_) => patterns.push(self.triple_pattern()?),
                None => return Err("unterminated WHERE block".to_string()),
            }
        }

        let limit = if self.keyword("LIMIT") {
            match self.next() {
                Some(Token::Word(n)) => Some(
                    n.parse::<usize>()
                        .map_err(|_| format!("invalid LIMIT '{}'", n))?,
                ),
                other => return Err(format!("expected LIMIT value, found {:?}", other)),
            }
        } else {
            None
        };
        if let Some(token) = self.peek() {
            return Err(format!("unexpected trailing token {:?}", token));
        }

        Ok(SelectQuery {
            variable,
            patterns,
            limit,
        })
    }

    fn triple_pattern(&mut self) -> std::result::Result<TriplePattern, String> {
        let subject = match self.next() {
            Some(Token::Term(term)) if term.is_literal() => {
                return Err("literal in subject position".to_string())
            }
            Some(token) => pattern_term(token)?,
            None => return Err("missing subject".to_string()),
        };
        let predicate = match self.next() {
            Some(Token::Term(Term::Iri(iri))) => iri,
            Some(Token::Word(word)) if word == "a" => RDF_TYPE.to_string(),
            other => return Err(format!("expected predicate IRI, found {:?}", other)),
        };
        let object = match self.next() {
            Some(token) => pattern_term(token)?,
            None => return Err("missing object".to_string()),
        };
        Ok(TriplePattern {
            subject,
            predicate,
            object,
        })
    }
}

fn pattern_term(token: Token) -> std::result::Result<PatternTerm, String> {
    match token {
        Token::Variable(name) => Ok(PatternTerm::Variable(name)),
        Token::Term(Term::Blank(id)) => Ok(PatternTerm::Variable(format!("_:{}", id))),
        Token::Term(term) => Ok(PatternTerm::Term(term)),
        other => Err(format!("expected term or variable, found {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{EdgeLabel, NodeLabel, QueryTree};

    #[test]
    fn test_parse_emitted_query() {
        let tree = QueryTree::wildcard()
            .with_child(EdgeLabel::Type, QueryTree::leaf(NodeLabel::iri("http://ex.org/Person")))
            .with_child(
                EdgeLabel::property("http://ex.org/name"),
                QueryTree::leaf(Term::lang_literal("Anna \"A\" \\ B", "en")),
            )
            .with_child(
                EdgeLabel::property("http://ex.org/age"),
                QueryTree::leaf(Term::typed_literal(
                    "42",
                    "http://www.w3.org/2001/XMLSchema#integer",
                )),
            );
        let query = SelectQuery::parse(&tree.to_select_query(Some(5))).unwrap();

        assert_eq!(query.variable, "x0");
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.patterns, tree.pattern_statements());
    }

    #[test]
    fn test_parse_shorthand_and_blank_nodes() {
        let text = "select ?s where { ?s a <http://ex.org/C> . ?s <http://ex.org/p> _:b1 }";
        let query: SelectQuery = text.parse().unwrap();
        assert_eq!(query.patterns.len(), 2);
        assert_eq!(query.patterns[0].predicate, RDF_TYPE);
        assert_eq!(query.patterns[1].object, PatternTerm::Variable("_:b1".to_string()));
        assert_eq!(query.limit, None);
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "",
            "ASK { ?s ?p ?o }",
            "SELECT ?x WHERE { ?x <p> }",
            "SELECT ?x WHERE { ?x ?p ?o }",
            "SELECT ?x WHERE { ?x <p> \"open }",
            "SELECT ?x WHERE { ?x <p> ?y } LIMIT many",
            "SELECT ?x WHERE { \"lit\" <p> ?x }",
        ] {
            assert!(
                matches!(SelectQuery::parse(bad), Err(SparqlLggError::Parse(_))),
                "accepted: {}",
                bad
            );
        }
    }
}
