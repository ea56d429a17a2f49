//! Query dialects
//!
//! A dialect bundles the syntax rules of one query language. Each variant of
//! [`Dialect`] maps to a single static [`DialectRules`] record, so every
//! language-specific decision in the crate goes through one table lookup.
//!
//! ```ignore
//! let dialect = Dialect::from_tag("sparql")?;
//! assert_eq!(dialect.projection_variable("book"), "?book");
//! assert_eq!(dialect.pattern_keyword(), "where");
//! ```

pub mod serql;
pub mod sparql;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::term::escape_literal;
use crate::model::Term;
use crate::namespaces::NamespaceTable;
use crate::query::errors::QueryError;
use crate::query_parser::{ParseFailure, ParsedQuery};

/// Syntax rules of one query language.
pub struct DialectRules {
    /// Canonical language tag.
    pub name: &'static str,
    /// Keyword introducing the graph pattern of a query.
    pub pattern_keyword: &'static str,
    /// Top-level keywords a complete query starts with.
    pub query_keywords: &'static [&'static str],
    /// Variable token substituted for template placeholders before validation.
    pub canonical_variable: &'static str,
    /// "Don't care" token used when a variable has no name.
    pub anonymous_variable: &'static str,
    pub stable_anonymous_ids: bool,
    pub projection_variable: fn(&str) -> String,
    pub variable_syntax: fn(&str) -> String,
    pub render_value_literal: fn(&Term) -> String,
    pub inject_namespace_prefixes: fn(&str, &NamespaceTable) -> String,
    pub validate: fn(&str) -> Result<ParsedQuery, ParseFailure>,
}

impl fmt::Debug for DialectRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRules")
            .field("name", &self.name)
            .field("pattern_keyword", &self.pattern_keyword)
            .field("query_keywords", &self.query_keywords)
            .field("stable_anonymous_ids", &self.stable_anonymous_ids)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    #[default]
    Sparql,
    Serql,
}

lazy_static::lazy_static! {
    static ref DIALECT_TAGS: HashMap<&'static str, Dialect> = {
        let mut m = HashMap::new();

        m.insert("sparql", Dialect::Sparql);
        m.insert("sparql11", Dialect::Sparql);
        m.insert("sparql-1.1", Dialect::Sparql);

        m.insert("serql", Dialect::Serql);
        m.insert("sesame", Dialect::Serql);

        m
    };
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Sparql, Dialect::Serql];

    /// Look up a dialect by language tag. Tags are case-insensitive.
    pub fn from_tag(tag: &str) -> Result<Dialect, QueryError> {
        let key = tag.trim().to_ascii_lowercase();
        DIALECT_TAGS
            .get(key.as_str())
            .copied()
            .ok_or_else(|| QueryError::UnknownDialect {
                tag: tag.to_string(),
            })
    }

    /// Every tag accepted by [`Dialect::from_tag`] for this dialect, sorted.
    pub fn tags(self) -> Vec<&'static str> {
        let mut tags: Vec<_> = DIALECT_TAGS
            .iter()
            .filter(|(_, d)| **d == self)
            .map(|(tag, _)| *tag)
            .collect();
        tags.sort_unstable();
        tags
    }

    pub fn rules(self) -> &'static DialectRules {
        match self {
            Dialect::Sparql => &sparql::RULES,
            Dialect::Serql => &serql::RULES,
        }
    }

    pub fn name(self) -> &'static str {
        self.rules().name
    }

    pub fn projection_variable(self, name: &str) -> String {
        (self.rules().projection_variable)(name)
    }

    pub fn pattern_keyword(self) -> &'static str {
        self.rules().pattern_keyword
    }

    /// Variable token for `name`; blank names give the anonymous token.
    pub fn variable_syntax(self, name: &str) -> String {
        (self.rules().variable_syntax)(name)
    }

    pub fn render_value_literal(self, term: &Term) -> String {
        (self.rules().render_value_literal)(term)
    }

    pub fn inject_namespace_prefixes(self, buffer: &str, table: &NamespaceTable) -> String {
        (self.rules().inject_namespace_prefixes)(buffer, table)
    }

    pub fn supports_stable_anonymous_ids(self) -> bool {
        self.rules().stable_anonymous_ids
    }

    pub fn query_keywords(self) -> &'static [&'static str] {
        self.rules().query_keywords
    }

    pub fn canonical_variable(self) -> &'static str {
        self.rules().canonical_variable
    }

    pub fn validate(self, query: &str) -> Result<ParsedQuery, ParseFailure> {
        (self.rules().validate)(query)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dialect {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_tag(s)
    }
}

impl TryFrom<String> for Dialect {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Dialect::from_tag(&value)
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.name().to_string()
    }
}

/// Term rendering shared by both languages: `<iri>`, `_:id`, or a quoted
/// literal with its language tag or datatype.
pub(crate) fn render_term(term: &Term) -> String {
    match term {
        Term::Iri { value } => format!("<{}>", value),
        Term::BlankNode { value } => format!("_:{}", value),
        Term::Literal {
            lexical,
            datatype,
            language,
        } => match (language, datatype) {
            (Some(lang), _) => format!("\"{}\"@{}", escape_literal(lexical), lang),
            (None, Some(dt)) => format!("\"{}\"^^<{}>", escape_literal(lexical), dt),
            (None, None) => format!("\"{}\"", escape_literal(lexical)),
        },
    }
}
