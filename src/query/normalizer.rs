//! Query normalization
//!
//! Callers may hand the mapper either a complete query or a bare graph
//! pattern. Normalization turns both into one complete query in the target
//! dialect, declares the registered namespaces, and validates the result
//! with the dialect's parser before anything reaches a store.
//!
//! ```text
//! ?x dc:title "Foo"        (fragment, SPARQL, default variable `book`)
//!     -> PREFIX dc: <http://purl.org/dc/terms/>
//!        select ?book where ?x dc:title "Foo"
//! ```

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Serialize;

use super::errors::QueryError;
use crate::dialect::Dialect;
use crate::namespaces::{self, NamespaceTable};
use crate::query_parser::ParsedQuery;

/// Template placeholder `??name`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?\?([A-Za-z_][A-Za-z0-9_-]*)").unwrap());

/// Quoted literals and `<iri>` references, whose content is never syntax.
static OPAQUE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|<[^<>"{}|^`\\\s]*>"#).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryShape {
    /// Input already started with a top-level query keyword.
    Complete,
    /// Input was a bare pattern wrapped in a synthesized projection.
    Fragment,
}

#[derive(Debug, Clone)]
pub struct NormalizedQuery {
    /// The query as it will be sent to the store.
    pub text: String,
    pub shape: QueryShape,
    pub parsed: ParsedQuery,
}

/// Normalize against the process-wide namespace table.
pub fn normalize(
    fragment: &str,
    dialect: Dialect,
    default_var: &str,
) -> Result<NormalizedQuery, QueryError> {
    normalize_with(fragment, dialect, default_var, &namespaces::snapshot())
}

pub fn normalize_with(
    fragment: &str,
    dialect: Dialect,
    default_var: &str,
    table: &NamespaceTable,
) -> Result<NormalizedQuery, QueryError> {
    let (shape, body) = assemble(fragment, dialect, default_var);
    finish(body, shape, dialect, table)
}

/// Steps up to and including fragment wrapping: sniff the input, and for a
/// fragment synthesize the projection and pattern keyword around it.
pub(crate) fn assemble(fragment: &str, dialect: Dialect, default_var: &str) -> (QueryShape, String) {
    let working = sniffing_copy(fragment, dialect);

    if starts_with_any_keyword(&working, dialect.query_keywords()) {
        debug!("{} input is a complete query", dialect);
        return (QueryShape::Complete, fragment.to_string());
    }

    let body = fragment.trim();
    let keyword = dialect.pattern_keyword();
    let body = if contains_word(&working, keyword) {
        body.to_string()
    } else {
        format!("{} {}", keyword, body)
    };
    let assembled = format!("select {} {}", dialect.projection_variable(default_var), body);
    debug!("{} fragment wrapped as: {}", dialect, assembled);
    (QueryShape::Fragment, assembled)
}

/// Prefix injection and validation. Prefixes are injected even when the
/// body declares some of its own; duplicates are left for the parser.
pub(crate) fn finish(
    body: String,
    shape: QueryShape,
    dialect: Dialect,
    table: &NamespaceTable,
) -> Result<NormalizedQuery, QueryError> {
    let text = dialect.inject_namespace_prefixes(&body, table);
    let candidate = substitute_placeholders(&text, dialect.canonical_variable());

    match dialect.validate(&candidate) {
        Ok(parsed) => {
            debug!("normalized {} query: {}", dialect, text);
            Ok(NormalizedQuery {
                text,
                shape,
                parsed,
            })
        }
        Err(failure) => {
            debug!("{} query rejected: {}", dialect, failure);
            Err(QueryError::InvalidQuery {
                query: text,
                reason: failure.message,
            })
        }
    }
}

/// Lowercased, trimmed copy used for keyword sniffing only. Literals and
/// IRIs are blanked so words inside them are not taken for keywords.
fn sniffing_copy(fragment: &str, dialect: Dialect) -> String {
    let masked = OPAQUE_TOKEN.replace_all(fragment.trim(), " ");
    let lowered = masked.trim().to_lowercase();
    substitute_placeholders(&lowered, dialect.canonical_variable())
}

pub(crate) fn substitute_placeholders(text: &str, replacement: &str) -> String {
    PLACEHOLDER.replace_all(text, replacement).into_owned()
}

/// Names of the `??name` placeholders in `text`, in order of first use.
pub(crate) fn placeholder_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ';' | ',' | '.')
}

fn starts_with_any_keyword(working: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| {
        working
            .strip_prefix(kw)
            .is_some_and(|rest| rest.chars().next().is_none_or(is_boundary))
    })
}

/// Whole-word search in an already lowercased string.
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + word.len()..].chars().next();
        before.is_none_or(is_boundary) && after.is_none_or(is_boundary)
    })
}
