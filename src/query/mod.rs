//! Query construction and execution
//!
//! [`Query`] is the reusable form of a query: text in one dialect with
//! optional `??name` parameters, a projection variable for fragments, and
//! solution modifiers. Rendering runs the normalizer, so what reaches a
//! store is always complete and validated.
//!
//! ```ignore
//! let mut q = Query::new("?book dc:creator ??author", Dialect::Sparql)
//!     .with_projection_variable("book");
//! q.bind("author", Term::iri("http://example.org/ann")).limit(10);
//! let books = execute::select_entities(&source, &q, materializer)?;
//! ```

pub mod errors;
pub mod execute;
pub mod normalizer;

use std::collections::BTreeMap;

pub use errors::QueryError;
pub use normalizer::{normalize, normalize_with, NormalizedQuery, QueryShape};

use crate::dialect::Dialect;
use crate::model::Term;
use crate::namespaces::{self, NamespaceTable};
use crate::query_parser::QueryForm;

pub const DEFAULT_PROJECTION_VARIABLE: &str = "x";

#[derive(Debug, Clone)]
pub struct Query {
    text: String,
    dialect: Dialect,
    projection: String,
    /// Placeholder name to rendered token.
    bindings: BTreeMap<String, String>,
    limit: Option<u64>,
    offset: Option<u64>,
    namespaces: Option<NamespaceTable>,
}

impl Query {
    pub fn new(text: impl Into<String>, dialect: Dialect) -> Self {
        Query {
            text: text.into(),
            dialect,
            projection: DEFAULT_PROJECTION_VARIABLE.to_string(),
            bindings: BTreeMap::new(),
            limit: None,
            offset: None,
            namespaces: None,
        }
    }

    /// Variable projected when the text is a bare pattern.
    pub fn with_projection_variable(mut self, name: impl Into<String>) -> Self {
        self.projection = name.into();
        self
    }

    /// Use this table instead of the process-wide one.
    pub fn with_namespaces(mut self, table: NamespaceTable) -> Self {
        self.namespaces = Some(table);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn projection_variable(&self) -> &str {
        &self.projection
    }

    /// Placeholder names in the text, in order of first use.
    pub fn parameters(&self) -> Vec<String> {
        normalizer::placeholder_names(&self.text)
    }

    /// Bind `??name` to a value, rendered as a literal of this dialect.
    pub fn bind(&mut self, name: &str, value: impl Into<Term>) -> &mut Self {
        let rendered = self.dialect.render_value_literal(&value.into());
        self.bindings
            .insert(name.trim_start_matches('?').to_string(), rendered);
        self
    }

    /// Bind `??name` to a query variable. A blank variable name binds the
    /// dialect's anonymous token.
    pub fn bind_variable(&mut self, name: &str, variable: &str) -> &mut Self {
        let token = if variable.trim().is_empty() {
            self.dialect.variable_syntax(variable)
        } else {
            self.dialect.projection_variable(variable)
        };
        self.bindings
            .insert(name.trim_start_matches('?').to_string(), token);
        self
    }

    pub fn clear_bindings(&mut self) -> &mut Self {
        self.bindings.clear();
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Substitute bindings, normalize, and validate.
    pub fn render(&self) -> Result<NormalizedQuery, QueryError> {
        let bound = self.substitute()?;
        let (shape, mut body) = normalizer::assemble(&bound, self.dialect, &self.projection);

        if let Some(limit) = self.limit {
            body = format!("{} limit {}", body.trim_end(), limit);
        }
        if let Some(offset) = self.offset {
            body = format!("{} offset {}", body.trim_end(), offset);
        }

        match &self.namespaces {
            Some(table) => normalizer::finish(body, shape, self.dialect, table),
            None => normalizer::finish(body, shape, self.dialect, &namespaces::snapshot()),
        }
    }

    pub fn query_type(&self) -> Result<QueryForm, QueryError> {
        self.render().map(|q| q.parsed.form)
    }

    fn substitute(&self) -> Result<String, QueryError> {
        let mut text = self.text.clone();
        for name in normalizer::placeholder_names(&self.text) {
            let token = self
                .bindings
                .get(&name)
                .ok_or_else(|| QueryError::UnboundParameter { name: name.clone() })?;
            text = replace_placeholder(&text, &name, token);
        }
        Ok(text)
    }
}

/// Replace `??name` where it is not the prefix of a longer placeholder.
fn replace_placeholder(text: &str, name: &str, token: &str) -> String {
    let needle = format!("??{}", name);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(&needle) {
        let after = &rest[at + needle.len()..];
        out.push_str(&rest[..at]);
        if after
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            out.push_str(&needle);
        } else {
            out.push_str(token);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}
