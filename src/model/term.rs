use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::identifier::EntityIdentifier;

pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// A node value in a triple: IRI, blank node or literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    Iri { value: String },
    BlankNode { value: String },
    Literal {
        lexical: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        datatype: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        language: Option<String>,
    },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri {
            value: value.into(),
        }
    }

    pub fn blank(value: impl Into<String>) -> Self {
        Term::BlankNode {
            value: value.into(),
        }
    }

    /// Plain literal with no datatype or language tag.
    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed_literal(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn lang_literal(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// The node identifier, if this term names a graph node.
    pub fn as_identifier(&self) -> Option<EntityIdentifier> {
        match self {
            Term::Iri { value } => Some(EntityIdentifier::Iri(value.clone())),
            Term::BlankNode { value } => Some(EntityIdentifier::Anonymous(value.clone())),
            Term::Literal { .. } => None,
        }
    }

    /// Lexical form of a literal, IRI text, or blank node label.
    pub fn lexical(&self) -> &str {
        match self {
            Term::Iri { value } | Term::BlankNode { value } => value,
            Term::Literal { lexical, .. } => lexical,
        }
    }
}

impl fmt::Display for Term {
    /// N-Triples style rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri { value } => write!(f, "<{}>", value),
            Term::BlankNode { value } => write!(f, "_:{}", value),
            Term::Literal {
                lexical,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape_literal(lexical))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Escape a lexical form for use inside a double-quoted literal.
pub fn escape_literal(lexical: &str) -> String {
    let mut out = String::with_capacity(lexical.len());
    for c in lexical.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

pub fn unescape_literal(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

impl From<EntityIdentifier> for Term {
    fn from(id: EntityIdentifier) -> Self {
        match id {
            EntityIdentifier::Iri(value) => Term::Iri { value },
            EntityIdentifier::Anonymous(value) => Term::BlankNode { value },
        }
    }
}

impl From<&EntityIdentifier> for Term {
    fn from(id: &EntityIdentifier) -> Self {
        Term::from(id.clone())
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::literal(value)
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::literal(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::typed_literal(value.to_string(), XSD_INTEGER)
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::typed_literal(value.to_string(), XSD_DOUBLE)
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::typed_literal(value.to_string(), XSD_BOOLEAN)
    }
}

impl From<NaiveDate> for Term {
    fn from(value: NaiveDate) -> Self {
        Term::typed_literal(value.format("%Y-%m-%d").to_string(), XSD_DATE)
    }
}

impl From<DateTime<Utc>> for Term {
    fn from(value: DateTime<Utc>) -> Self {
        Term::typed_literal(
            value.to_rfc3339_opts(SecondsFormat::Millis, true),
            XSD_DATE_TIME,
        )
    }
}
