use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ModelError;

/// Key naming one graph node.
///
/// Either an absolute IRI or an anonymous (blank node) label. Two identifiers
/// are equal iff their canonical forms are equal, so an IRI and a blank node
/// with the same text never collide (`_:` is part of the anonymous form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityIdentifier {
    Iri(String),
    Anonymous(String),
}

impl EntityIdentifier {
    /// Build an IRI identifier, rejecting relative references.
    pub fn iri(iri: impl Into<String>) -> Result<Self, ModelError> {
        let iri = iri.into();
        if !looks_absolute(&iri) {
            return Err(ModelError::InvalidIdentifier { value: iri });
        }
        Ok(EntityIdentifier::Iri(iri))
    }

    pub fn anonymous(label: impl Into<String>) -> Self {
        EntityIdentifier::Anonymous(label.into())
    }

    /// Mint a fresh anonymous identifier, as a store does on first persist.
    pub fn generate_anonymous() -> Self {
        EntityIdentifier::Anonymous(Uuid::new_v4().simple().to_string())
    }

    /// Parse the canonical text form: `_:label` or an absolute IRI, with or
    /// without surrounding angle brackets.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let text = text.trim();
        if let Some(label) = text.strip_prefix("_:") {
            if label.is_empty() {
                return Err(ModelError::InvalidIdentifier {
                    value: text.to_string(),
                });
            }
            return Ok(EntityIdentifier::anonymous(label));
        }
        let unbracketed = text
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(text);
        EntityIdentifier::iri(unbracketed)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, EntityIdentifier::Anonymous(_))
    }

    /// The raw IRI or blank node label, without syntax.
    pub fn as_str(&self) -> &str {
        match self {
            EntityIdentifier::Iri(iri) => iri,
            EntityIdentifier::Anonymous(label) => label,
        }
    }

    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityIdentifier::Iri(iri) => write!(f, "{}", iri),
            EntityIdentifier::Anonymous(label) => write!(f, "_:{}", label),
        }
    }
}

/// `scheme:rest` where scheme is ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
pub(crate) fn looks_absolute(iri: &str) -> bool {
    let Some((scheme, rest)) = iri.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
        && !iri.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"'))
}
