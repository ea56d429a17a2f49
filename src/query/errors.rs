use thiserror::Error;

use crate::source::errors::DataSourceError;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The assembled query failed to parse. `query` is the exact string that
    /// would have been sent to the store.
    #[error("Invalid query: {reason}\n{query}")]
    InvalidQuery { query: String, reason: String },

    #[error("Unknown query dialect `{tag}`")]
    UnknownDialect { tag: String },

    #[error("Unbound query parameter `??{name}`")]
    UnboundParameter { name: String },

    #[error("Variable `{variable}` is bound to `{value}`, which is not an entity")]
    NonEntityBinding { variable: String, value: String },

    #[error("Expected a {expected} query but got a {actual} query")]
    WrongQueryType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Source(#[from] DataSourceError),
}
