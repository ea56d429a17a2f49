use thiserror::Error;

use crate::model::EntityIdentifier;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Materialization of a deferred entity failed. The proxy stays
    /// unresolved, so a later call tries again.
    #[error("Failed to resolve {type_name} `{identifier}`: {source}")]
    ResolutionFailure {
        type_name: &'static str,
        identifier: EntityIdentifier,
        #[source]
        source: anyhow::Error,
    },

    #[error("Index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
