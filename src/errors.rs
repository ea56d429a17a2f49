use thiserror::Error;

use crate::config::ConfigError;
use crate::model::ModelError;
use crate::proxy::ProxyError;
use crate::query::QueryError;
use crate::source::DataSourceError;

/// Any failure surfaced by the mapper, tagged with the stage it came from.
#[derive(Debug, Error)]
pub enum RdfMapError {
    #[error("Query normalization failed: {0}")]
    Query(#[from] QueryError),

    #[error("Entity resolution failed: {0}")]
    Proxy(#[from] ProxyError),

    #[error("Data source failure: {0}")]
    Source(#[from] DataSourceError),

    #[error("Invalid model value: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RdfMapError>;
