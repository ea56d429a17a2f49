use thiserror::Error;

use super::transaction::TransactionState;

#[derive(Debug, Error)]
pub enum DataSourceError {
    /// A transaction operation was attempted in a state that forbids it.
    #[error("Cannot {operation} a transaction while it is {state}")]
    TransactionState {
        operation: &'static str,
        state: TransactionState,
    },

    #[error("Data source is not connected")]
    NotConnected,

    /// Backend failure: a query the backend could not run, or an I/O error
    /// from the underlying store.
    #[error("Data access failure: {0}")]
    DataAccess(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Operation not supported by `{source_kind}` data source: {operation}")]
    Unsupported {
        source_kind: String,
        operation: String,
    },
}

impl DataSourceError {
    pub fn data_access(message: impl Into<String>) -> Self {
        DataSourceError::DataAccess(message.into().into())
    }
}
