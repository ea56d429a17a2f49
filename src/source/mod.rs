//! Data source contract
//!
//! A [`DataSource`] runs already-normalized queries against a triple store.
//! Capabilities beyond querying are separate traits: [`MutableDataSource`]
//! for writes and [`SupportsTransactions`] for explicit transactions. A
//! source behind `Arc<dyn DataSource>` can be asked for either capability
//! at runtime.
//!
//! All operations are blocking and take `&self`, so a source can be shared
//! by the proxies that resolve against it. Transaction state belongs to the
//! source; callers sharing one source across threads coordinate their own
//! transactions.

pub mod errors;
pub mod evaluator;
pub mod factory;
pub mod memory;
pub mod transaction;
pub mod transactional;

pub use errors::DataSourceError;
pub use memory::MemoryDataSource;
pub use transaction::{ConnectionState, TransactionState, TransactionTracker};
pub use transactional::TransactionalDataSource;

use crate::dialect::Dialect;
use crate::model::{EntityIdentifier, Graph, ResultTable};

pub trait DataSource: Send + Sync {
    /// Idempotent.
    fn connect(&self) -> Result<(), DataSourceError>;

    /// Rolls back an open transaction first, if the source supports them.
    fn disconnect(&self) -> Result<(), DataSourceError>;

    fn is_connected(&self) -> bool;

    /// Query language this source accepts.
    fn dialect(&self) -> Dialect;

    fn select_query(&self, query: &str) -> Result<ResultTable, DataSourceError>;

    /// CONSTRUCT or DESCRIBE.
    fn graph_query(&self, query: &str) -> Result<Graph, DataSourceError>;

    fn ask(&self, query: &str) -> Result<bool, DataSourceError>;

    /// Every triple with `id` as subject.
    fn describe(&self, id: &EntityIdentifier) -> Result<Graph, DataSourceError>;

    /// Short backend name used in logs and errors.
    fn kind(&self) -> &'static str;

    fn as_mutable(&self) -> Option<&dyn MutableDataSource> {
        None
    }

    fn as_transactional(&self) -> Option<&dyn SupportsTransactions> {
        None
    }
}

pub trait MutableDataSource: DataSource {
    fn add(&self, graph: &Graph) -> Result<(), DataSourceError>;

    fn remove(&self, graph: &Graph) -> Result<(), DataSourceError>;
}

pub trait SupportsTransactions: DataSource {
    fn begin(&self) -> Result<(), DataSourceError>;

    fn commit(&self) -> Result<(), DataSourceError>;

    fn rollback(&self) -> Result<(), DataSourceError>;

    fn transaction_state(&self) -> TransactionState;

    fn is_in_transaction(&self) -> bool {
        self.transaction_state().is_active()
    }
}
