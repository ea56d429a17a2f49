//! Explicit transactions for any mutable source.
//!
//! Writes go straight to the wrapped source. While a transaction is open,
//! every write also records the triples it actually changed, so rollback
//! can undo them by replaying the inverse operations in reverse order.
//! Writes made outside a transaction are applied immediately and are not
//! logged.

use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};

use super::errors::DataSourceError;
use super::transaction::{TransactionState, TransactionTracker};
use super::{DataSource, MutableDataSource, SupportsTransactions};
use crate::dialect::Dialect;
use crate::model::{EntityIdentifier, Graph, ResultTable};

#[derive(Debug)]
enum Change {
    Added(Graph),
    Removed(Graph),
}

#[derive(Debug, Default)]
struct TransactionLog {
    tracker: TransactionTracker,
    undo: Vec<Change>,
}

#[derive(Debug)]
pub struct TransactionalDataSource<S: MutableDataSource> {
    inner: S,
    log: Mutex<TransactionLog>,
}

impl<S: MutableDataSource> TransactionalDataSource<S> {
    pub fn new(inner: S) -> Self {
        TransactionalDataSource {
            inner,
            log: Mutex::new(TransactionLog::default()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn log(&self) -> Result<MutexGuard<'_, TransactionLog>, DataSourceError> {
        self.log
            .lock()
            .map_err(|_| DataSourceError::data_access("transaction log lock poisoned"))
    }

    fn ensure_connected(&self) -> Result<(), DataSourceError> {
        if self.inner.is_connected() {
            Ok(())
        } else {
            Err(DataSourceError::NotConnected)
        }
    }

    /// Current statements about every subject in `graph`.
    fn existing(&self, graph: &Graph) -> Result<Graph, DataSourceError> {
        let mut existing = Graph::new();
        for subject in graph.subjects() {
            existing.extend(self.inner.describe(subject)?);
        }
        Ok(existing)
    }

    /// Replay inverses newest first. A change whose inverse fails stays in
    /// the log, so a later rollback resumes where this one stopped.
    fn undo_all(&self, log: &mut TransactionLog) -> Result<(), DataSourceError> {
        debug!("undoing {} logged change(s)", log.undo.len());
        while let Some(change) = log.undo.pop() {
            let undone = match &change {
                Change::Added(graph) => self.inner.remove(graph),
                Change::Removed(graph) => self.inner.add(graph),
            };
            if let Err(e) = undone {
                log.undo.push(change);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<S: MutableDataSource> DataSource for TransactionalDataSource<S> {
    fn connect(&self) -> Result<(), DataSourceError> {
        self.inner.connect()
    }

    fn disconnect(&self) -> Result<(), DataSourceError> {
        if self.inner.is_connected() {
            let mut log = self.log()?;
            if log.tracker.state().is_active() {
                warn!(
                    "disconnecting `{}` source with an open transaction; rolling back",
                    self.inner.kind()
                );
                self.undo_all(&mut log)?;
                log.tracker.rollback()?;
            }
        }
        self.inner.disconnect()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn select_query(&self, query: &str) -> Result<ResultTable, DataSourceError> {
        self.inner.select_query(query)
    }

    fn graph_query(&self, query: &str) -> Result<Graph, DataSourceError> {
        self.inner.graph_query(query)
    }

    fn ask(&self, query: &str) -> Result<bool, DataSourceError> {
        self.inner.ask(query)
    }

    fn describe(&self, id: &EntityIdentifier) -> Result<Graph, DataSourceError> {
        self.inner.describe(id)
    }

    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn as_mutable(&self) -> Option<&dyn MutableDataSource> {
        Some(self)
    }

    fn as_transactional(&self) -> Option<&dyn SupportsTransactions> {
        Some(self)
    }
}

impl<S: MutableDataSource> MutableDataSource for TransactionalDataSource<S> {
    fn add(&self, graph: &Graph) -> Result<(), DataSourceError> {
        self.ensure_connected()?;
        let mut log = self.log()?;
        if !log.tracker.state().is_active() {
            return self.inner.add(graph);
        }
        let inserted = graph.difference(&self.existing(graph)?);
        self.inner.add(graph)?;
        if !inserted.is_empty() {
            log.undo.push(Change::Added(inserted));
        }
        Ok(())
    }

    fn remove(&self, graph: &Graph) -> Result<(), DataSourceError> {
        self.ensure_connected()?;
        let mut log = self.log()?;
        if !log.tracker.state().is_active() {
            return self.inner.remove(graph);
        }
        let removed = graph.intersection(&self.existing(graph)?);
        self.inner.remove(graph)?;
        if !removed.is_empty() {
            log.undo.push(Change::Removed(removed));
        }
        Ok(())
    }
}

impl<S: MutableDataSource> SupportsTransactions for TransactionalDataSource<S> {
    fn begin(&self) -> Result<(), DataSourceError> {
        self.ensure_connected()?;
        let mut log = self.log()?;
        log.tracker.begin()?;
        log.undo.clear();
        Ok(())
    }

    fn commit(&self) -> Result<(), DataSourceError> {
        self.ensure_connected()?;
        let mut log = self.log()?;
        log.tracker.commit()?;
        log.undo.clear();
        Ok(())
    }

    fn rollback(&self) -> Result<(), DataSourceError> {
        self.ensure_connected()?;
        let mut log = self.log()?;
        if !log.tracker.state().is_active() {
            return log.tracker.rollback();
        }
        self.undo_all(&mut log)?;
        log.tracker.rollback()
    }

    fn transaction_state(&self) -> TransactionState {
        match self.log.lock() {
            Ok(log) => log.tracker.state(),
            Err(poisoned) => poisoned.into_inner().tracker.state(),
        }
    }
}
