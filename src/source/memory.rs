//! In-memory triple store.
//!
//! Queries are parsed with the source's dialect and evaluated against the
//! stored graph, see [`super::evaluator`]. Useful as a test double and for
//! small embedded datasets.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};

use super::errors::DataSourceError;
use super::evaluator::Evaluator;
use super::transaction::ConnectionState;
use super::{DataSource, MutableDataSource};
use crate::dialect::Dialect;
use crate::model::{EntityIdentifier, Graph, ResultTable};
use crate::query_parser::{ParsedQuery, QueryForm};

#[derive(Debug, Default)]
pub struct MemoryDataSource {
    dialect: Dialect,
    graph: RwLock<Graph>,
    connection: ConnectionState,
}

impl MemoryDataSource {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_graph(dialect, Graph::new())
    }

    pub fn with_graph(dialect: Dialect, graph: Graph) -> Self {
        MemoryDataSource {
            dialect,
            graph: RwLock::new(graph),
            connection: ConnectionState::default(),
        }
    }

    /// Copy of the stored graph. Does not require a connection.
    pub fn snapshot(&self) -> Graph {
        match self.graph.read() {
            Ok(graph) => graph.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Graph>, DataSourceError> {
        self.graph
            .read()
            .map_err(|_| DataSourceError::data_access("in-memory graph lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Graph>, DataSourceError> {
        self.graph
            .write()
            .map_err(|_| DataSourceError::data_access("in-memory graph lock poisoned"))
    }

    fn parse(&self, query: &str, expected: &[QueryForm]) -> Result<ParsedQuery, DataSourceError> {
        self.connection.ensure_connected()?;
        let parsed = self
            .dialect
            .validate(query)
            .map_err(|e| DataSourceError::DataAccess(Box::new(e)))?;
        if !expected.contains(&parsed.form) {
            return Err(DataSourceError::data_access(format!(
                "{:?} query cannot be run here (expected {:?})",
                parsed.form, expected
            )));
        }
        debug!("memory source evaluating {:?} query", parsed.form);
        Ok(parsed)
    }
}

impl DataSource for MemoryDataSource {
    fn connect(&self) -> Result<(), DataSourceError> {
        if self.connection.connect() {
            info!("connected to in-memory {} source", self.dialect);
        }
        Ok(())
    }

    fn disconnect(&self) -> Result<(), DataSourceError> {
        if self.connection.disconnect() {
            info!("disconnected from in-memory {} source", self.dialect);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn select_query(&self, query: &str) -> Result<ResultTable, DataSourceError> {
        let parsed = self.parse(query, &[QueryForm::Select])?;
        let graph = self.read()?;
        Evaluator::new(&graph).select(&parsed)
    }

    fn graph_query(&self, query: &str) -> Result<Graph, DataSourceError> {
        let parsed = self.parse(query, &[QueryForm::Construct, QueryForm::Describe])?;
        let graph = self.read()?;
        let evaluator = Evaluator::new(&graph);
        match parsed.form {
            QueryForm::Describe => evaluator.describe(&parsed),
            _ => evaluator.construct(&parsed),
        }
    }

    fn ask(&self, query: &str) -> Result<bool, DataSourceError> {
        let parsed = self.parse(query, &[QueryForm::Ask])?;
        let graph = self.read()?;
        Evaluator::new(&graph).ask(&parsed)
    }

    fn describe(&self, id: &EntityIdentifier) -> Result<Graph, DataSourceError> {
        self.connection.ensure_connected()?;
        let graph = self.read()?;
        Ok(graph.about(id).cloned().collect())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }

    fn as_mutable(&self) -> Option<&dyn MutableDataSource> {
        Some(self)
    }
}

impl MutableDataSource for MemoryDataSource {
    fn add(&self, graph: &Graph) -> Result<(), DataSourceError> {
        self.connection.ensure_connected()?;
        let mut stored = self.write()?;
        stored.extend(graph.iter().cloned());
        Ok(())
    }

    fn remove(&self, graph: &Graph) -> Result<(), DataSourceError> {
        self.connection.ensure_connected()?;
        let mut stored = self.write()?;
        for triple in graph {
            stored.remove(triple);
        }
        Ok(())
    }
}
