//! Conversion between domain objects and their graph description.

use std::marker::PhantomData;

use anyhow::bail;
use log::debug;

use crate::model::{EntityIdentifier, Graph};
use crate::source::{DataSource, DataSourceError, MutableDataSource};

/// Builds a `T` for an identifier, reading whatever it needs from a source.
pub trait Materializer<T>: Send + Sync {
    fn materialize(&self, id: &EntityIdentifier, source: &dyn DataSource) -> anyhow::Result<T>;
}

impl<T, F> Materializer<T> for F
where
    F: Fn(&EntityIdentifier, &dyn DataSource) -> anyhow::Result<T> + Send + Sync,
{
    fn materialize(&self, id: &EntityIdentifier, source: &dyn DataSource) -> anyhow::Result<T> {
        self(id, source)
    }
}

/// Domain types that can be read back from the triples describing them.
pub trait FromGraph: Sized {
    fn from_graph(id: &EntityIdentifier, graph: &Graph) -> anyhow::Result<Self>;
}

/// Domain types that can be written as triples.
pub trait ToGraph {
    fn identifier(&self) -> EntityIdentifier;

    fn to_graph(&self) -> Graph;
}

/// Materializes through `DataSource::describe` and [`FromGraph`].
pub struct DescribeMaterializer<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> DescribeMaterializer<T> {
    pub fn new() -> Self {
        DescribeMaterializer {
            _target: PhantomData,
        }
    }
}

impl<T> Default for DescribeMaterializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromGraph> Materializer<T> for DescribeMaterializer<T> {
    fn materialize(&self, id: &EntityIdentifier, source: &dyn DataSource) -> anyhow::Result<T> {
        let graph = source.describe(id)?;
        if graph.is_empty() {
            bail!("no statements about `{}`", id);
        }
        T::from_graph(id, &graph)
    }
}

/// Replace the stored description of `entity` with its current triples.
pub fn persist<T: ToGraph>(
    source: &dyn MutableDataSource,
    entity: &T,
) -> Result<(), DataSourceError> {
    let id = entity.identifier();
    let previous = source.describe(&id)?;
    let current = entity.to_graph();
    debug!(
        "persisting `{}`: {} stale, {} current triple(s)",
        id,
        previous.difference(&current).len(),
        current.len()
    );
    source.remove(&previous.difference(&current))?;
    source.add(&current.difference(&previous))
}
