//! Deferred entity references.
//!
//! A [`Proxy`] stands in for an entity that has been identified but not yet
//! loaded. The first successful [`Proxy::resolve`] materializes it and
//! caches the result; every later call, on this proxy or any clone of it,
//! returns the same `Arc`.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::errors::ProxyError;
use super::materializer::Materializer;
use crate::model::EntityIdentifier;
use crate::source::DataSource;

pub struct Proxy<T> {
    identifier: EntityIdentifier,
    source: Arc<dyn DataSource>,
    materializer: Arc<dyn Materializer<T>>,
    cache: Arc<Mutex<Option<Arc<T>>>>,
}

impl<T> Proxy<T> {
    pub fn new(
        identifier: EntityIdentifier,
        source: Arc<dyn DataSource>,
        materializer: Arc<dyn Materializer<T>>,
    ) -> Self {
        Proxy {
            identifier,
            source,
            materializer,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn identifier(&self) -> &EntityIdentifier {
        &self.identifier
    }

    pub fn is_resolved(&self) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Materialize the target on first use; later calls return the cached
    /// value. The cache lock is held while materializing, so concurrent
    /// callers wait for the first one instead of loading twice.
    pub fn resolve(&self) -> Result<Arc<T>, ProxyError> {
        let mut cached = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = cached.as_ref() {
            return Ok(Arc::clone(value));
        }

        debug!("resolving {} `{}`", type_name::<T>(), self.identifier);
        let value = self
            .materializer
            .materialize(&self.identifier, self.source.as_ref())
            .map_err(|source| ProxyError::ResolutionFailure {
                type_name: type_name::<T>(),
                identifier: self.identifier.clone(),
                source,
            })?;

        let value = Arc::new(value);
        *cached = Some(Arc::clone(&value));
        Ok(value)
    }
}

impl<T> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Proxy {
            identifier: self.identifier.clone(),
            source: Arc::clone(&self.source),
            materializer: Arc::clone(&self.materializer),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T> fmt::Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("target", &type_name::<T>())
            .field("identifier", &self.identifier)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
