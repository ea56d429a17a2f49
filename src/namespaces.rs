//! Process-wide namespace prefix table
//!
//! Dialects read this table when injecting prefix declarations into assembled
//! queries. It is configured at startup and read concurrently afterwards, so
//! a `RwLock` behind `lazy_static` is all the synchronisation it needs.
//!
//! ```ignore
//! namespaces::register("dc", "http://purl.org/dc/terms/");
//! assert_eq!(
//!     namespaces::expand("dc:title").as_deref(),
//!     Some("http://purl.org/dc/terms/title")
//! );
//! ```

use lazy_static::lazy_static;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

lazy_static! {
    /// Global prefix table consulted by query normalization.
    static ref NAMESPACES: RwLock<NamespaceTable> = RwLock::new(NamespaceTable::new());
}

/// One `prefix -> namespace IRI` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: String,
    pub iri: String,
}

/// Ordered prefix table. Registration order is preserved; re-registering a
/// prefix replaces its IRI in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: Vec<Namespace>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        NamespaceTable {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        let prefix = prefix.into();
        let iri = iri.into();
        match self.entries.iter_mut().find(|ns| ns.prefix == prefix) {
            Some(existing) => existing.iri = iri,
            None => self.entries.push(Namespace { prefix, iri }),
        }
    }

    pub fn unregister(&mut self, prefix: &str) -> Option<String> {
        let pos = self.entries.iter().position(|ns| ns.prefix == prefix)?;
        Some(self.entries.remove(pos).iri)
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|ns| ns.prefix == prefix)
            .map(|ns| ns.iri.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.entries.iter()
    }

    /// Entries eligible for prefix injection: both prefix and IRI non-empty.
    pub fn declarable(&self) -> impl Iterator<Item = &Namespace> {
        self.entries
            .iter()
            .filter(|ns| !ns.prefix.is_empty() && !ns.iri.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand `prefix:local` to a full IRI.
    pub fn expand(&self, qname: &str) -> Option<String> {
        let (prefix, local) = qname.split_once(':')?;
        self.get(prefix).map(|iri| format!("{}{}", iri, local))
    }

    /// Shorten an IRI to `prefix:local` using the longest matching namespace.
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.declarable()
            .filter(|ns| iri.starts_with(ns.iri.as_str()))
            .max_by_key(|ns| ns.iri.len())
            .map(|ns| format!("{}:{}", ns.prefix, &iri[ns.iri.len()..]))
    }
}

impl FromIterator<(String, String)> for NamespaceTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = NamespaceTable::new();
        for (prefix, iri) in iter {
            table.register(prefix, iri);
        }
        table
    }
}

fn read() -> RwLockReadGuard<'static, NamespaceTable> {
    NAMESPACES.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, NamespaceTable> {
    NAMESPACES.write().unwrap_or_else(PoisonError::into_inner)
}

/// Register a prefix in the global table.
pub fn register(prefix: &str, iri: &str) {
    write().register(prefix, iri);
}

pub fn unregister(prefix: &str) -> Option<String> {
    write().unregister(prefix)
}

pub fn clear() {
    *write() = NamespaceTable::new();
}

/// Copy of the global table, taken under a single read lock.
pub fn snapshot() -> NamespaceTable {
    read().clone()
}

pub fn expand(qname: &str) -> Option<String> {
    read().expand(qname)
}

pub fn compact(iri: &str) -> Option<String> {
    read().compact(iri)
}
