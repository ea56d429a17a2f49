//! A list that holds real values and unresolved proxies side by side.
//!
//! Query results come back as identifiers; wrapping each one in a [`Proxy`]
//! lets callers page through a large result without loading every entity.
//! Proxies count as one element and resolve when read.

use std::ops::Deref;
use std::sync::Arc;

use super::errors::ProxyError;
use super::resolver::Proxy;

#[derive(Debug)]
pub enum Slot<T> {
    Resolved(T),
    Deferred(Proxy<T>),
}

impl<T> Slot<T> {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Slot::Deferred(_))
    }
}

/// Read access to a list element. Real values are borrowed from the list;
/// proxies hand out their shared, cached target.
#[derive(Debug)]
pub enum Element<'a, T> {
    Borrowed(&'a T),
    Shared(Arc<T>),
}

impl<T> Deref for Element<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Element::Borrowed(value) => value,
            Element::Shared(value) => value,
        }
    }
}

#[derive(Debug)]
pub struct ProxyAwareList<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for ProxyAwareList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ProxyAwareList<T> {
    pub fn new() -> Self {
        ProxyAwareList { slots: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ProxyAwareList {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots still holding a proxy.
    pub fn deferred_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_deferred()).count()
    }

    /// Raw slot access; never resolves.
    pub fn slot(&self, index: usize) -> Result<&Slot<T>, ProxyError> {
        let len = self.len();
        self.slots
            .get(index)
            .ok_or(ProxyError::IndexOutOfBounds { index, len })
    }

    /// Element at `index`, resolving a proxy if needed. The slot itself is
    /// left as it was.
    pub fn get(&self, index: usize) -> Result<Element<'_, T>, ProxyError> {
        match self.slot(index)? {
            Slot::Resolved(value) => Ok(Element::Borrowed(value)),
            Slot::Deferred(proxy) => proxy.resolve().map(Element::Shared),
        }
    }

    /// Replace the element at `index`, returning the previous slot as it
    /// was (an unresolved proxy stays unresolved).
    pub fn set(&mut self, index: usize, value: T) -> Result<Slot<T>, ProxyError> {
        self.replace(index, Slot::Resolved(value))
    }

    pub fn set_proxy(&mut self, index: usize, proxy: Proxy<T>) -> Result<Slot<T>, ProxyError> {
        self.replace(index, Slot::Deferred(proxy))
    }

    pub fn push(&mut self, value: T) {
        self.slots.push(Slot::Resolved(value));
    }

    pub fn push_proxy(&mut self, proxy: Proxy<T>) {
        self.slots.push(Slot::Deferred(proxy));
    }

    /// Insert before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ProxyError> {
        self.insert_slot(index, Slot::Resolved(value))
    }

    pub fn insert_proxy(&mut self, index: usize, proxy: Proxy<T>) -> Result<(), ProxyError> {
        self.insert_slot(index, Slot::Deferred(proxy))
    }

    /// Remove and return the element at `index`. A proxy is resolved first;
    /// if that fails the list is unchanged.
    pub fn remove(&mut self, index: usize) -> Result<Arc<T>, ProxyError> {
        let resolved = match self.slot(index)? {
            Slot::Deferred(proxy) => Some(proxy.resolve()?),
            Slot::Resolved(_) => None,
        };
        match (resolved, self.slots.remove(index)) {
            (Some(value), _) => Ok(value),
            (None, Slot::Resolved(value)) => Ok(Arc::new(value)),
            (None, Slot::Deferred(proxy)) => proxy.resolve(),
        }
    }

    /// Resolving iterator; each proxy is resolved when reached.
    pub fn iter(&self) -> impl Iterator<Item = Result<Element<'_, T>, ProxyError>> + '_ {
        self.slots.iter().map(|slot| match slot {
            Slot::Resolved(value) => Ok(Element::Borrowed(value)),
            Slot::Deferred(proxy) => proxy.resolve().map(Element::Shared),
        })
    }

    pub fn slots(&self) -> &[Slot<T>] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<Slot<T>> {
        self.slots
    }

    fn replace(&mut self, index: usize, slot: Slot<T>) -> Result<Slot<T>, ProxyError> {
        let len = self.len();
        match self.slots.get_mut(index) {
            Some(existing) => Ok(std::mem::replace(existing, slot)),
            None => Err(ProxyError::IndexOutOfBounds { index, len }),
        }
    }

    fn insert_slot(&mut self, index: usize, slot: Slot<T>) -> Result<(), ProxyError> {
        let len = self.len();
        if index > len {
            return Err(ProxyError::IndexOutOfBounds { index, len });
        }
        self.slots.insert(index, slot);
        Ok(())
    }
}

impl<T> From<Vec<T>> for ProxyAwareList<T> {
    fn from(values: Vec<T>) -> Self {
        ProxyAwareList {
            slots: values.into_iter().map(Slot::Resolved).collect(),
        }
    }
}

impl<T> FromIterator<Proxy<T>> for ProxyAwareList<T> {
    fn from_iter<I: IntoIterator<Item = Proxy<T>>>(iter: I) -> Self {
        ProxyAwareList {
            slots: iter.into_iter().map(Slot::Deferred).collect(),
        }
    }
}
