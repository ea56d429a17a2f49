use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rdfmap::model::EntityIdentifier;
use rdfmap::proxy::{Materializer, Proxy, ProxyAwareList, ProxyError, Slot};
use rdfmap::source::{DataSource, MemoryDataSource};
use rdfmap::Dialect;

fn source() -> Arc<dyn DataSource> {
    Arc::new(MemoryDataSource::new(Dialect::Sparql))
}

/// Materializes the identifier text and counts how often it ran.
fn counting(calls: Arc<AtomicUsize>) -> Arc<dyn Materializer<String>> {
    Arc::new(
        move |id: &EntityIdentifier, _: &dyn DataSource| -> anyhow::Result<String> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(id.as_str().to_string())
        },
    )
}

fn proxy(iri: &str, materializer: &Arc<dyn Materializer<String>>) -> Proxy<String> {
    Proxy::new(
        EntityIdentifier::iri(iri).unwrap(),
        source(),
        Arc::clone(materializer),
    )
}

#[test]
fn test_mixed_list_reads_values_transparently() {
    let calls = Arc::new(AtomicUsize::new(0));
    let m = counting(Arc::clone(&calls));

    let mut list = ProxyAwareList::new();
    list.push("plain".to_string());
    list.push_proxy(proxy("urn:a", &m));
    list.push_proxy(proxy("urn:b", &m));

    assert_eq!(list.len(), 3);
    assert_eq!(list.deferred_count(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(&*list.get(0).unwrap(), "plain");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(&*list.get(2).unwrap(), "urn:b");
    assert_eq!(&*list.get(2).unwrap(), "urn:b");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_writes_store_proxies_unresolved() {
    let calls = Arc::new(AtomicUsize::new(0));
    let m = counting(Arc::clone(&calls));

    let mut list = ProxyAwareList::from(vec!["a".to_string(), "b".to_string()]);
    let previous = list.set_proxy(1, proxy("urn:c", &m)).unwrap();
    assert!(matches!(previous, Slot::Resolved(ref v) if v == "b"));
    list.insert_proxy(0, proxy("urn:d", &m)).unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(list.deferred_count(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let values: Vec<String> = list.iter().map(|e| e.unwrap().clone()).collect();
    assert_eq!(values, vec!["urn:d", "a", "urn:c"]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_out_of_bounds() {
    let mut list: ProxyAwareList<String> = ProxyAwareList::new();
    assert!(matches!(
        list.get(0),
        Err(ProxyError::IndexOutOfBounds { index: 0, len: 0 })
    ));
    assert!(list.set(3, "x".to_string()).is_err());
    assert!(list.insert(1, "x".to_string()).is_err());
    list.insert(0, "x".to_string()).unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn test_failed_resolution_surfaces_and_retries() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let flaky: Arc<dyn Materializer<String>> = Arc::new(
        move |id: &EntityIdentifier, _: &dyn DataSource| -> anyhow::Result<String> {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("store unavailable");
            }
            Ok(id.to_string())
        },
    );

    let mut list = ProxyAwareList::new();
    list.push_proxy(Proxy::new(
        EntityIdentifier::iri("urn:flaky").unwrap(),
        source(),
        flaky,
    ));

    match list.remove(0) {
        Err(ProxyError::ResolutionFailure { identifier, .. }) => {
            assert_eq!(identifier.as_str(), "urn:flaky")
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(list.len(), 1);
    assert_eq!(list.deferred_count(), 1);

    assert!(list.remove(0).is_ok());
    assert!(list.is_empty());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
