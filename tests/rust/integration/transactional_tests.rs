use rdfmap::config::SourceConfig;
use rdfmap::proxy::persist;
use rdfmap::source::factory::create_source;
use rdfmap::source::{DataSourceError, TransactionState};
use rdfmap::{Dialect, EntityIdentifier};

use super::common::{Person, FOAF_NAME};

fn transactional_config() -> SourceConfig {
    SourceConfig {
        kind: "memory-transactional".to_string(),
        dialect: Dialect::Sparql,
        auto_connect: true,
    }
}

fn name_of(source: &dyn rdfmap::source::DataSource, iri: &str) -> Option<String> {
    let id = EntityIdentifier::iri(iri).unwrap();
    let graph = source.describe(&id).unwrap();
    let name = graph.objects_of(&id, FOAF_NAME).next()?;
    Some(name.lexical().to_string())
}

#[test]
fn test_rollback_restores_previous_state() {
    let source = create_source(&transactional_config()).unwrap();
    let writer = source.as_mutable().unwrap();
    let tx = source.as_transactional().unwrap();

    persist(writer, &Person::new("urn:person:ann", "Ann")).unwrap();

    tx.begin().unwrap();
    persist(writer, &Person::new("urn:person:ann", "Anne")).unwrap();
    persist(writer, &Person::new("urn:person:cat", "Cat")).unwrap();
    assert_eq!(name_of(source.as_ref(), "urn:person:ann").as_deref(), Some("Anne"));
    tx.rollback().unwrap();

    assert_eq!(tx.transaction_state(), TransactionState::RolledBack);
    assert_eq!(name_of(source.as_ref(), "urn:person:ann").as_deref(), Some("Ann"));
    assert_eq!(name_of(source.as_ref(), "urn:person:cat"), None);
}

#[test]
fn test_commit_keeps_changes_and_allows_new_transaction() {
    let source = create_source(&transactional_config()).unwrap();
    let writer = source.as_mutable().unwrap();
    let tx = source.as_transactional().unwrap();

    tx.begin().unwrap();
    persist(writer, &Person::new("urn:person:dan", "Dan")).unwrap();
    tx.commit().unwrap();
    assert!(!tx.is_in_transaction());

    tx.begin().unwrap();
    assert!(tx.is_in_transaction());
    tx.rollback().unwrap();
    assert_eq!(name_of(source.as_ref(), "urn:person:dan").as_deref(), Some("Dan"));
}

#[test]
fn test_state_errors() {
    let source = create_source(&transactional_config()).unwrap();
    let tx = source.as_transactional().unwrap();

    assert!(matches!(
        tx.commit(),
        Err(DataSourceError::TransactionState { operation: "commit", .. })
    ));
    tx.begin().unwrap();
    assert!(matches!(
        tx.begin(),
        Err(DataSourceError::TransactionState {
            operation: "begin",
            state: TransactionState::Active
        })
    ));
}

#[test]
fn test_operations_require_connection() {
    let mut config = transactional_config();
    config.auto_connect = false;
    let source = create_source(&config).unwrap();
    let writer = source.as_mutable().unwrap();

    assert!(matches!(
        persist(writer, &Person::new("urn:person:eve", "Eve")),
        Err(DataSourceError::NotConnected)
    ));
    assert!(matches!(
        source.as_transactional().unwrap().begin(),
        Err(DataSourceError::NotConnected)
    ));
    assert!(matches!(
        source.select_query("SELECT * WHERE { ?s ?p ?o }"),
        Err(DataSourceError::NotConnected)
    ));
}

#[test]
fn test_disconnect_rolls_back_open_transaction() {
    let source = create_source(&transactional_config()).unwrap();
    let writer = source.as_mutable().unwrap();
    let tx = source.as_transactional().unwrap();

    tx.begin().unwrap();
    persist(writer, &Person::new("urn:person:fay", "Fay")).unwrap();
    source.disconnect().unwrap();
    source.connect().unwrap();

    assert!(!tx.is_in_transaction());
    assert_eq!(name_of(source.as_ref(), "urn:person:fay"), None);
}
