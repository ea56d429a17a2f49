use std::sync::Arc;

use rdfmap::namespaces::NamespaceTable;
use rdfmap::proxy::{persist, DescribeMaterializer, Materializer, ProxyError, Slot};
use rdfmap::query::execute::{ask, construct_graph, select_entities, select_rows};
use rdfmap::source::{DataSource, MemoryDataSource};
use rdfmap::{Dialect, EntityIdentifier, Query, QueryError, Term};

use super::common::{Person, FOAF, FOAF_NAME};

fn foaf() -> NamespaceTable {
    let mut t = NamespaceTable::new();
    t.register("foaf", FOAF);
    t
}

fn people(dialect: Dialect) -> Arc<dyn DataSource> {
    let memory = MemoryDataSource::new(dialect);
    memory.connect().unwrap();
    for p in [
        Person::new("urn:person:ann", "Ann"),
        Person::new("urn:person:bob", "Bob"),
    ] {
        persist(&memory, &p).unwrap();
    }
    Arc::new(memory)
}

fn person_materializer() -> Arc<dyn Materializer<Person>> {
    Arc::new(DescribeMaterializer::<Person>::new())
}

#[test]
fn test_query_results_are_lazy_people() {
    let source = people(Dialect::Sparql);
    let query = Query::new("?p a foaf:Person", Dialect::Sparql)
        .with_projection_variable("p")
        .with_namespaces(foaf());

    let list = select_entities(&source, &query, person_materializer()).unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.deferred_count(), 2);

    let mut names: Vec<String> = list.iter().map(|p| p.unwrap().name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["Ann", "Bob"]);
}

#[test]
fn test_proxy_resolves_once_and_shares_the_instance() {
    let source = people(Dialect::Sparql);
    let query = Query::new("?p foaf:name \"Bob\"", Dialect::Sparql)
        .with_projection_variable("p")
        .with_namespaces(foaf());
    let list = select_entities(&source, &query, person_materializer()).unwrap();

    let Slot::Deferred(proxy) = list.slot(0).unwrap() else {
        panic!("query results should be deferred");
    };
    assert!(!proxy.is_resolved());
    let first = proxy.resolve().unwrap();
    let second = proxy.clone().resolve().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, Person::new("urn:person:bob", "Bob"));
}

#[test]
fn test_missing_entity_is_a_resolution_failure() {
    let source = people(Dialect::Sparql);
    let proxy = rdfmap::proxy::Proxy::new(
        EntityIdentifier::iri("urn:person:nobody").unwrap(),
        Arc::clone(&source),
        person_materializer(),
    );
    match proxy.resolve() {
        Err(ProxyError::ResolutionFailure { identifier, .. }) => {
            assert_eq!(identifier.as_str(), "urn:person:nobody")
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!proxy.is_resolved());
}

#[test]
fn test_parameters_bind_values() {
    let source = people(Dialect::Sparql);
    let mut query = Query::new("?p foaf:name ??name", Dialect::Sparql)
        .with_projection_variable("p")
        .with_namespaces(foaf());
    assert_eq!(query.parameters(), vec!["name"]);

    query.bind("name", "Ann");
    let rows = select_rows(source.as_ref(), &query).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.column("p").next(), Some(&Term::iri("urn:person:ann")));

    query.clear_bindings();
    assert!(matches!(
        select_rows(source.as_ref(), &query),
        Err(QueryError::UnboundParameter { .. })
    ));
}

#[test]
fn test_serql_source_round_trip() {
    let source = people(Dialect::Serql);
    let mut query = Query::new("{p} foaf:name {n}", Dialect::Serql)
        .with_projection_variable("p")
        .with_namespaces(foaf());
    query.limit(1);

    let rendered = query.render().unwrap();
    assert_eq!(
        rendered.text,
        "select p from {p} foaf:name {n} limit 1 using namespace foaf = <http://xmlns.com/foaf/0.1/>"
    );

    let list = select_entities(&source, &query, person_materializer()).unwrap();
    assert_eq!(list.len(), 1);
    assert!(list.get(0).is_ok());
}

#[test]
fn test_ask_and_construct_through_queries() {
    let source = people(Dialect::Sparql);
    let yes = Query::new("ASK { ?p foaf:name \"Ann\" }", Dialect::Sparql).with_namespaces(foaf());
    assert!(ask(source.as_ref(), &yes).unwrap());

    let no = Query::new("ASK { ?p foaf:name \"Eve\" }", Dialect::Sparql).with_namespaces(foaf());
    assert!(!ask(source.as_ref(), &no).unwrap());

    let names = Query::new(
        "CONSTRUCT { ?p <urn:label> ?n } WHERE { ?p foaf:name ?n }",
        Dialect::Sparql,
    )
    .with_namespaces(foaf());
    let graph = construct_graph(source.as_ref(), &names).unwrap();
    assert_eq!(graph.len(), 2);
    assert!(graph.iter().all(|t| t.predicate == "urn:label"));
}

#[test]
fn test_persist_replaces_stale_statements() {
    let source = people(Dialect::Sparql);
    let writer = source.as_mutable().expect("memory sources accept writes");

    persist(writer, &Person::new("urn:person:ann", "Annie")).unwrap();

    let ann = EntityIdentifier::iri("urn:person:ann").unwrap();
    let graph = source.describe(&ann).unwrap();
    let names: Vec<&str> = graph.objects_of(&ann, FOAF_NAME).map(|t| t.lexical()).collect();
    assert_eq!(names, vec!["Annie"]);
    assert_eq!(graph.len(), 2);
}
