use rdfmap::namespaces::NamespaceTable;
use rdfmap::query::{QueryError, QueryShape};
use rdfmap::query_parser::QueryForm;
use rdfmap::{normalize_with, Dialect};

fn table(entries: &[(&str, &str)]) -> NamespaceTable {
    entries
        .iter()
        .map(|(p, i)| (p.to_string(), i.to_string()))
        .collect()
}

#[test]
fn test_complete_queries_are_recognized_for_every_keyword() {
    let empty = NamespaceTable::new();
    let cases = [
        ("SELECT ?s WHERE { ?s ?p ?o }", QueryForm::Select),
        ("  select ?s where { ?s ?p ?o }", QueryForm::Select),
        ("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }", QueryForm::Construct),
        ("ASK { ?s ?p ?o }", QueryForm::Ask),
        ("DESCRIBE <http://ex.org/a>", QueryForm::Describe),
        (
            "PREFIX ex: <http://ex.org/>\nSELECT ?s WHERE { ?s ex:p ?o }",
            QueryForm::Select,
        ),
    ];
    for (body, form) in cases {
        let q = normalize_with(body, Dialect::Sparql, "x", &empty).unwrap();
        assert_eq!(q.shape, QueryShape::Complete, "query {body:?}");
        assert_eq!(q.text, body);
        assert_eq!(q.parsed.form, form);
    }
}

#[test]
fn test_fragment_forms() {
    let empty = NamespaceTable::new();

    let q = normalize_with("?s <http://ex.org/p> ?o", Dialect::Sparql, "s", &empty).unwrap();
    assert_eq!(q.text, "select ?s where ?s <http://ex.org/p> ?o");

    let q = normalize_with("{ ?s <http://ex.org/p> ?o }", Dialect::Sparql, "o", &empty).unwrap();
    assert_eq!(q.text, "select ?o where { ?s <http://ex.org/p> ?o }");
    assert_eq!(q.shape, QueryShape::Fragment);
}

#[test]
fn test_prefixes_follow_registration_order() {
    let t = table(&[
        ("foaf", "http://xmlns.com/foaf/0.1/"),
        ("dc", "http://purl.org/dc/terms/"),
    ]);
    let q = normalize_with("?p foaf:name ?n", Dialect::Sparql, "p", &t).unwrap();
    assert_eq!(
        q.text,
        "PREFIX foaf: <http://xmlns.com/foaf/0.1/>\n\
         PREFIX dc: <http://purl.org/dc/terms/>\n\
         select ?p where ?p foaf:name ?n"
    );
}

#[test]
fn test_serql_complete_query_gets_namespace_clause() {
    let t = table(&[("foaf", "http://xmlns.com/foaf/0.1/")]);
    let q = normalize_with("SELECT n FROM {p} foaf:name {n}", Dialect::Serql, "p", &t).unwrap();
    assert_eq!(q.shape, QueryShape::Complete);
    assert_eq!(
        q.text,
        "SELECT n FROM {p} foaf:name {n} using namespace foaf = <http://xmlns.com/foaf/0.1/>"
    );
}

#[test]
fn test_serql_fragment_with_from() {
    let empty = NamespaceTable::new();
    let q = normalize_with("from {p} <http://ex.org/knows> {q}", Dialect::Serql, "q", &empty)
        .unwrap();
    assert_eq!(q.text, "select q from {p} <http://ex.org/knows> {q}");
}

#[test]
fn test_rejected_query_shows_what_was_parsed() {
    let t = table(&[("dc", "http://purl.org/dc/terms/")]);
    let err = normalize_with("?x dc:title \"unterminated", Dialect::Sparql, "book", &t)
        .unwrap_err();
    let QueryError::InvalidQuery { query, .. } = err else {
        panic!("expected InvalidQuery");
    };
    assert_eq!(
        query,
        "PREFIX dc: <http://purl.org/dc/terms/>\nselect ?book where ?x dc:title \"unterminated"
    );
}

#[test]
fn test_dialect_mismatch_is_invalid() {
    let empty = NamespaceTable::new();
    let err = normalize_with("SELECT ?s WHERE { ?s ?p ?o }", Dialect::Serql, "s", &empty);
    assert!(matches!(err, Err(QueryError::InvalidQuery { .. })));
}
