use serial_test::serial;

use rdfmap::namespaces;
use rdfmap::query::QueryShape;
use rdfmap::query_parser::QueryForm;
use rdfmap::{normalize, Dialect, Query};

const DC: &str = "http://purl.org/dc/terms/";

#[test]
#[serial]
fn test_title_fragment_end_to_end() {
    namespaces::clear();
    namespaces::register("dc", DC);

    let q = normalize("?x dc:title \"Foo\"", Dialect::Sparql, "book").unwrap();
    assert_eq!(
        q.text,
        "PREFIX dc: <http://purl.org/dc/terms/>\nselect ?book where ?x dc:title \"Foo\""
    );
    assert_eq!(q.shape, QueryShape::Fragment);
    assert_eq!(q.parsed.form, QueryForm::Select);

    namespaces::clear();
}

#[test]
#[serial]
fn test_ask_passes_through_without_namespaces() {
    namespaces::clear();

    let body = "ASK { <http://ex.org/a> <http://ex.org/p> ?o }";
    let q = normalize(body, Dialect::Sparql, "x").unwrap();
    assert_eq!(q.text, body);
    assert_eq!(q.parsed.form, QueryForm::Ask);
}

#[test]
#[serial]
fn test_queries_see_later_registrations() {
    namespaces::clear();
    let q = Query::new("?b dc:title ?t", Dialect::Sparql).with_projection_variable("b");
    assert!(q.render().is_err());

    namespaces::register("dc", DC);
    let rendered = q.render().unwrap();
    assert!(rendered.text.starts_with("PREFIX dc: <http://purl.org/dc/terms/>\n"));

    namespaces::clear();
}

#[test]
#[serial]
fn test_duplicate_declarations_are_kept() {
    namespaces::clear();
    namespaces::register("dc", DC);

    let body = "PREFIX dc: <http://purl.org/dc/terms/>\nSELECT ?t WHERE { ?b dc:title ?t }";
    let q = normalize(body, Dialect::Sparql, "t").unwrap();
    assert_eq!(q.text.matches("PREFIX dc:").count(), 2);

    namespaces::clear();
}

#[test]
#[serial]
fn test_concurrent_normalization_reads_one_table() {
    namespaces::clear();
    namespaces::register("dc", DC);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                normalize(&format!("?x dc:title \"{i}\""), Dialect::Sparql, "x").map(|q| q.text)
            })
        })
        .collect();
    for handle in handles {
        let text = handle.join().unwrap().unwrap();
        assert!(text.starts_with("PREFIX dc:"));
    }

    namespaces::clear();
}
