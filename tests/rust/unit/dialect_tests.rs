use rdfmap::model::Term;
use rdfmap::query::QueryError;
use rdfmap::Dialect;

#[test]
fn test_tags_resolve_case_insensitively() {
    for tag in ["sparql", "SPARQL", " sparql11 ", "Sparql-1.1"] {
        assert_eq!(Dialect::from_tag(tag).unwrap(), Dialect::Sparql, "tag {tag:?}");
    }
    for tag in ["serql", "SeRQL", "sesame"] {
        assert_eq!(Dialect::from_tag(tag).unwrap(), Dialect::Serql, "tag {tag:?}");
    }
}

#[test]
fn test_unknown_tag_is_reported() {
    match Dialect::from_tag("cypher") {
        Err(QueryError::UnknownDialect { tag }) => assert_eq!(tag, "cypher"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_rules_are_shared_instances() {
    // Every lookup hands out the same static record.
    let first = Dialect::Sparql.rules();
    let second = Dialect::from_tag("sparql11").unwrap().rules();
    assert!(std::ptr::eq(first, second));

    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| Dialect::Serql.rules() as *const _ as usize))
        .collect();
    let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_variable_syntax_per_dialect() {
    assert_eq!(Dialect::Sparql.projection_variable("book"), "?book");
    assert_eq!(Dialect::Sparql.projection_variable("$book"), "?book");
    assert_eq!(Dialect::Serql.projection_variable("{book}"), "book");

    assert_eq!(Dialect::Sparql.variable_syntax("x"), "?x");
    assert_eq!(Dialect::Serql.variable_syntax("x"), "{x}");
}

#[test]
fn test_blank_variable_maps_to_anonymous_token() {
    assert_eq!(Dialect::Sparql.variable_syntax(""), "[]");
    assert_eq!(Dialect::Sparql.variable_syntax("   "), "[]");
    assert_eq!(Dialect::Serql.variable_syntax(""), "{}");
}

#[test]
fn test_value_literals() {
    let lang = Term::lang_literal("chat", "fr");
    assert_eq!(Dialect::Sparql.render_value_literal(&lang), "\"chat\"@fr");
    assert_eq!(
        Dialect::Serql.render_value_literal(&Term::iri("http://ex.org/a")),
        "<http://ex.org/a>"
    );
    assert_eq!(
        Dialect::Sparql.render_value_literal(&Term::literal("say \"hi\"")),
        "\"say \\\"hi\\\"\""
    );
}

#[test]
fn test_stable_anonymous_ids() {
    assert!(!Dialect::Sparql.supports_stable_anonymous_ids());
    assert!(Dialect::Serql.supports_stable_anonymous_ids());
}

#[test]
fn test_serde_uses_tags() {
    let d: Dialect = serde_yaml::from_str("sesame").unwrap();
    assert_eq!(d, Dialect::Serql);
    assert_eq!(serde_json::to_string(&Dialect::Sparql).unwrap(), "\"sparql\"");
    assert!(serde_yaml::from_str::<Dialect>("gremlin").is_err());
}
