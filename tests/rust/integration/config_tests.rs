use std::io::Write;

use serial_test::serial;

use rdfmap::config::{ConfigError, RdfMapConfig};
use rdfmap::source::factory::create_source;
use rdfmap::{namespaces, normalize, Dialect};

fn write_yaml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_yaml_config_drives_source_and_namespaces() {
    namespaces::clear();
    let file = write_yaml(
        r#"
default_dialect: serql
default_variable: book
source:
  kind: memory-transactional
  dialect: serql
  auto_connect: true
namespaces:
  - prefix: dc
    iri: http://purl.org/dc/terms/
"#,
    );

    let config = RdfMapConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.default_dialect, Dialect::Serql);

    let source = create_source(&config.source).unwrap();
    assert!(source.is_connected());
    assert_eq!(source.dialect(), Dialect::Serql);
    assert!(source.as_transactional().is_some());

    config.apply_namespaces();
    let q = normalize("{b} dc:title {t}", config.default_dialect, &config.default_variable).unwrap();
    assert_eq!(
        q.text,
        "select book from {b} dc:title {t} using namespace dc = <http://purl.org/dc/terms/>"
    );

    namespaces::clear();
}

#[test]
fn test_yaml_defaults_fill_missing_sections() {
    let file = write_yaml("default_variable: thing\n");
    let config = RdfMapConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.default_dialect, Dialect::Sparql);
    assert_eq!(config.source.kind, "memory");
    assert!(config.namespaces.is_empty());
}

#[test]
fn test_invalid_yaml_values_are_rejected() {
    let unknown_kind = write_yaml("source:\n  kind: jena\n");
    assert!(matches!(
        RdfMapConfig::from_yaml_file(unknown_kind.path()),
        Err(ConfigError::Validation(_))
    ));

    let relative_iri = write_yaml("namespaces:\n  - prefix: dc\n    iri: purl.org/dc\n");
    assert!(matches!(
        RdfMapConfig::from_yaml_file(relative_iri.path()),
        Err(ConfigError::Validation(_))
    ));

    let unknown_dialect = write_yaml("default_dialect: cypher\n");
    assert!(matches!(
        RdfMapConfig::from_yaml_file(unknown_dialect.path()),
        Err(ConfigError::Parse { .. })
    ));
}
