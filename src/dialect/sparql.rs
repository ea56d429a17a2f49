use std::fmt::Write;

use super::{render_term, DialectRules};
use crate::namespaces::NamespaceTable;
use crate::query_parser::parse_sparql;

const ANONYMOUS: &str = "[]";

pub static RULES: DialectRules = DialectRules {
    name: "sparql",
    pattern_keyword: "where",
    query_keywords: &["select", "construct", "ask", "describe", "prefix", "base"],
    canonical_variable: "?x",
    anonymous_variable: ANONYMOUS,
    stable_anonymous_ids: false,
    projection_variable,
    variable_syntax,
    render_value_literal: render_term,
    inject_namespace_prefixes,
    validate: parse_sparql,
};

fn projection_variable(name: &str) -> String {
    format!("?{}", name.trim().trim_start_matches(['?', '$']))
}

fn variable_syntax(name: &str) -> String {
    let name = name.trim().trim_start_matches(['?', '$']);
    if name.is_empty() {
        ANONYMOUS.to_string()
    } else {
        format!("?{}", name)
    }
}

/// One `PREFIX p: <iri>` line per declarable namespace, ahead of the query.
fn inject_namespace_prefixes(buffer: &str, table: &NamespaceTable) -> String {
    let mut out = String::new();
    for ns in table.declarable() {
        let _ = writeln!(out, "PREFIX {}: <{}>", ns.prefix, ns.iri);
    }
    out.push_str(buffer);
    out
}
