use super::{render_term, DialectRules};
use crate::namespaces::NamespaceTable;
use crate::query_parser::parse_serql;

const ANONYMOUS: &str = "{}";

pub static RULES: DialectRules = DialectRules {
    name: "serql",
    pattern_keyword: "from",
    query_keywords: &["select", "construct"],
    canonical_variable: "x",
    anonymous_variable: ANONYMOUS,
    stable_anonymous_ids: true,
    projection_variable,
    variable_syntax,
    render_value_literal: render_term,
    inject_namespace_prefixes,
    validate: parse_serql,
};

fn projection_variable(name: &str) -> String {
    name.trim().trim_matches(['{', '}']).trim().to_string()
}

fn variable_syntax(name: &str) -> String {
    let name = projection_variable(name);
    if name.is_empty() {
        ANONYMOUS.to_string()
    } else {
        format!("{{{}}}", name)
    }
}

/// SeRQL declares namespaces after the query body, in a single
/// `using namespace` clause.
fn inject_namespace_prefixes(buffer: &str, table: &NamespaceTable) -> String {
    let declarations: Vec<String> = table
        .declarable()
        .map(|ns| format!("{} = <{}>", ns.prefix, ns.iri))
        .collect();
    if declarations.is_empty() {
        return buffer.to_string();
    }
    format!(
        "{} using namespace {}",
        buffer.trim_end(),
        declarations.join(", ")
    )
}
