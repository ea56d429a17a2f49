//! SeRQL recogniser.
//!
//! `select|construct [distinct] ... from <path expressions> [where ...]
//! [limit n] [offset n] [using namespace p = <iri>, ...]`
//!
//! Path expressions such as `{book} dc:creator {} foaf:name {who}` are
//! flattened into triple patterns. Nodes left empty (`{}`) in the middle of a
//! chain join both edges, so they become hidden variables.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    combinator::{cut, map, opt, value, verify},
    error::context,
    multi::{many1, separated_list1},
    sequence::{delimited, preceded},
    Parser,
};

use super::ast::{
    GroupPattern, ParsedQuery, PatternElement, PatternTerm, Projection, QueryForm,
    TriplePattern,
};
use super::common::{
    balanced_parens, blank_node, ch, end_of_input, identifier, iri, iri_ref, keyword, literal, quoted_string,
    separated_words, sp, starts_with_keyword, symbol, unsigned, ws, PResult,
};
use super::errors::{ParseFailure, QueryParsingError};
use super::resolve::resolve_prefixes;

/// Prefixes every SeRQL query may use without declaring them.
pub const BUILTIN_NAMESPACES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("serql", "http://www.openrdf.org/schema/serql#"),
];

/// Variables synthesized for empty nodes that join two path edges.
pub const HIDDEN_VARIABLE_PREFIX: &str = "_anon";

const RESERVED: &[&str] = &[
    "select", "construct", "from", "where", "limit", "offset", "using", "namespace", "distinct",
    "and", "or", "not", "like", "in", "true", "false",
];

/// Parse and validate a complete SeRQL query.
pub fn parse_serql(input: &str) -> Result<ParsedQuery, ParseFailure> {
    let (_, mut query) = query(input)?;
    resolve_prefixes(&mut query, BUILTIN_NAMESPACES)?;
    Ok(query)
}

fn query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, mut query) = context(
        "expected SELECT or CONSTRUCT",
        alt((select_query, construct_query)),
    )
    .parse(input)?;
    let (input, limit) = opt(preceded(
        ws(keyword("limit")),
        cut(context("expected integer after LIMIT", ws(unsigned))),
    ))
    .parse(input)?;
    let (input, offset) = opt(preceded(
        ws(keyword("offset")),
        cut(context("expected integer after OFFSET", ws(unsigned))),
    ))
    .parse(input)?;
    let (input, namespaces) = opt(namespace_clause).parse(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = end_of_input(input)?;

    query.limit = limit;
    query.offset = offset;
    query.prefixes = namespaces.unwrap_or_default();
    Ok((input, query))
}

fn serql_variable(input: &str) -> PResult<'_, String> {
    map(
        verify(identifier, |name: &str| {
            !RESERVED.contains(&name.to_ascii_lowercase().as_str())
        }),
        str::to_string,
    )
    .parse(input)
}

fn distinct(input: &str) -> PResult<'_, bool> {
    map(opt(ws(keyword("distinct"))), |d| d.is_some()).parse(input)
}

fn select_query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, _) = ws(keyword("select")).parse(input)?;
    let (input, (distinct, projection, _, pattern)) = cut((
        distinct,
        context(
            "expected `*` or projection variables",
            alt((
                value(Projection::All, symbol('*')),
                map(
                    separated_list1(symbol(','), ws(serql_variable)),
                    Projection::Variables,
                ),
            )),
        ),
        context("expected FROM", ws(keyword("from"))),
        query_pattern,
    ))
    .parse(input)?;

    let mut query = ParsedQuery::new(QueryForm::Select);
    query.distinct = distinct;
    query.projection = projection;
    query.pattern = Some(pattern);
    Ok((input, query))
}

fn construct_query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, _) = ws(keyword("construct")).parse(input)?;
    let (input, (distinct, template, _, pattern)) = cut((
        distinct,
        context(
            "expected `*` or construct template",
            alt((value(None, symbol('*')), map(path_expressions, Some))),
        ),
        context("expected FROM", ws(keyword("from"))),
        query_pattern,
    ))
    .parse(input)?;

    let mut query = ParsedQuery::new(QueryForm::Construct);
    query.distinct = distinct;
    query.template = match template {
        Some(elements) => triples_of(&elements),
        None => triples_of(&pattern.elements),
    };
    query.pattern = Some(pattern);
    Ok((input, query))
}

fn triples_of(elements: &[PatternElement]) -> Vec<TriplePattern> {
    elements
        .iter()
        .filter_map(|e| match e {
            PatternElement::Triple(t) => Some(t.clone()),
            _ => None,
        })
        .collect()
}

/// Path expressions plus an optional WHERE condition.
fn query_pattern(input: &str) -> PResult<'_, GroupPattern> {
    let (input, mut elements) =
        context("expected path expression", path_expressions).parse(input)?;
    let (input, condition) = opt(where_clause).parse(input)?;
    elements.extend(condition);
    Ok((input, GroupPattern { elements }))
}

fn path_expressions(input: &str) -> PResult<'_, Vec<PatternElement>> {
    map(
        separated_list1(symbol(','), ws(alt((optional_path, path_expression)))),
        |parts| parts.into_iter().flatten().collect(),
    )
    .parse(input)
}

/// `[ path expressions [where ...] ]`
fn optional_path(input: &str) -> PResult<'_, Vec<PatternElement>> {
    let (input, _) = ch('[').parse(input)?;
    let (input, pattern) = cut(context(
        "expected path expression in optional block",
        query_pattern,
    ))
    .parse(input)?;
    let (input, _) = cut(context("expected `]`", ws(ch(']')))).parse(input)?;
    Ok((input, vec![PatternElement::Optional(pattern)]))
}

fn node_value(input: &str) -> PResult<'_, PatternTerm> {
    alt((
        map(iri, PatternTerm::Iri),
        map(blank_node, PatternTerm::BlankNode),
        literal,
        map(serql_variable, PatternTerm::Variable),
    ))
    .parse(input)
}

fn node(input: &str) -> PResult<'_, PatternTerm> {
    map(
        delimited(ch('{'), opt(ws(node_value)), cut(ws(ch('}')))),
        |value| value.unwrap_or(PatternTerm::Anonymous),
    )
    .parse(input)
}

fn edge(input: &str) -> PResult<'_, PatternTerm> {
    alt((
        map(iri, PatternTerm::Iri),
        map(serql_variable, PatternTerm::Variable),
    ))
    .parse(input)
}

fn path_expression(input: &str) -> PResult<'_, Vec<PatternElement>> {
    let (rest, first) = node(input)?;
    let (rest, steps) = cut(context(
        "expected `predicate {node}` in path expression",
        many1((ws(edge), ws(node))),
    ))
    .parse(rest)?;

    let last = steps.len() - 1;
    let mut subject = first;
    let mut elements = Vec::with_capacity(steps.len());
    for (i, (predicate, object)) in steps.into_iter().enumerate() {
        let object = match object {
            // an empty node shared by two edges must bind the same value
            PatternTerm::Anonymous if i < last => {
                PatternTerm::Variable(format!("{}{}", HIDDEN_VARIABLE_PREFIX, rest.len() + i))
            }
            other => other,
        };
        elements.push(PatternElement::Triple(TriplePattern {
            subject,
            predicate,
            object: object.clone(),
        }));
        subject = object;
    }
    Ok((rest, elements))
}

/// Boolean condition; kept as text up to the next clause keyword.
fn where_clause(input: &str) -> PResult<'_, PatternElement> {
    let (input, _) = ws(keyword("where")).parse(input)?;
    let mut rest = input;
    loop {
        let (r, _) = sp(rest)?;
        if r.is_empty() || r.starts_with(']') || starts_with_keyword(r, &["limit", "offset", "using"])
        {
            rest = r;
            break;
        }
        let (r, _) = alt((
            map(quoted_string, |_| ()),
            map(iri_ref, |_| ()),
            map(balanced_parens, |_| ()),
            map(
                take_while1(|c: char| {
                    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | '\'' | ']' | '<')
                }),
                |_| (),
            ),
            map(ch('<'), |_| ()),
        ))
        .parse(r)?;
        rest = r;
    }
    let condition = input[..input.len() - rest.len()].trim();
    if condition.is_empty() {
        return Err(nom::Err::Failure(QueryParsingError::new(
            input,
            "expected condition after WHERE",
        )));
    }
    Ok((rest, PatternElement::Filter(condition.to_string())))
}

fn namespace_declaration(input: &str) -> PResult<'_, (String, String)> {
    let (input, (prefix, _, iri)) =
        (ws(identifier), symbol('='), ws(iri_ref)).parse(input)?;
    Ok((input, (prefix.to_string(), iri)))
}

fn namespace_clause(input: &str) -> PResult<'_, Vec<(String, String)>> {
    let (input, _) = separated_words(input, &["using", "namespace"])?;
    cut(context(
        "expected `prefix = <iri>` namespace declaration",
        separated_list1(symbol(','), namespace_declaration),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_parser::ast::IriRef;

    fn full_iri(iri: &str) -> PatternTerm {
        PatternTerm::Iri(IriRef::Full(iri.to_string()))
    }

    fn var(name: &str) -> PatternTerm {
        PatternTerm::Variable(name.to_string())
    }

    #[test]
    fn test_select_from_path() {
        let q = parse_serql(
            "select book from {book} dc:title {\"Foo\"} using namespace dc = <http://purl.org/dc/terms/>",
        )
        .unwrap();
        assert_eq!(q.form, QueryForm::Select);
        assert_eq!(q.projection, Projection::Variables(vec!["book".to_string()]));
        assert_eq!(
            q.pattern.unwrap().elements,
            vec![PatternElement::Triple(TriplePattern {
                subject: var("book"),
                predicate: full_iri("http://purl.org/dc/terms/title"),
                object: PatternTerm::Literal {
                    lexical: "Foo".to_string(),
                    datatype: None,
                    language: None
                },
            })]
        );
    }

    #[test]
    fn test_chain_with_empty_middle_node() {
        let q = parse_serql("select x, y from {x} <urn:p> {} <urn:q> {y}").unwrap();
        let elements = q.pattern.unwrap().elements;
        assert_eq!(elements.len(), 2);
        let (PatternElement::Triple(first), PatternElement::Triple(second)) =
            (&elements[0], &elements[1])
        else {
            panic!("expected two triples, got {:?}", elements);
        };
        assert!(matches!(&first.object, PatternTerm::Variable(v) if v.starts_with(HIDDEN_VARIABLE_PREFIX)));
        assert_eq!(first.object, second.subject);
    }

    #[test]
    fn test_builtin_namespaces_need_no_declaration() {
        let q = parse_serql("select c from {c} rdf:type {rdfs:Class}").unwrap();
        let elements = q.pattern.unwrap().elements;
        let PatternElement::Triple(t) = &elements[0] else {
            panic!("expected triple");
        };
        assert_eq!(
            t.predicate,
            full_iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type")
        );
    }

    #[test]
    fn test_where_limit_offset_and_optional() {
        let q = parse_serql(
            "select distinct x from {x} <urn:p> {v}, [{x} <urn:q> {w}] where v > 3 and w like \"a*\" limit 5 offset 1",
        )
        .unwrap();
        assert!(q.distinct);
        assert_eq!((q.limit, q.offset), (Some(5), Some(1)));
        let elements = q.pattern.unwrap().elements;
        assert!(matches!(elements[1], PatternElement::Optional(_)));
        assert!(matches!(&elements[2], PatternElement::Filter(c) if c.starts_with("v > 3")));
    }

    #[test]
    fn test_construct_star_uses_pattern() {
        let q = parse_serql("construct * from {s} <urn:p> {o}").unwrap();
        assert_eq!(q.form, QueryForm::Construct);
        assert_eq!(q.template.len(), 1);
    }

    #[test]
    fn test_malformed_serql_fails() {
        let malformed = vec![
            "",
            "select",
            "select x",
            "select x from",
            "select x from {x}",
            "select x from {x} <urn:p>",
            "select x from {x} <urn:p> {y",
            "select x from {x} dc:title {y}",
            "select x from {x} <urn:p> {y} where",
            "select x from {x} <urn:p> {y} using namespace dc",
            "ask {x} <urn:p> {y}",
        ];
        for query in malformed {
            assert!(parse_serql(query).is_err(), "expected failure for {:?}", query);
        }
    }
}
