//! SPARQL recogniser.
//!
//! Accepts the query forms and group-pattern constructs the mapping layer
//! emits or passes through, and builds just enough AST for the in-memory
//! source to evaluate basic graph patterns. Expressions (FILTER, BIND,
//! ORDER BY conditions) are checked for balance only.
//!
//! `WHERE` may be followed by a bare triples block instead of a braced group;
//! synthesized queries such as `select ?book where ?x dc:title "Foo"` rely on
//! that.

use nom::{
    branch::alt,
    combinator::{cut, map, opt, recognize, value},
    error::context,
    multi::{many0, many1, separated_list1},
    sequence::{delimited, preceded, terminated},
    Parser,
};

use super::ast::{
    GroupPattern, IriRef, ParsedQuery, PatternElement, PatternTerm, Projection, QueryForm,
    TriplePattern,
};
use super::common::{
    balanced_braces, balanced_parens, blank_node, call_expression, ch, end_of_input, iri,
    iri_ref, keyword, literal, pname_ns, separated_words, sp, symbol, unsigned, variable, ws,
    PResult,
};
use super::errors::{ParseFailure, QueryParsingError};
use super::resolve::resolve_prefixes;
use crate::model::term::RDF_TYPE;

/// Parse and validate a complete SPARQL query.
pub fn parse_sparql(input: &str) -> Result<ParsedQuery, ParseFailure> {
    let (_, mut query) = query(input)?;
    resolve_prefixes(&mut query, &[])?;
    Ok(query)
}

enum PrologueItem {
    Prefix(String, String),
    Base(String),
}

fn prefix_decl(input: &str) -> PResult<'_, PrologueItem> {
    let (input, _) = ws(keyword("prefix")).parse(input)?;
    let (input, (prefix, iri)) = cut((
        context("expected `prefix:` in PREFIX declaration", ws(pname_ns)),
        context("expected namespace IRI in PREFIX declaration", ws(iri_ref)),
    ))
    .parse(input)?;
    Ok((input, PrologueItem::Prefix(prefix.to_string(), iri)))
}

fn base_decl(input: &str) -> PResult<'_, PrologueItem> {
    let (input, _) = ws(keyword("base")).parse(input)?;
    let (input, iri) = cut(context("expected IRI in BASE declaration", ws(iri_ref))).parse(input)?;
    Ok((input, PrologueItem::Base(iri)))
}

fn query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, prologue) = many0(alt((prefix_decl, base_decl))).parse(input)?;
    let (input, mut query) = context(
        "expected SELECT, CONSTRUCT, ASK or DESCRIBE",
        alt((select_query, construct_query, ask_query, describe_query)),
    )
    .parse(input)?;
    let (input, (limit, offset)) = solution_modifiers(input)?;
    let (input, _) = sp(input)?;
    let (input, _) = end_of_input(input)?;

    for item in prologue {
        match item {
            PrologueItem::Prefix(prefix, iri) => query.prefixes.push((prefix, iri)),
            PrologueItem::Base(iri) => query.base = Some(iri),
        }
    }
    query.limit = limit;
    query.offset = offset;
    Ok((input, query))
}

fn select_query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, _) = ws(keyword("select")).parse(input)?;
    cut(select_body).parse(input)
}

fn select_body(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, modifier) = opt(ws(alt((keyword("distinct"), keyword("reduced"))))).parse(input)?;
    let (input, projection) = context("expected `*` or projection variables", projection).parse(input)?;
    let (input, _) = dataset_clauses(input)?;
    let (input, pattern) = context("expected WHERE clause", where_clause).parse(input)?;

    let mut query = ParsedQuery::new(QueryForm::Select);
    query.distinct = modifier.is_some_and(|m| m.eq_ignore_ascii_case("distinct"));
    query.projection = projection;
    query.pattern = Some(pattern);
    Ok((input, query))
}

fn projection(input: &str) -> PResult<'_, Projection> {
    alt((
        value(Projection::All, symbol('*')),
        map(many1(ws(select_item)), Projection::Variables),
    ))
    .parse(input)
}

fn select_item(input: &str) -> PResult<'_, String> {
    alt((variable, aliased_expression)).parse(input)
}

/// `(expression AS ?alias)`; yields the alias.
fn aliased_expression(input: &str) -> PResult<'_, String> {
    let (rest, raw) = balanced_parens(input)?;
    let inner = raw[1..raw.len() - 1].trim_end();
    let mut tokens = inner.rsplitn(3, char::is_whitespace);
    let alias = tokens.next().unwrap_or_default();
    let as_kw = tokens.next().unwrap_or_default();
    let has_expr = tokens.next().is_some_and(|e| !e.trim().is_empty());
    match variable(alias) {
        Ok(("", name)) if as_kw.eq_ignore_ascii_case("as") && has_expr => Ok((rest, name)),
        _ => Err(nom::Err::Failure(QueryParsingError::new(
            input,
            "expected `(expression AS ?var)` in projection",
        ))),
    }
}

fn dataset_clauses(input: &str) -> PResult<'_, Vec<IriRef>> {
    many0(preceded(
        (ws(keyword("from")), opt(ws(keyword("named")))),
        cut(context("expected graph IRI after FROM", ws(iri))),
    ))
    .parse(input)
}

fn where_clause(input: &str) -> PResult<'_, GroupPattern> {
    let (input, kw) = opt(ws(keyword("where"))).parse(input)?;
    match kw {
        Some(_) => cut(alt((ws(group_graph_pattern), bare_triples_block))).parse(input),
        None => ws(group_graph_pattern).parse(input),
    }
}

fn construct_query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, _) = ws(keyword("construct")).parse(input)?;
    cut(construct_body).parse(input)
}

fn construct_body(input: &str) -> PResult<'_, ParsedQuery> {
    let mut query = ParsedQuery::new(QueryForm::Construct);

    // CONSTRUCT WHERE { triples } uses the pattern as its own template
    if let Ok((rest, _)) = ws(keyword("where")).parse(input) {
        let (rest, template) = context("expected `{` after CONSTRUCT WHERE", ws(template_block)).parse(rest)?;
        query.pattern = Some(GroupPattern::triples(template.clone()));
        query.template = template;
        return Ok((rest, query));
    }

    let (input, template) = context("expected construct template", ws(template_block)).parse(input)?;
    let (input, _) = dataset_clauses(input)?;
    let (input, pattern) = context("expected WHERE clause", where_clause).parse(input)?;
    query.template = template;
    query.pattern = Some(pattern);
    Ok((input, query))
}

fn template_block(input: &str) -> PResult<'_, Vec<TriplePattern>> {
    map(
        delimited(ch('{'), opt(ws(triples_block)), ws(ch('}'))),
        Option::unwrap_or_default,
    )
    .parse(input)
}

fn ask_query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, _) = ws(keyword("ask")).parse(input)?;
    let (input, (_, pattern)) = cut((
        dataset_clauses,
        context("expected ASK pattern", where_clause),
    ))
    .parse(input)?;
    let mut query = ParsedQuery::new(QueryForm::Ask);
    query.pattern = Some(pattern);
    Ok((input, query))
}

fn describe_query(input: &str) -> PResult<'_, ParsedQuery> {
    let (input, _) = ws(keyword("describe")).parse(input)?;
    let (input, (targets, _, pattern)) = cut((
        context(
            "expected `*`, variables or IRIs to describe",
            alt((
                value(Vec::new(), symbol('*')),
                many1(ws(alt((map(variable, PatternTerm::Variable), map(iri, PatternTerm::Iri))))),
            )),
        ),
        dataset_clauses,
        opt(where_clause),
    ))
    .parse(input)?;
    let mut query = ParsedQuery::new(QueryForm::Describe);
    query.projection = if targets.is_empty() {
        Projection::All
    } else {
        Projection::Variables(
            targets
                .iter()
                .filter_map(|t| match t {
                    PatternTerm::Variable(v) => Some(v.clone()),
                    _ => None,
                })
                .collect(),
        )
    };
    query.describe = targets;
    query.pattern = pattern;
    Ok((input, query))
}

fn solution_modifiers(input: &str) -> PResult<'_, (Option<u64>, Option<u64>)> {
    let (input, _) = opt(group_by).parse(input)?;
    let (input, _) = opt(having).parse(input)?;
    let (input, _) = opt(order_by).parse(input)?;
    let (input, limit) = opt(limit_clause).parse(input)?;
    let (input, offset) = opt(offset_clause).parse(input)?;
    let (input, limit) = match limit {
        Some(n) => (input, Some(n)),
        None => opt(limit_clause).parse(input)?,
    };
    Ok((input, (limit, offset)))
}

fn group_by(input: &str) -> PResult<'_, Vec<&str>> {
    let (input, _) = separated_words(input, &["group", "by"])?;
    cut(context(
        "expected GROUP BY condition",
        many1(ws(alt((recognize(variable), balanced_parens, call_expression)))),
    ))
    .parse(input)
}

fn having(input: &str) -> PResult<'_, Vec<&str>> {
    preceded(
        ws(keyword("having")),
        cut(context(
            "expected HAVING condition",
            many1(ws(alt((balanced_parens, call_expression)))),
        )),
    )
    .parse(input)
}

fn order_condition(input: &str) -> PResult<'_, &str> {
    alt((
        recognize((alt((keyword("asc"), keyword("desc"))), sp, balanced_parens)),
        recognize(variable),
        balanced_parens,
        call_expression,
    ))
    .parse(input)
}

fn order_by(input: &str) -> PResult<'_, Vec<&str>> {
    let (input, _) = separated_words(input, &["order", "by"])?;
    cut(context("expected ORDER BY condition", many1(ws(order_condition)))).parse(input)
}

fn limit_clause(input: &str) -> PResult<'_, u64> {
    preceded(
        ws(keyword("limit")),
        cut(context("expected integer after LIMIT", ws(unsigned))),
    )
    .parse(input)
}

fn offset_clause(input: &str) -> PResult<'_, u64> {
    preceded(
        ws(keyword("offset")),
        cut(context("expected integer after OFFSET", ws(unsigned))),
    )
    .parse(input)
}

fn anonymous(input: &str) -> PResult<'_, PatternTerm> {
    value(PatternTerm::Anonymous, (ch('['), sp, ch(']'))).parse(input)
}

fn var_or_iri(input: &str) -> PResult<'_, PatternTerm> {
    alt((map(variable, PatternTerm::Variable), map(iri, PatternTerm::Iri))).parse(input)
}

fn subject_term(input: &str) -> PResult<'_, PatternTerm> {
    alt((
        var_or_iri,
        map(blank_node, PatternTerm::BlankNode),
        anonymous,
    ))
    .parse(input)
}

fn verb(input: &str) -> PResult<'_, PatternTerm> {
    alt((
        var_or_iri,
        value(
            PatternTerm::Iri(IriRef::Full(RDF_TYPE.to_string())),
            keyword("a"),
        ),
    ))
    .parse(input)
}

fn object_term(input: &str) -> PResult<'_, PatternTerm> {
    alt((
        var_or_iri,
        map(blank_node, PatternTerm::BlankNode),
        anonymous,
        literal,
    ))
    .parse(input)
}

fn verb_objects(input: &str) -> PResult<'_, Vec<(PatternTerm, PatternTerm)>> {
    let (input, predicate) = ws(verb).parse(input)?;
    let (input, objects) = cut(context(
        "expected object in triple pattern",
        separated_list1(symbol(','), ws(object_term)),
    ))
    .parse(input)?;
    Ok((
        input,
        objects
            .into_iter()
            .map(|object| (predicate.clone(), object))
            .collect(),
    ))
}

fn property_list(input: &str) -> PResult<'_, Vec<(PatternTerm, PatternTerm)>> {
    let (input, first) = verb_objects(input)?;
    let (input, more) = many0(preceded(symbol(';'), opt(verb_objects))).parse(input)?;
    let mut pairs = first;
    pairs.extend(more.into_iter().flatten().flatten());
    Ok((input, pairs))
}

fn triples_same_subject(input: &str) -> PResult<'_, Vec<TriplePattern>> {
    let (input, subject) = ws(subject_term).parse(input)?;
    let (input, pairs) =
        cut(context("expected predicate after subject", property_list)).parse(input)?;
    Ok((
        input,
        pairs
            .into_iter()
            .map(|(predicate, object)| TriplePattern {
                subject: subject.clone(),
                predicate,
                object,
            })
            .collect(),
    ))
}

fn triples_block(input: &str) -> PResult<'_, Vec<TriplePattern>> {
    let (input, first) = triples_same_subject(input)?;
    let (input, more) = many0(preceded(symbol('.'), triples_same_subject)).parse(input)?;
    let (input, _) = opt(symbol('.')).parse(input)?;
    let mut triples = first;
    triples.extend(more.into_iter().flatten());
    Ok((input, triples))
}

fn bare_triples_block(input: &str) -> PResult<'_, GroupPattern> {
    map(ws(triples_block), GroupPattern::triples).parse(input)
}

fn group_or_union(input: &str) -> PResult<'_, PatternElement> {
    let (input, first) = group_graph_pattern(input)?;
    let (input, rest) = many0(preceded(
        ws(keyword("union")),
        cut(context("expected `{` after UNION", ws(group_graph_pattern))),
    ))
    .parse(input)?;
    if rest.is_empty() {
        return Ok((input, PatternElement::Group(first)));
    }
    let mut branches = vec![first];
    branches.extend(rest);
    Ok((input, PatternElement::Union(branches)))
}

fn keyword_group<'a>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = GroupPattern, Error = QueryParsingError<'a>> {
    preceded(
        ws(keyword(kw)),
        cut(context("expected `{` group pattern", ws(group_graph_pattern))),
    )
}

fn single(element: PatternElement) -> Vec<PatternElement> {
    vec![element]
}

fn group_element(input: &str) -> PResult<'_, Vec<PatternElement>> {
    alt((
        map(keyword_group("optional"), |g| single(PatternElement::Optional(g))),
        map(keyword_group("minus"), |g| single(PatternElement::Minus(g))),
        map(
            preceded(
                ws(keyword("graph")),
                cut((ws(var_or_iri), ws(group_graph_pattern))),
            ),
            |(name, g)| single(PatternElement::Graph(name, g)),
        ),
        map(
            preceded(
                ws(keyword("filter")),
                cut(context(
                    "expected FILTER expression",
                    ws(alt((balanced_parens, call_expression))),
                )),
            ),
            |e: &str| single(PatternElement::Filter(e.to_string())),
        ),
        map(
            preceded(
                ws(keyword("bind")),
                cut(context("expected `(expression AS ?var)`", ws(balanced_parens))),
            ),
            |e: &str| single(PatternElement::Bind(e.to_string())),
        ),
        map(
            preceded(
                ws(keyword("values")),
                cut(recognize((
                    ws(alt((recognize(variable), balanced_parens))),
                    ws(balanced_braces),
                ))),
            ),
            |v: &str| single(PatternElement::Values(v.trim().to_string())),
        ),
        map(group_or_union, single),
        map(triples_same_subject, |triples| {
            triples.into_iter().map(PatternElement::Triple).collect()
        }),
    ))
    .parse(input)
}

fn group_graph_pattern(input: &str) -> PResult<'_, GroupPattern> {
    let (input, _) = ch('{').parse(input)?;
    let (input, elements) = cut(terminated(
        many0(terminated(ws(group_element), opt(symbol('.')))),
        context("expected `}` closing group pattern", ws(ch('}'))),
    ))
    .parse(input)?;
    Ok((
        input,
        GroupPattern {
            elements: elements.into_iter().flatten().collect(),
        },
    ))
}
