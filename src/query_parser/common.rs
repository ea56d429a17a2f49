use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1, one_of, satisfy},
    combinator::{eof, map, not, opt, recognize, value},
    error::context,
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};

use super::ast::{IriRef, PatternTerm};
use super::errors::QueryParsingError;
use crate::model::term::{unescape_literal, XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER};

pub(crate) type PResult<'a, O> = IResult<&'a str, O, QueryParsingError<'a>>;

pub(crate) const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

fn comment(input: &str) -> PResult<'_, &str> {
    recognize(pair(char('#'), take_while(|c| c != '\n'))).parse(input)
}

/// Whitespace and `#` line comments.
pub fn sp(input: &str) -> PResult<'_, ()> {
    value((), many0(alt((multispace1, comment)))).parse(input)
}

pub fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = QueryParsingError<'a>>
where
    F: Parser<&'a str, Output = O, Error = QueryParsingError<'a>>,
{
    delimited(sp, inner, sp)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn continues_word(c: char) -> bool {
    is_name_char(c) || c == ':'
}

/// Case-insensitive keyword that must not run into a following name char,
/// so `select` does not match the start of `selected` and `graph` does not
/// match the prefixed name `graph:x`.
pub fn keyword<'a>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = QueryParsingError<'a>> {
    terminated(tag_no_case(kw), not(satisfy(continues_word)))
}

pub fn ch<'a>(c: char) -> impl Parser<&'a str, Output = char, Error = QueryParsingError<'a>> {
    char(c)
}

pub fn symbol<'a>(c: char) -> impl Parser<&'a str, Output = char, Error = QueryParsingError<'a>> {
    ws(char(c))
}

pub fn iri_ref(input: &str) -> PResult<'_, String> {
    map(
        delimited(
            char('<'),
            take_while(|c: char| c != '>' && c != '<' && c != '"' && !c.is_whitespace()),
            char('>'),
        ),
        |iri: &str| iri.to_string(),
    )
    .parse(input)
}

fn pn_prefix(input: &str) -> PResult<'_, &str> {
    recognize(opt(pair(
        satisfy(|c| c.is_alphabetic()),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    )))
    .parse(input)
}

/// `prefix:` as written in a prefix declaration; returns the prefix.
pub fn pname_ns(input: &str) -> PResult<'_, &str> {
    terminated(pn_prefix, ch(':')).parse(input)
}

/// Bare identifier such as a SeRQL variable or namespace prefix.
pub fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(is_name_char),
    ))
    .parse(input)
}

/// True if `input` starts with one of `words` as a whole keyword.
pub fn starts_with_keyword(input: &str, words: &[&'static str]) -> bool {
    words.iter().any(|w| keyword(*w).parse(input).is_ok())
}

pub fn end_of_input(input: &str) -> PResult<'_, &str> {
    context("unexpected trailing input", eof).parse(input)
}

/// `prefix:local`; the local part may not end with a dot, which belongs to
/// the enclosing triples block.
pub fn prefixed_name(input: &str) -> PResult<'_, IriRef> {
    let (rest, prefix) = pn_prefix(input)?;
    let (rest, _) = ch(':').parse(rest)?;
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '%' | ':')))
        .unwrap_or(rest.len());
    let local = rest[..end].trim_end_matches('.');
    Ok((
        &rest[local.len()..],
        IriRef::Prefixed {
            prefix: prefix.to_string(),
            local: local.to_string(),
        },
    ))
}

pub fn iri(input: &str) -> PResult<'_, IriRef> {
    alt((map(iri_ref, IriRef::Full), prefixed_name)).parse(input)
}

/// `?name` or `$name`; returns the bare name.
pub fn variable(input: &str) -> PResult<'_, String> {
    map(
        preceded(
            one_of("?$"),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        ),
        |name: &str| name.to_string(),
    )
    .parse(input)
}

pub fn blank_node(input: &str) -> PResult<'_, String> {
    map(
        preceded(tag("_:"), take_while1(is_name_char)),
        |label: &str| label.to_string(),
    )
    .parse(input)
}

/// Single- or double-quoted string with backslash escapes; returns the
/// unescaped body.
pub fn quoted_string(input: &str) -> PResult<'_, String> {
    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, c @ ('"' | '\''))) => c,
        _ => {
            return Err(nom::Err::Error(QueryParsingError::new(
                input,
                "expected string literal",
            )))
        }
    };
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\n' => break,
            c if c == quote => return Ok((&input[i + 1..], unescape_literal(&input[1..i]))),
            _ => {}
        }
    }
    Err(nom::Err::Failure(QueryParsingError::new(
        input,
        "unterminated string literal",
    )))
}

fn language_tag(input: &str) -> PResult<'_, &str> {
    preceded(
        char('@'),
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic()),
            many0(pair(char('-'), take_while1(|c: char| c.is_ascii_alphanumeric()))),
        )),
    )
    .parse(input)
}

fn datatype_suffix(input: &str) -> PResult<'_, IriRef> {
    preceded(tag("^^"), iri).parse(input)
}

pub fn rdf_literal(input: &str) -> PResult<'_, PatternTerm> {
    let (rest, lexical) = quoted_string(input)?;
    let (rest, language) = opt(language_tag).parse(rest)?;
    let (rest, datatype) = match language {
        Some(_) => (rest, None),
        None => opt(datatype_suffix).parse(rest)?,
    };
    Ok((
        rest,
        PatternTerm::Literal {
            lexical,
            datatype,
            language: language.map(str::to_string),
        },
    ))
}

fn numeric_text(input: &str) -> PResult<'_, &str> {
    recognize((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

pub fn numeric_literal(input: &str) -> PResult<'_, PatternTerm> {
    let (_, text) = numeric_text(input)?;
    // a trailing dot ends the triple, not the number
    let text = text.trim_end_matches('.');
    let rest = &input[text.len()..];
    let datatype = if text.contains(['e', 'E']) {
        XSD_DOUBLE
    } else if text.contains('.') {
        XSD_DECIMAL
    } else {
        XSD_INTEGER
    };
    Ok((
        rest,
        PatternTerm::Literal {
            lexical: text.to_string(),
            datatype: Some(IriRef::Full(datatype.to_string())),
            language: None,
        },
    ))
}

pub fn boolean_literal(input: &str) -> PResult<'_, PatternTerm> {
    map(alt((keyword("true"), keyword("false"))), |b: &str| {
        PatternTerm::Literal {
            lexical: b.to_ascii_lowercase(),
            datatype: Some(IriRef::Full(XSD_BOOLEAN.to_string())),
            language: None,
        }
    })
    .parse(input)
}

pub fn literal(input: &str) -> PResult<'_, PatternTerm> {
    alt((rdf_literal, numeric_literal, boolean_literal)).parse(input)
}

fn digit_run(input: &str) -> PResult<'_, &str> {
    digit1(input)
}

pub fn unsigned(input: &str) -> PResult<'_, u64> {
    let (rest, digits) = digit_run(input)?;
    let n = digits.parse::<u64>().map_err(|_| {
        nom::Err::Failure(QueryParsingError::new(input, "integer out of range"))
    })?;
    Ok((rest, n))
}

fn paren_content(input: &str) -> PResult<'_, &str> {
    alt((recognize(quoted_string), balanced_parens, is_not("()\"'"))).parse(input)
}

/// `( ... )` with nested parentheses and quoted strings; returns the raw text.
pub fn balanced_parens(input: &str) -> PResult<'_, &str> {
    context(
        "unbalanced parentheses",
        recognize(delimited(char('('), many0(paren_content), char(')'))),
    )
    .parse(input)
}

fn brace_content(input: &str) -> PResult<'_, &str> {
    alt((recognize(quoted_string), balanced_braces, is_not("{}\"'"))).parse(input)
}

pub fn balanced_braces(input: &str) -> PResult<'_, &str> {
    recognize(delimited(char('{'), many0(brace_content), char('}'))).parse(input)
}

/// Function-call style expression such as `regex(?t, "x")`.
pub fn call_expression(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((
            recognize(prefixed_name),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        preceded(sp, balanced_parens),
    ))
    .parse(input)
}

pub fn separated_words<'a>(
    input: &'a str,
    words: &'static [&'static str],
) -> PResult<'a, ()> {
    let mut rest = input;
    for word in words {
        let (r, _) = ws(keyword(*word)).parse(rest)?;
        rest = r;
    }
    Ok((rest, ()))
}
