use nom::error::{ContextError, ParseError};
use std::fmt;

#[derive(Debug, PartialEq)]
pub struct QueryParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> QueryParsingError<'a> {
    pub fn new(input: &'a str, ctx: &'static str) -> Self {
        QueryParsingError {
            errors: vec![(input, ctx)],
        }
    }
}

impl<'a> ParseError<&'a str> for QueryParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        QueryParsingError {
            errors: vec![(input, "unexpected input")],
        }
    }

    fn append(_input: &'a str, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> ContextError<&'a str> for QueryParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for QueryParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{} at: {}", ctx, snippet(input))?;
        }
        Ok(())
    }
}

/// Owned parse diagnostic, detached from the input borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseFailure {}

impl ParseFailure {
    pub fn new(message: impl Into<String>) -> Self {
        ParseFailure {
            message: message.into(),
        }
    }
}

impl From<nom::Err<QueryParsingError<'_>>> for ParseFailure {
    fn from(err: nom::Err<QueryParsingError<'_>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => ParseFailure::new("unexpected end of query"),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                ParseFailure::new(e.to_string().trim_end().to_string())
            }
        }
    }
}

fn snippet(input: &str) -> String {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return "<end of query>".to_string();
    }
    let cut: String = trimmed.chars().take(32).collect();
    if cut.len() < trimmed.len() {
        format!("`{}...`", cut)
    } else {
        format!("`{}`", cut)
    }
}
