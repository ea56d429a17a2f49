//! Recognisers for the supported graph query languages.
//!
//! Both parsers produce the same [`ast::ParsedQuery`], so validation and the
//! in-memory evaluator do not care which dialect a query was written in.

pub mod ast;
mod common;
pub(crate) mod errors;
mod resolve;
pub mod serql;
pub mod sparql;

pub use ast::{GroupPattern, ParsedQuery, PatternElement, PatternTerm, Projection, QueryForm};
pub use errors::ParseFailure;
pub use serql::parse_serql;
pub use sparql::parse_sparql;
