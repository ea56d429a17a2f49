//! rdfmap - object mapping over RDF triple stores
//!
//! This crate turns domain-level lookups into store queries and back:
//! - Dialect rules for SPARQL and SeRQL
//! - Normalization of query fragments into validated queries
//! - Lazy entity proxies and a proxy-aware list
//! - A transactional data source contract with in-memory backends

pub mod config;
pub mod dialect;
pub mod errors;
pub mod model;
pub mod namespaces;
pub mod proxy;
pub mod query;
pub mod query_parser;
pub mod source;

pub use dialect::Dialect;
pub use errors::RdfMapError;
pub use model::{EntityIdentifier, Graph, Term, Triple};
pub use query::{normalize, normalize_with, NormalizedQuery, Query, QueryError};
