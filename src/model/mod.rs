//! Graph data model: node identifiers, terms, triples, graphs and tabular
//! query results.

pub mod errors;
pub mod graph;
pub mod identifier;
pub mod results;
pub mod term;

pub use errors::ModelError;
pub use graph::{Graph, Triple};
pub use identifier::EntityIdentifier;
pub use results::{BindingRow, ResultTable};
pub use term::Term;
