use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::term::Term;

/// One solution: variable name (without sigil) to bound value.
pub type BindingRow = BTreeMap<String, Term>;

/// Tabular result of a select query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub variables: Vec<String>,
    pub rows: Vec<BindingRow>,
}

impl ResultTable {
    pub fn new(variables: Vec<String>) -> Self {
        ResultTable {
            variables,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values bound to one variable, skipping rows where it is unbound.
    pub fn column<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a Term> {
        self.rows.iter().filter_map(move |row| row.get(variable))
    }
}
