//! Basic graph pattern evaluation over an in-memory [`Graph`].
//!
//! Solutions are binding rows. Each pattern element transforms the current
//! solution sequence: triples join, UNION concatenates its branches and
//! OPTIONAL left-joins. Constructs with expression semantics are refused
//! rather than silently ignored.
//!
//! Blank node labels in a pattern act as variables that never appear in a
//! `*` projection; `[]` / `{}` match anything and bind nothing.

use super::errors::DataSourceError;
use crate::model::{BindingRow, EntityIdentifier, Graph, ResultTable, Term, Triple};
use crate::query_parser::ast::{PatternTerm, TriplePattern};
use crate::query_parser::serql::HIDDEN_VARIABLE_PREFIX;
use crate::query_parser::{GroupPattern, ParsedQuery, PatternElement, Projection};

const BLANK_VARIABLE_PREFIX: &str = "_:";

pub struct Evaluator<'g> {
    graph: &'g Graph,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Evaluator { graph }
    }

    /// All solutions of the query's pattern, before projection and slicing.
    pub fn solutions(&self, query: &ParsedQuery) -> Result<Vec<BindingRow>, DataSourceError> {
        match &query.pattern {
            Some(pattern) => self.group(pattern, vec![BindingRow::new()]),
            None => Ok(vec![BindingRow::new()]),
        }
    }

    pub fn select(&self, query: &ParsedQuery) -> Result<ResultTable, DataSourceError> {
        let variables = match &query.projection {
            Projection::Variables(vars) => vars.clone(),
            Projection::All => query
                .pattern
                .as_ref()
                .map(visible_variables)
                .unwrap_or_default(),
        };

        let mut rows: Vec<BindingRow> = self
            .solutions(query)?
            .into_iter()
            .map(|row| {
                variables
                    .iter()
                    .filter_map(|v| row.get(v).map(|t| (v.clone(), t.clone())))
                    .collect()
            })
            .collect();

        if query.distinct {
            let mut seen: Vec<BindingRow> = Vec::new();
            rows.retain(|row| {
                if seen.contains(row) {
                    false
                } else {
                    seen.push(row.clone());
                    true
                }
            });
        }

        let mut table = ResultTable::new(variables);
        table.rows = slice(rows, query.offset, query.limit);
        Ok(table)
    }

    pub fn construct(&self, query: &ParsedQuery) -> Result<Graph, DataSourceError> {
        let solutions = slice(self.solutions(query)?, query.offset, query.limit);
        let mut out = Graph::new();
        for (index, row) in solutions.iter().enumerate() {
            for (position, pattern) in query.template.iter().enumerate() {
                if let Some(triple) = instantiate(pattern, row, index, position) {
                    out.insert(triple);
                }
            }
        }
        Ok(out)
    }

    pub fn ask(&self, query: &ParsedQuery) -> Result<bool, DataSourceError> {
        Ok(!self.solutions(query)?.is_empty())
    }

    /// Triples about each described resource. Variables describe every node
    /// they are bound to; `DESCRIBE *` describes every bound node.
    pub fn describe(&self, query: &ParsedQuery) -> Result<Graph, DataSourceError> {
        let solutions = self.solutions(query)?;
        let mut targets: Vec<EntityIdentifier> = Vec::new();

        if query.describe.is_empty() {
            for row in &solutions {
                targets.extend(row.values().filter_map(Term::as_identifier));
            }
        }
        for target in &query.describe {
            match target {
                PatternTerm::Variable(name) => {
                    targets.extend(
                        solutions
                            .iter()
                            .filter_map(|row| row.get(name))
                            .filter_map(Term::as_identifier),
                    );
                }
                other => targets.extend(other.to_term().and_then(|t| t.as_identifier())),
            }
        }

        let mut out = Graph::new();
        for id in &targets {
            out.extend(self.graph.about(id).cloned());
        }
        Ok(out)
    }

    fn group(
        &self,
        group: &GroupPattern,
        mut solutions: Vec<BindingRow>,
    ) -> Result<Vec<BindingRow>, DataSourceError> {
        for element in &group.elements {
            solutions = match element {
                PatternElement::Triple(pattern) => solutions
                    .iter()
                    .flat_map(|row| self.match_triple(pattern, row))
                    .collect(),
                PatternElement::Group(inner) => self.group(inner, solutions)?,
                PatternElement::Union(branches) => {
                    let mut out = Vec::new();
                    for branch in branches {
                        out.extend(self.group(branch, solutions.clone())?);
                    }
                    out
                }
                PatternElement::Optional(inner) => {
                    let mut out = Vec::new();
                    for row in solutions {
                        let extended = self.group(inner, vec![row.clone()])?;
                        if extended.is_empty() {
                            out.push(row);
                        } else {
                            out.extend(extended);
                        }
                    }
                    out
                }
                PatternElement::Filter(expr) => return Err(unsupported("filter", expr)),
                PatternElement::Bind(expr) => return Err(unsupported("bind", expr)),
                PatternElement::Values(expr) => return Err(unsupported("values", expr)),
                PatternElement::Minus(_) => return Err(unsupported("minus", "{ ... }")),
                PatternElement::Graph(_, _) => return Err(unsupported("graph", "{ ... }")),
            };
        }
        Ok(solutions)
    }

    fn match_triple(&self, pattern: &TriplePattern, row: &BindingRow) -> Vec<BindingRow> {
        let candidates: Box<dyn Iterator<Item = &Triple> + '_> =
            match bound_value(&pattern.subject, row).and_then(|t| t.as_identifier()) {
                Some(id) => Box::new(self.graph.iter().filter(move |t| t.subject == id)),
                None => Box::new(self.graph.iter()),
            };

        candidates
            .filter_map(|triple| {
                let mut extended = row.clone();
                let matched = unify(&pattern.subject, &Term::from(&triple.subject), &mut extended)
                    && unify(
                        &pattern.predicate,
                        &Term::iri(triple.predicate.clone()),
                        &mut extended,
                    )
                    && unify(&pattern.object, &triple.object, &mut extended);
                matched.then_some(extended)
            })
            .collect()
    }
}

fn unsupported(construct: &str, detail: &str) -> DataSourceError {
    DataSourceError::data_access(format!(
        "in-memory evaluation does not support `{}` ({})",
        construct, detail
    ))
}

fn variable_name(term: &PatternTerm) -> Option<String> {
    match term {
        PatternTerm::Variable(name) => Some(name.clone()),
        PatternTerm::BlankNode(label) => Some(format!("{}{}", BLANK_VARIABLE_PREFIX, label)),
        _ => None,
    }
}

fn bound_value(term: &PatternTerm, row: &BindingRow) -> Option<Term> {
    match variable_name(term) {
        Some(name) => row.get(&name).cloned(),
        None => term.to_term(),
    }
}

fn unify(pattern: &PatternTerm, value: &Term, row: &mut BindingRow) -> bool {
    if let PatternTerm::Anonymous = pattern {
        return true;
    }
    match variable_name(pattern) {
        Some(name) => match row.get(&name) {
            Some(bound) => bound == value,
            None => {
                row.insert(name, value.clone());
                true
            }
        },
        None => pattern.to_term().as_ref() == Some(value),
    }
}

fn instantiate(
    pattern: &TriplePattern,
    row: &BindingRow,
    solution: usize,
    position: usize,
) -> Option<Triple> {
    let fresh = |term: &PatternTerm| -> Option<Term> {
        match term {
            PatternTerm::BlankNode(label) => Some(Term::blank(format!("{}{}", label, solution))),
            PatternTerm::Anonymous => Some(Term::blank(format!("t{}s{}", position, solution))),
            other => bound_value(other, row),
        }
    };

    let subject = fresh(&pattern.subject)?.as_identifier()?;
    let predicate = match fresh(&pattern.predicate)? {
        Term::Iri { value } => value,
        _ => return None,
    };
    let object = fresh(&pattern.object)?;
    Some(Triple::new(subject, predicate, object))
}

fn slice(rows: Vec<BindingRow>, offset: Option<u64>, limit: Option<u64>) -> Vec<BindingRow> {
    let offset = offset.unwrap_or(0) as usize;
    let iter = rows.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit as usize).collect(),
        None => iter.collect(),
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with(BLANK_VARIABLE_PREFIX) || name.starts_with(HIDDEN_VARIABLE_PREFIX)
}

/// Variables in order of first appearance, without hidden ones.
fn visible_variables(group: &GroupPattern) -> Vec<String> {
    fn walk(group: &GroupPattern, out: &mut Vec<String>) {
        for element in &group.elements {
            match element {
                PatternElement::Triple(t) => {
                    for term in [&t.subject, &t.predicate, &t.object] {
                        if let PatternTerm::Variable(name) = term {
                            if !is_hidden(name) && !out.contains(name) {
                                out.push(name.clone());
                            }
                        }
                    }
                }
                PatternElement::Group(g) | PatternElement::Optional(g) => walk(g, out),
                PatternElement::Union(branches) => {
                    for g in branches {
                        walk(g, out);
                    }
                }
                _ => {}
            }
        }
    }

    let mut out = Vec::new();
    walk(group, &mut out);
    out
}
