//! Prefixed-name expansion over a parsed query.
//!
//! Runs after parsing: every `prefix:local` in a pattern, template or
//! describe target must resolve against the query's own declarations or the
//! dialect's implicit ones, otherwise the query is rejected the way a real
//! endpoint would reject it.

use super::ast::{GroupPattern, IriRef, ParsedQuery, PatternElement, PatternTerm, TriplePattern};
use super::errors::ParseFailure;

struct Resolver<'q> {
    declared: &'q [(String, String)],
    implicit: &'q [(&'static str, &'static str)],
    base: Option<&'q str>,
}

impl Resolver<'_> {
    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.declared
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, iri)| iri.as_str())
            .or_else(|| {
                self.implicit
                    .iter()
                    .find(|(p, _)| *p == prefix)
                    .map(|(_, iri)| *iri)
            })
    }

    fn iri(&self, iri: &mut IriRef) -> Result<(), ParseFailure> {
        let resolved = match iri {
            IriRef::Prefixed { prefix, local } => match self.lookup(prefix) {
                Some(ns) => format!("{}{}", ns, local),
                None => {
                    return Err(ParseFailure::new(format!(
                        "undeclared prefix `{}:` in `{}:{}`",
                        prefix, prefix, local
                    )))
                }
            },
            IriRef::Full(value) => match self.base {
                Some(base) if !crate::model::identifier::looks_absolute(value) => {
                    format!("{}{}", base, value)
                }
                _ => return Ok(()),
            },
        };
        *iri = IriRef::Full(resolved);
        Ok(())
    }

    fn term(&self, term: &mut PatternTerm) -> Result<(), ParseFailure> {
        match term {
            PatternTerm::Iri(iri) => self.iri(iri),
            PatternTerm::Literal {
                datatype: Some(dt), ..
            } => self.iri(dt),
            _ => Ok(()),
        }
    }

    fn triple(&self, triple: &mut TriplePattern) -> Result<(), ParseFailure> {
        self.term(&mut triple.subject)?;
        self.term(&mut triple.predicate)?;
        self.term(&mut triple.object)
    }

    fn group(&self, group: &mut GroupPattern) -> Result<(), ParseFailure> {
        for element in &mut group.elements {
            match element {
                PatternElement::Triple(t) => self.triple(t)?,
                PatternElement::Group(g)
                | PatternElement::Optional(g)
                | PatternElement::Minus(g) => self.group(g)?,
                PatternElement::Union(branches) => {
                    for g in branches {
                        self.group(g)?;
                    }
                }
                PatternElement::Graph(name, g) => {
                    self.term(name)?;
                    self.group(g)?;
                }
                PatternElement::Filter(_) | PatternElement::Bind(_) | PatternElement::Values(_) => {}
            }
        }
        Ok(())
    }
}

pub(crate) fn resolve_prefixes(
    query: &mut ParsedQuery,
    implicit: &[(&'static str, &'static str)],
) -> Result<(), ParseFailure> {
    let declared = query.prefixes.clone();
    let base = query.base.clone();
    let resolver = Resolver {
        declared: &declared,
        implicit,
        base: base.as_deref(),
    };

    for t in &mut query.template {
        resolver.triple(t)?;
    }
    for t in &mut query.describe {
        resolver.term(t)?;
    }
    if let Some(pattern) = &mut query.pattern {
        resolver.group(pattern)?;
    }
    Ok(())
}
