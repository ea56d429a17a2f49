//! Shared fixtures: a small FOAF-style person mapping.

use anyhow::Context;
use rdfmap::model::term::RDF_TYPE;
use rdfmap::model::{EntityIdentifier, Graph, Term, Triple};
use rdfmap::proxy::{FromGraph, ToGraph};

pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
pub const FOAF_PERSON: &str = "http://xmlns.com/foaf/0.1/Person";
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: EntityIdentifier,
    pub name: String,
}

impl Person {
    pub fn new(iri: &str, name: &str) -> Self {
        Person {
            id: EntityIdentifier::iri(iri).unwrap(),
            name: name.to_string(),
        }
    }
}

impl FromGraph for Person {
    fn from_graph(id: &EntityIdentifier, graph: &Graph) -> anyhow::Result<Self> {
        let name = graph
            .objects_of(id, FOAF_NAME)
            .next()
            .with_context(|| format!("{id} has no foaf:name"))?;
        Ok(Person {
            id: id.clone(),
            name: name.lexical().to_string(),
        })
    }
}

impl ToGraph for Person {
    fn identifier(&self) -> EntityIdentifier {
        self.id.clone()
    }

    fn to_graph(&self) -> Graph {
        let mut g = Graph::new();
        g.insert(Triple::new(self.id.clone(), RDF_TYPE, Term::iri(FOAF_PERSON)));
        g.insert(Triple::new(self.id.clone(), FOAF_NAME, self.name.as_str()));
        g
    }
}
