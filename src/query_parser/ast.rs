use crate::model::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Construct,
    Ask,
    Describe,
}

/// IRI as written: full `<...>` or `prefix:local` awaiting expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IriRef {
    Full(String),
    Prefixed { prefix: String, local: String },
}

/// A position in a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    Variable(String),
    Iri(IriRef),
    BlankNode(String),
    Literal {
        lexical: String,
        datatype: Option<IriRef>,
        language: Option<String>,
    },
    /// `[]` in SPARQL, `{}` in SeRQL: matches anything, binds nothing.
    Anonymous,
}

impl PatternTerm {
    /// Concrete term for a resolved, non-variable position.
    pub fn to_term(&self) -> Option<Term> {
        match self {
            PatternTerm::Iri(IriRef::Full(iri)) => Some(Term::iri(iri.clone())),
            PatternTerm::BlankNode(label) => Some(Term::blank(label.clone())),
            PatternTerm::Literal {
                lexical,
                datatype,
                language,
            } => {
                let datatype = match datatype {
                    Some(IriRef::Full(dt)) => Some(dt.clone()),
                    Some(IriRef::Prefixed { .. }) => return None,
                    None => None,
                };
                Some(Term::Literal {
                    lexical: lexical.clone(),
                    datatype,
                    language: language.clone(),
                })
            }
            PatternTerm::Iri(IriRef::Prefixed { .. })
            | PatternTerm::Variable(_)
            | PatternTerm::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternElement {
    Triple(TriplePattern),
    Group(GroupPattern),
    Union(Vec<GroupPattern>),
    Optional(GroupPattern),
    Minus(GroupPattern),
    Graph(PatternTerm, GroupPattern),
    /// Expression text, syntax-checked for balance only.
    Filter(String),
    Bind(String),
    Values(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPattern {
    pub elements: Vec<PatternElement>,
}

impl GroupPattern {
    pub fn triples(patterns: Vec<TriplePattern>) -> Self {
        GroupPattern {
            elements: patterns.into_iter().map(PatternElement::Triple).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    /// Variable names without sigils; `(expr AS ?v)` items contribute `v`.
    Variables(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub form: QueryForm,
    /// Declared prefixes in declaration order, duplicates kept.
    pub prefixes: Vec<(String, String)>,
    pub base: Option<String>,
    pub distinct: bool,
    pub projection: Projection,
    pub template: Vec<TriplePattern>,
    pub describe: Vec<PatternTerm>,
    pub pattern: Option<GroupPattern>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ParsedQuery {
    pub fn new(form: QueryForm) -> Self {
        ParsedQuery {
            form,
            prefixes: Vec::new(),
            base: None,
            distinct: false,
            projection: Projection::All,
            template: Vec::new(),
            describe: Vec::new(),
            pattern: None,
            limit: None,
            offset: None,
        }
    }

    pub fn prefix(&self, prefix: &str) -> Option<&str> {
        // Later declarations win, as in a SPARQL prologue.
        self.prefixes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, iri)| iri.as_str())
    }
}
