//! Typed execution of rendered queries against a [`DataSource`].

use std::sync::Arc;

use log::debug;

use super::errors::QueryError;
use super::{NormalizedQuery, Query};
use crate::model::{Graph, ResultTable};
use crate::proxy::{Materializer, Proxy, ProxyAwareList};
use crate::query_parser::{Projection, QueryForm};
use crate::source::DataSource;

fn form_name(form: QueryForm) -> &'static str {
    match form {
        QueryForm::Select => "select",
        QueryForm::Construct => "construct",
        QueryForm::Ask => "ask",
        QueryForm::Describe => "describe",
    }
}

fn render_expecting(query: &Query, expected: &[QueryForm]) -> Result<NormalizedQuery, QueryError> {
    let rendered = query.render()?;
    if !expected.contains(&rendered.parsed.form) {
        return Err(QueryError::WrongQueryType {
            expected: form_name(expected[0]),
            actual: form_name(rendered.parsed.form),
        });
    }
    debug!("executing against `{}` source: {}", query.dialect(), rendered.text);
    Ok(rendered)
}

/// Run a select query and wrap every binding of the projected variable in a
/// deferred proxy. Nothing is materialized until an element is read.
///
/// The projected variable is the first one the query names, or the query's
/// projection variable for `select *` and fragments. Rows leaving it unbound
/// are skipped; rows binding it to a literal fail with
/// [`QueryError::NonEntityBinding`].
pub fn select_entities<T>(
    source: &Arc<dyn DataSource>,
    query: &Query,
    materializer: Arc<dyn Materializer<T>>,
) -> Result<ProxyAwareList<T>, QueryError> {
    let rendered = render_expecting(query, &[QueryForm::Select])?;
    let variable = match &rendered.parsed.projection {
        Projection::Variables(vars) if !vars.is_empty() => vars[0].clone(),
        _ => query
            .projection_variable()
            .trim_start_matches(['?', '$'])
            .to_string(),
    };

    let table = source.select_query(&rendered.text)?;
    let mut list = ProxyAwareList::with_capacity(table.len());
    for value in table.column(&variable) {
        let id = value
            .as_identifier()
            .ok_or_else(|| QueryError::NonEntityBinding {
                variable: variable.clone(),
                value: value.to_string(),
            })?;
        list.push_proxy(Proxy::new(id, Arc::clone(source), Arc::clone(&materializer)));
    }
    Ok(list)
}

pub fn select_rows(source: &dyn DataSource, query: &Query) -> Result<ResultTable, QueryError> {
    let rendered = render_expecting(query, &[QueryForm::Select])?;
    Ok(source.select_query(&rendered.text)?)
}

pub fn construct_graph(source: &dyn DataSource, query: &Query) -> Result<Graph, QueryError> {
    let rendered = render_expecting(query, &[QueryForm::Construct, QueryForm::Describe])?;
    Ok(source.graph_query(&rendered.text)?)
}

pub fn ask(source: &dyn DataSource, query: &Query) -> Result<bool, QueryError> {
    let rendered = render_expecting(query, &[QueryForm::Ask])?;
    Ok(source.ask(&rendered.text)?)
}
