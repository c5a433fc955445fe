//! Compilation of [`QueryState`] into query-DSL documents.
//!
//! Compilation is deterministic: the same state always yields the same
//! document, clause arrays keep insertion order, and nothing is
//! deduplicated or reordered.
//!
//! # Shapes
//!
//! | Clauses | `query` member |
//! |---------|----------------|
//! | none | `inner` |
//! | one filter, nothing else | `{"filtered": {"query": inner, "filter": clause}}` |
//! | otherwise | `{"filtered": {"query": inner, "filter": {"bool": {...}}}}` |
//!
//! where `inner` is `match_all`, or `query_string` once a free-text term
//! is set.

use std::collections::BTreeMap;

use elasto_core::{Error, Result};
use serde_json::{json, Map, Value};

use crate::aggregation::Aggregation;
use crate::clause::Clause;
use crate::state::QueryState;

/// Field matched by autocomplete.
pub const AUTOCOMPLETE_FIELD: &str = "name";

/// Markup inserted before a highlighted fragment.
pub const HIGHLIGHT_PRE_TAG: &str = "<strong>";

/// Markup inserted after a highlighted fragment.
pub const HIGHLIGHT_POST_TAG: &str = "</strong>";

/// Terminal operation a document is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// Full search body.
    Search,
    /// Query member only.
    Count,
    /// Delete-by-query over the `Term` filters.
    Remove,
}

/// Compile `state` for `mode`, after validating it.
pub fn compile(state: &QueryState, mode: CompileMode) -> Result<Value> {
    state.validate()?;
    match mode {
        CompileMode::Search => Ok(compile_search(state)),
        CompileMode::Count => Ok(compile_count(state)),
        CompileMode::Remove => compile_remove(state),
    }
}

/// The `query` member shared by search and count.
pub fn compile_query(state: &QueryState) -> Value {
    let inner = match &state.free_text {
        Some(text) => json!({ "query_string": { "query": text } }),
        None => json!({ "match_all": {} }),
    };

    if !state.has_clauses() {
        return inner;
    }

    let filter = match (
        state.filters.as_slice(),
        state.excludes.is_empty(),
        state.alternatives.is_empty(),
    ) {
        ([only], true, true) => only.to_json(),
        _ => bool_filter(state),
    };

    json!({ "filtered": { "query": inner, "filter": filter } })
}

fn bool_filter(state: &QueryState) -> Value {
    let mut body = Map::new();
    for (key, clauses) in [
        ("must", &state.filters),
        ("must_not", &state.excludes),
        ("should", &state.alternatives),
    ] {
        if !clauses.is_empty() {
            body.insert(key.to_string(), clause_array(clauses));
        }
    }
    json!({ "bool": body })
}

fn clause_array(clauses: &[Clause]) -> Value {
    Value::Array(clauses.iter().map(Clause::to_json).collect())
}

/// Full search body: query, projection, sort, window, aggregations.
pub fn compile_search(state: &QueryState) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), compile_query(state));

    if state.is_projected() {
        body.insert("fields".to_string(), json!(state.projected_fields));
    }
    if !state.sort_keys.is_empty() {
        let sort = state.sort_keys.iter().map(|s| s.to_json()).collect();
        body.insert("sort".to_string(), Value::Array(sort));
    }
    if let Some(size) = state.window_size {
        body.insert("size".to_string(), json!(size));
    }
    if let Some(from) = state.window_offset {
        body.insert("from".to_string(), json!(from));
    }
    if !state.aggregations.is_empty() {
        body.insert(
            "aggregations".to_string(),
            render(&state.aggregations, Aggregation::to_aggregation_json),
        );
    }
    if !state.facets.is_empty() {
        body.insert(
            "facets".to_string(),
            render(&state.facets, Aggregation::to_facet_json),
        );
    }
    if !state.script_fields.is_empty() {
        let scripts = state
            .script_fields
            .iter()
            .map(|(name, script)| (name.clone(), script.to_json()))
            .collect();
        body.insert("script_fields".to_string(), Value::Object(scripts));
    }

    Value::Object(body)
}

fn render(named: &BTreeMap<String, Aggregation>, to_json: fn(&Aggregation) -> Value) -> Value {
    Value::Object(
        named
            .iter()
            .map(|(name, agg)| (name.clone(), to_json(agg)))
            .collect(),
    )
}

/// Count body: the query member only.
pub fn compile_count(state: &QueryState) -> Value {
    json!({ "query": compile_query(state) })
}

/// Delete-by-query body built strictly from the `Term` filters.
///
/// # Errors
///
/// Returns [`Error::Validation`] when there is no `Term` filter, or when
/// the state carries anything a term-only delete cannot express: other
/// filter clauses, exclusions, alternatives or free text. Either way the
/// delete would match more than the same query's search, so this fails
/// closed.
pub fn compile_remove(state: &QueryState) -> Result<Value> {
    if !state.excludes.is_empty() {
        return Err(Error::validation("refusing to remove with exclusions"));
    }
    if !state.alternatives.is_empty() {
        return Err(Error::validation("refusing to remove with or() alternatives"));
    }
    if state.free_text.is_some() {
        return Err(Error::validation("refusing to remove with a free-text term"));
    }

    let mut terms = Map::new();
    for clause in &state.filters {
        match clause {
            Clause::Term { field, value } => {
                terms.insert(field.clone(), value.clone());
            }
            other => {
                return Err(Error::validation_field(
                    other.field(),
                    "refusing to remove with a filter other than an exact term",
                ));
            }
        }
    }

    if terms.is_empty() {
        return Err(Error::validation(
            "refusing to remove without at least one term filter",
        ));
    }

    let query = if terms.len() == 1 {
        json!({ "term": terms })
    } else {
        let must: Vec<Value> = terms
            .into_iter()
            .map(|(field, value)| {
                let mut term = Map::new();
                term.insert(field, value);
                json!({ "term": term })
            })
            .collect();
        json!({ "bool": { "must": must } })
    };

    Ok(json!({ "query": query }))
}

/// Fixed autocomplete body: a match on the name field with highlighting.
pub fn compile_autocomplete(text: &str) -> Value {
    let mut field = Map::new();
    field.insert(AUTOCOMPLETE_FIELD.to_string(), json!(text));
    let mut highlighted = Map::new();
    highlighted.insert(AUTOCOMPLETE_FIELD.to_string(), json!({}));

    json!({
        "query": { "match": field },
        "highlight": {
            "pre_tags": [HIGHLIGHT_PRE_TAG],
            "post_tags": [HIGHLIGHT_POST_TAG],
            "fields": highlighted
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
