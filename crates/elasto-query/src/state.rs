//! Accumulated query intent.
//!
//! `QueryState` is the intermediate representation the compiler reads. It
//! is owned by exactly one builder and mutated only through the methods
//! below. Methods never fail: invalid input is recorded as a [`Problem`]
//! and reported by [`QueryState::validate`] before compilation.

use std::collections::BTreeMap;

use elasto_core::{Error, Result};
use serde_json::Value;

use crate::aggregation::{Aggregation, ScriptField};
use crate::clause::Clause;
use crate::condition::Condition;
use crate::geo::{GeoPoint, Near, DEFAULT_RADIUS_MILES};
use crate::sort::{SortInput, SortOrder, SortSpec};

/// Default geo-point field.
pub const DEFAULT_GEO_FIELD: &str = "location";

/// A deferred validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// Field or argument at fault, if known.
    pub field: Option<String>,
    /// What went wrong.
    pub message: String,
}

impl Problem {
    fn into_error(self) -> Error {
        match self.field {
            Some(field) => Error::validation_field(field, self.message),
            None => Error::validation(self.message),
        }
    }
}

/// Everything a builder has been told so far.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    /// Conjunctive predicates (`must`).
    pub filters: Vec<Clause>,
    /// Negated predicates (`must_not`).
    pub excludes: Vec<Clause>,
    /// Disjunctive predicates (`should`).
    pub alternatives: Vec<Clause>,
    /// Requested fields, in first-requested order; empty means whole documents.
    pub projected_fields: Vec<String>,
    /// Sort keys, primary first.
    pub sort_keys: Vec<SortSpec>,
    /// Result window size.
    pub window_size: Option<u64>,
    /// Result window offset.
    pub window_offset: Option<u64>,
    /// Full-text query string.
    pub free_text: Option<String>,
    /// Origin set by `near`.
    pub location: Option<GeoPoint>,
    /// Named aggregations.
    pub aggregations: BTreeMap<String, Aggregation>,
    /// Named legacy facets.
    pub facets: BTreeMap<String, Aggregation>,
    /// Named computed fields.
    pub script_fields: BTreeMap<String, ScriptField>,
    /// Geo-point field used by geo clauses and sorts.
    pub geo_field: String,
    /// Radius used by `near` when none is given.
    pub default_radius_miles: f64,
    problems: Vec<Problem>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            excludes: Vec::new(),
            alternatives: Vec::new(),
            projected_fields: Vec::new(),
            sort_keys: Vec::new(),
            window_size: None,
            window_offset: None,
            free_text: None,
            location: None,
            aggregations: BTreeMap::new(),
            facets: BTreeMap::new(),
            script_fields: BTreeMap::new(),
            geo_field: DEFAULT_GEO_FIELD.to_string(),
            default_radius_miles: DEFAULT_RADIUS_MILES,
            problems: Vec::new(),
        }
    }
}

impl QueryState {
    /// Fresh state with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------------

    /// Add conjunctive clauses.
    pub fn filter(&mut self, condition: Condition) {
        match condition.into_clauses() {
            Ok(clauses) => self.filters.extend(clauses),
            Err(e) => self.record(e),
        }
    }

    /// Add a negated equality clause.
    pub fn exclude(&mut self, field: impl Into<String>, value: Value) {
        self.excludes.push(Clause::Term {
            field: field.into(),
            value,
        });
    }

    /// Add disjunctive clauses.
    pub fn or(&mut self, condition: Condition) {
        match condition.into_clauses() {
            Ok(clauses) => self.alternatives.extend(clauses),
            Err(e) => self.record(e),
        }
    }

    /// Add an inclusive range clause.
    pub fn range(&mut self, field: impl Into<String>, gte: Value, lte: Value) {
        self.filters.push(Clause::Range {
            field: field.into(),
            gte,
            lte,
        });
    }

    /// Set the full-text query string.
    pub fn term(&mut self, text: impl Into<String>) {
        self.free_text = Some(text.into());
    }

    // ------------------------------------------------------------------------
    // Geo
    // ------------------------------------------------------------------------

    /// Add a radius filter and remember the origin.
    pub fn near(&mut self, near: Near) {
        match near.resolve(self.default_radius_miles) {
            Ok((origin, radius_miles)) => {
                self.location = Some(origin);
                self.filters.push(Clause::GeoDistance {
                    field: self.geo_field.clone(),
                    origin,
                    radius_miles,
                });
            }
            Err(e) => self.record(e),
        }
    }

    /// Add a distance ring filter around `origin`, or the stored location.
    pub fn distance_range(&mut self, origin: Option<GeoPoint>, from_miles: f64, to_miles: f64) {
        let Some(origin) = self.resolve_origin(origin, "distance_range") else {
            return;
        };
        let finite = from_miles.is_finite() && to_miles.is_finite();
        if !finite || from_miles < 0.0 || to_miles < from_miles {
            self.problem(
                Some("distance"),
                format!("invalid distance range {from_miles}..{to_miles}"),
            );
            return;
        }
        self.filters.push(Clause::GeoDistanceRange {
            field: self.geo_field.clone(),
            origin,
            from_miles,
            to_miles,
        });
    }

    // ------------------------------------------------------------------------
    // Projection, sorting, window
    // ------------------------------------------------------------------------

    /// Request fields; repeated names are kept once.
    pub fn fields<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            let key = key.into();
            if !self.projected_fields.contains(&key) {
                self.projected_fields.push(key);
            }
        }
    }

    /// Append a sort key.
    pub fn sort(&mut self, input: SortInput) {
        let spec = match input {
            SortInput::Key(name) => SortSpec::Bare { name },
            SortInput::Field(field, order) => SortSpec::FieldOrder { field, order },
            SortInput::Distance { origin, order } => {
                let Some(origin) = self.resolve_origin(origin, "sort by distance") else {
                    return;
                };
                SortSpec::geo(&self.geo_field, origin, order)
            }
        };
        self.sort_keys.push(spec);
    }

    /// Append a distance sort from an explicit origin.
    pub fn sort_by_distance(&mut self, origin: GeoPoint, order: SortOrder) {
        self.sort(SortInput::Distance {
            origin: Some(origin),
            order,
        });
    }

    /// Set the window size.
    pub fn size(&mut self, size: u64) {
        self.window_size = Some(size);
    }

    /// Set the window offset.
    pub fn from(&mut self, offset: u64) {
        self.window_offset = Some(offset);
    }

    // ------------------------------------------------------------------------
    // Aggregations and computed fields
    // ------------------------------------------------------------------------

    /// Add or replace a named aggregation.
    pub fn aggregate(&mut self, name: impl Into<String>, aggregation: Aggregation) {
        self.aggregations.insert(name.into(), aggregation);
    }

    /// Add or replace a named legacy facet.
    pub fn facet(&mut self, name: impl Into<String>, aggregation: Aggregation) {
        self.facets.insert(name.into(), aggregation);
    }

    /// Add or replace a named computed field.
    pub fn script_field(&mut self, name: impl Into<String>, script: ScriptField) {
        self.script_fields.insert(name.into(), script);
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Record a validation failure to be reported at the terminal call.
    pub fn problem(&mut self, field: Option<&str>, message: impl Into<String>) {
        self.problems.push(Problem {
            field: field.map(str::to_string),
            message: message.into(),
        });
    }

    /// Recorded failures, oldest first.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Fail with the first recorded problem, if any.
    pub fn validate(&self) -> Result<()> {
        match self.problems.first() {
            Some(problem) => Err(problem.clone().into_error()),
            None => Ok(()),
        }
    }

    /// Whether any filter, exclusion or alternative is present.
    pub fn has_clauses(&self) -> bool {
        !(self.filters.is_empty() && self.excludes.is_empty() && self.alternatives.is_empty())
    }

    /// Whether field projection is active.
    pub fn is_projected(&self) -> bool {
        !self.projected_fields.is_empty()
    }

    fn resolve_origin(&mut self, inline: Option<GeoPoint>, what: &str) -> Option<GeoPoint> {
        let origin = inline.or(self.location);
        if origin.is_none() {
            self.problem(
                Some("location"),
                format!("{what} needs coordinates: call near() first or pass an origin"),
            );
        }
        origin
    }

    fn record(&mut self, error: Error) {
        match error {
            Error::Validation { field, message } => self.problems.push(Problem { field, message }),
            other => self.problem(None, other.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
