//! The fluent query builder.
//!
//! A [`Query`] is bound to one resource and one transport. Configuration
//! methods take and return the builder by value; terminal operations
//! consume it, so a builder can issue at most one request.
//!
//! ```rust,ignore
//! let results = Query::new(&transport, ("testing", "tweets"))
//!     .near(Near::new(51.5, -0.15).radius(5.0))
//!     .sort("distance")
//!     .fields(["name", "address"])
//!     .size(10)
//!     .search()
//!     .await?;
//! ```

use elasto_core::{
    ElastoConfig, Error, Method, Request, ResourceHandle, Response, Result, Transport,
};
use serde_json::Value;

use crate::aggregation::{Aggregation, ScriptField};
use crate::compiler::{self, CompileMode};
use crate::condition::Condition;
use crate::geo::{GeoPoint, Near};
use crate::normalizer::{self, Document, SearchResults};
use crate::sort::{SortInput, SortOrder};
use crate::state::QueryState;

/// Chainable query over one resource.
pub struct Query<'t> {
    transport: &'t dyn Transport,
    resource: ResourceHandle,
    state: QueryState,
}

impl<'t> Query<'t> {
    /// Start a query against `resource` with default settings.
    pub fn new(transport: &'t dyn Transport, resource: impl Into<ResourceHandle>) -> Self {
        Self {
            transport,
            resource: resource.into(),
            state: QueryState::new(),
        }
    }

    /// Take the geo field and default radius from `config`.
    pub fn with_config(mut self, config: &ElastoConfig) -> Self {
        self.state.geo_field = config.geo_field.clone();
        self.state.default_radius_miles = config.default_radius_miles;
        self
    }

    /// Resource the query is bound to.
    pub fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    /// Accumulated state.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    // ------------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------------

    /// Require matches: a `(field, value)` pair, a mapping, or a list of mappings.
    ///
    /// Array values match any of their elements.
    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.state.filter(condition.into());
        self
    }

    /// Reject documents whose `field` equals `value`.
    pub fn exclude(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.exclude(field, value.into());
        self
    }

    /// Add alternatives, of which at least one should match.
    pub fn or(mut self, condition: impl Into<Condition>) -> Self {
        self.state.or(condition.into());
        self
    }

    /// Require `lo <= field <= hi`.
    pub fn range(
        mut self,
        field: impl Into<String>,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
    ) -> Self {
        self.state.range(field, lo.into(), hi.into());
        self
    }

    /// Require a distance between `from` and `to` miles from the `near` origin.
    pub fn distance_range(mut self, from_miles: f64, to_miles: f64) -> Self {
        self.state.distance_range(None, from_miles, to_miles);
        self
    }

    /// Require a distance between `from` and `to` miles from `origin`.
    pub fn distance_range_from(mut self, origin: GeoPoint, from_miles: f64, to_miles: f64) -> Self {
        self.state.distance_range(Some(origin), from_miles, to_miles);
        self
    }

    /// Full-text query string.
    pub fn term(mut self, text: impl Into<String>) -> Self {
        self.state.term(text);
        self
    }

    /// Restrict to a radius around an origin, and remember the origin for
    /// later distance sorts.
    pub fn near(mut self, near: Near) -> Self {
        self.state.near(near);
        self
    }

    // ------------------------------------------------------------------------
    // Projection, sorting, window
    // ------------------------------------------------------------------------

    /// Return only these fields.
    pub fn fields<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.fields(keys);
        self
    }

    /// Sort by a key: `"distance"`, `(field, order)`, or a bare token such as `_score`.
    pub fn sort(mut self, key: impl Into<SortInput>) -> Self {
        self.state.sort(key.into());
        self
    }

    /// Sort by distance from an explicit origin.
    pub fn sort_by_distance(mut self, origin: GeoPoint, order: SortOrder) -> Self {
        self.state.sort_by_distance(origin, order);
        self
    }

    /// Maximum number of documents.
    pub fn size(mut self, size: u64) -> Self {
        self.state.size(size);
        self
    }

    /// Number of documents to skip.
    pub fn from(mut self, offset: u64) -> Self {
        self.state.from(offset);
        self
    }

    // ------------------------------------------------------------------------
    // Aggregations
    // ------------------------------------------------------------------------

    /// Request a named aggregation.
    pub fn aggregate(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.state.aggregate(name, aggregation);
        self
    }

    /// Request a named facet (legacy engines).
    pub fn facet(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.state.facet(name, aggregation);
        self
    }

    /// Request a computed field.
    pub fn script_field(mut self, name: impl Into<String>, script: ScriptField) -> Self {
        self.state.script_field(name, script);
        self
    }

    // ------------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------------

    /// The compiled search document, without sending it.
    pub fn raw(self) -> Result<Value> {
        self.check_resource()?;
        compiler::compile(&self.state, CompileMode::Search)
    }

    /// Run the search and return the engine's response unmodified.
    pub async fn exec(self) -> Result<Value> {
        let body = self.compile(CompileMode::Search)?;
        self.send(Method::Post, self.resource.path("_search"), Some(body))
            .await?
            .into_json()
    }

    /// Run the search and normalize the hits.
    pub async fn search(self) -> Result<SearchResults> {
        let body = self.compile(CompileMode::Search)?;
        let projected = self.state.is_projected();
        let response = self.send(Method::Post, self.resource.path("_search"), Some(body)).await?;
        normalizer::normalize_search(&response.into_json()?, projected)
    }

    /// Count matching documents.
    pub async fn count(self) -> Result<u64> {
        let body = self.compile(CompileMode::Count)?;
        let response = self.send(Method::Post, self.resource.path("_count"), Some(body)).await?;
        normalizer::normalize_count(&response.into_json()?)
    }

    /// Delete every document matching the term filters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`], without contacting the engine, when no
    /// term filter was given.
    pub async fn remove(self) -> Result<Value> {
        let body = match self.compile(CompileMode::Remove) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Refusing remove on {}: {e}", self.resource);
                return Err(e);
            }
        };
        let response = self.send(Method::Delete, self.resource.path("_query"), Some(body)).await?;
        let report = response.into_json()?;
        log::info!("Removed matching documents from {}", self.resource);
        Ok(report)
    }

    /// Prefix-style suggestions on the name field, with highlighting.
    ///
    /// Only the resource is taken from the builder; other configuration
    /// is ignored.
    pub async fn autocomplete(self, text: &str) -> Result<SearchResults> {
        self.check_resource()?;
        let body = compiler::compile_autocomplete(text);
        let response = self.send(Method::Post, self.resource.path("_search"), Some(body)).await?;
        normalizer::normalize_search(&response.into_json()?, false)
    }

    /// Fetch one document by id; `None` when the engine reports it missing.
    pub async fn by_id(self, id: &str) -> Result<Option<Document>> {
        self.check_resource()?;
        let path = self.resource.document_path(id)?;
        let response = self.send(Method::Get, path, None).await?;
        if response.is_not_found() {
            log::debug!("Document {id} not found in {}", self.resource);
            return Ok(None);
        }
        let body = response.into_json()?;
        if body.get("found").and_then(Value::as_bool) == Some(false) {
            return Ok(None);
        }
        normalizer::normalize_document(&body).map(Some)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn check_resource(&self) -> Result<()> {
        if self.resource.is_valid() {
            Ok(())
        } else {
            Err(Error::validation_field("index", "no index specified"))
        }
    }

    fn compile(&self, mode: CompileMode) -> Result<Value> {
        self.check_resource()?;
        compiler::compile(&self.state, mode)
    }

    async fn send(&self, method: Method, path: String, body: Option<Value>) -> Result<Response> {
        let mut request = Request::new(method, path);
        if let Some(body) = body {
            log::debug!("{request} {body}");
            request = request.with_body(body);
        } else {
            log::debug!("{request}");
        }
        self.transport.execute(request).await
    }
}

impl std::fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("transport", &self.transport.name())
            .field("resource", &self.resource)
            .field("state", &self.state)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
