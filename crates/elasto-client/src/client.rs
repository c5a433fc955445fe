//! The Elasto client facade.
//!
//! [`Elasto`] owns a configuration and a transport. It hands out query
//! builders bound to a resource and covers the single-document operations
//! that are not queries: fetch by id, count, and save.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use elasto_core::{ElastoConfig, Error, Method, Request, ResourceHandle, Result, Transport};
use elasto_query::{Document, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpTransport;

/// How the engine compares a supplied document version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    /// The version must equal the stored one.
    #[default]
    Internal,
    /// The version must be greater than the stored one.
    External,
    /// The version must be greater than or equal to the stored one.
    ExternalGte,
}

impl VersionType {
    /// Name used in the `version_type` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionType::Internal => "internal",
            VersionType::External => "external",
            VersionType::ExternalGte => "external_gte",
        }
    }
}

/// Optimistic concurrency control for [`Elasto::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersion {
    /// Version number.
    pub number: u64,
    /// Comparison rule.
    #[serde(default)]
    pub kind: VersionType,
}

impl DocumentVersion {
    /// Internal versioning: the save succeeds only if `number` is current.
    pub fn internal(number: u64) -> Self {
        Self {
            number,
            kind: VersionType::Internal,
        }
    }

    /// External versioning: the save succeeds only if `number` is newer.
    pub fn external(number: u64) -> Self {
        Self {
            number,
            kind: VersionType::External,
        }
    }

    fn query_string(&self) -> String {
        format!("version={}&version_type={}", self.number, self.kind.as_str())
    }
}

/// Engine acknowledgement of a saved document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDocument {
    /// Document id.
    pub id: String,
    /// Version after the save, when reported.
    pub version: Option<u64>,
    /// Whether the document was created rather than replaced, when reported.
    pub created: Option<bool>,
}

/// Client bound to one engine.
#[derive(Clone)]
pub struct Elasto {
    config: ElastoConfig,
    transport: Arc<dyn Transport>,
}

impl Elasto {
    /// Connect over HTTP to the configured host.
    ///
    /// No request is made until the first operation.
    pub fn connect(config: ElastoConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        log::info!("Elasto client for {}", transport.base_url());
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Load configuration from a TOML file (plus environment overrides)
    /// and connect.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(ElastoConfig::load(path)?)
    }

    /// Use an explicit transport.
    pub fn with_transport(config: ElastoConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Client configuration.
    pub fn config(&self) -> &ElastoConfig {
        &self.config
    }

    /// Underlying transport.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Start a query against `resource`.
    pub fn query(&self, resource: impl Into<ResourceHandle>) -> Query<'_> {
        Query::new(self.transport.as_ref(), resource).with_config(&self.config)
    }

    /// Fetch one document by id.
    pub async fn get(
        &self,
        resource: impl Into<ResourceHandle>,
        id: &str,
    ) -> Result<Option<Document>> {
        self.query(resource).by_id(id).await
    }

    /// Count every document in `resource`.
    pub async fn count(&self, resource: impl Into<ResourceHandle>) -> Result<u64> {
        self.query(resource).count().await
    }

    /// Store `document` under `id`, replacing any existing document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the resource, id, or document is
    /// unusable, and [`Error::Engine`] with status 409 on a version conflict.
    pub async fn save<T: Serialize + ?Sized>(
        &self,
        resource: impl Into<ResourceHandle>,
        id: &str,
        document: &T,
        version: Option<DocumentVersion>,
    ) -> Result<SavedDocument> {
        let resource = resource.into();
        if !resource.is_valid() {
            return Err(Error::validation_field("index", "no index specified"));
        }
        let mut path = resource.document_path(id)?;

        let body = serde_json::to_value(document)
            .map_err(|e| Error::validation_field("document", e.to_string()))?;
        if !body.is_object() {
            return Err(Error::validation_field(
                "document",
                "document must serialize to a JSON object",
            ));
        }

        if let Some(version) = version {
            path = format!("{path}?{}", version.query_string());
        }
        let request = Request::new(Method::Put, path).with_body(body);
        log::debug!("{request}");

        let reply = self.transport.execute(request).await?.into_json()?;
        let saved = saved_document(id, &reply);
        log::info!(
            "Saved document {} in {resource} (version {:?})",
            saved.id,
            saved.version
        );
        Ok(saved)
    }
}

fn saved_document(id: &str, reply: &Value) -> SavedDocument {
    let created = reply
        .get("created")
        .and_then(Value::as_bool)
        .or_else(|| match reply.get("result").and_then(Value::as_str) {
            Some("created") => Some(true),
            Some("updated") => Some(false),
            _ => None,
        });
    SavedDocument {
        id: reply
            .get("_id")
            .and_then(Value::as_str)
            .unwrap_or(id)
            .to_string(),
        version: reply.get("_version").and_then(Value::as_u64),
        created,
    }
}

impl fmt::Debug for Elasto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elasto")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
