//! Target collection of a query.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An index plus an optional document type.
///
/// Engines without typed documents leave `doc_type` unset; request paths
/// then skip the type segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    index: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    doc_type: Option<String>,
}

impl ResourceHandle {
    /// A resource naming only an index.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: None,
        }
    }

    /// Bind a document type.
    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Document type, if any.
    pub fn doc_type(&self) -> Option<&str> {
        self.doc_type.as_deref()
    }

    /// Whether an index is actually named.
    pub fn is_valid(&self) -> bool {
        !self.index.trim().is_empty()
    }

    /// Request path for `endpoint` under this resource, e.g. `tweets/tweet/_search`.
    pub fn path(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        match &self.doc_type {
            Some(doc_type) => format!("{}/{}/{}", self.index, doc_type, endpoint),
            None => format!("{}/{}", self.index, endpoint),
        }
    }

    /// Request path for the document `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, or one containing `/`,
    /// `?` or `#`, which would address a different endpoint.
    pub fn document_path(&self, id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(Error::validation_field("id", "document id must not be empty"));
        }
        if id.contains(['/', '?', '#']) {
            return Err(Error::validation_field(
                "id",
                format!("document id {id:?} contains a reserved character"),
            ));
        }
        Ok(self.path(id))
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.doc_type {
            Some(doc_type) => write!(f, "{}/{}", self.index, doc_type),
            None => write!(f, "{}", self.index),
        }
    }
}

impl From<&str> for ResourceHandle {
    fn from(index: &str) -> Self {
        Self::new(index)
    }
}

impl From<String> for ResourceHandle {
    fn from(index: String) -> Self {
        Self::new(index)
    }
}

impl<I: Into<String>, T: Into<String>> From<(I, T)> for ResourceHandle {
    fn from((index, doc_type): (I, T)) -> Self {
        Self::new(index).with_type(doc_type)
    }
}
