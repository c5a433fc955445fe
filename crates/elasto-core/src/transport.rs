//! Transport seam between the query layer and the engine.
//!
//! The query layer never opens connections itself. It hands a [`Request`]
//! to a [`Transport`] and gets back a [`Response`] carrying the raw status
//! and body. Turning that response into JSON, and translating engine
//! failures into typed errors, happens in [`Response::into_json`].
//!
//! # Implementations
//!
//! - `HttpTransport` (in `elasto-client`): reqwest over HTTP
//! - [`MockTransport`](crate::mock::MockTransport): recorded requests and
//!   queued responses for tests

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// HTTP verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Verb as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// HTTP verb.
    pub method: Method,
    /// Path relative to the engine base URL, query string included.
    pub path: String,
    /// JSON body, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Request {
    /// Create a request without a body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method, self.path.trim_start_matches('/'))
    }
}

/// Raw engine response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Unparsed response body.
    pub body: String,
}

impl Response {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create a response from a JSON value.
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the engine reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Error message reported by the engine.
    ///
    /// Engines report `{"error": "..."}` or `{"error": {"reason": "..."}}`;
    /// anything else falls back to the raw body.
    pub fn error_message(&self) -> String {
        let Ok(value) = serde_json::from_str::<Value>(&self.body) else {
            return self.body.trim().to_string();
        };
        match value.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(error @ Value::Object(_)) => error
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
            Some(other) => other.to_string(),
            None => self.body.trim().to_string(),
        }
    }

    /// Check the status and parse the body.
    ///
    /// # Errors
    ///
    /// - [`Error::Engine`] for any non-2xx status, carrying the engine's message
    /// - [`Error::Parse`] when a 2xx body is not valid JSON
    pub fn into_json(self) -> Result<Value> {
        if !self.is_success() {
            let message = self.error_message();
            log::warn!("Engine rejected request (HTTP {}): {message}", self.status);
            return Err(Error::engine(self.status, message));
        }
        serde_json::from_str(&self.body)
            .map_err(|e| Error::parse_json("response body is not valid JSON", e))
    }
}

/// Executes requests against the engine.
///
/// One call is one round trip. Implementations must not retry, batch or
/// coalesce requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the engine's raw response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when no response was received. Non-2xx
    /// statuses are not errors at this level.
    async fn execute(&self, request: Request) -> Result<Response>;

    /// Get the transport name for diagnostics.
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
