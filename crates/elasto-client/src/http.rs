//! reqwest-backed [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use elasto_core::{ElastoConfig, Error, Method, Request, Response, Result, Transport};

/// Sends requests to an engine over HTTP.
///
/// Requests carry JSON bodies; responses are handed back with their status
/// and raw body so the query layer decides what a failure means.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for the configured host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration and
    /// [`Error::Transport`] when the HTTP client cannot be built.
    pub fn new(config: &ElastoConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::transport_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a request path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(http_method(request.method), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            Error::transport_with_source(format!("{} {url} failed", request.method), e)
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            Error::transport_with_source(format!("reading response from {url} failed"), e)
        })?;

        log::debug!("{} {url} -> {status}", request.method);
        Ok(Response::new(status, body))
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// Tests
// ============================================================================
