//! In-memory transport for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::transport::{Request, Response, Transport};

/// Transport that records every request and replays queued responses.
///
/// Responses are returned in the order they were queued. When the queue is
/// empty, `execute` fails with a transport error, which makes unexpected
/// requests visible in tests.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// Create a mock with no queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock answering one request with `status` and a JSON body.
    pub fn with_json(status: u16, body: Value) -> Self {
        let mock = Self::new();
        mock.push_json(status, body);
        mock
    }

    /// Queue a raw response.
    pub fn push_response(&self, response: Response) {
        self.lock_responses().push_back(Ok(response));
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: Value) {
        self.push_response(Response::json(status, &body));
    }

    /// Queue a transport failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock_responses()
            .push_back(Err(Error::transport(message)));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.lock_requests().clone()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.lock_requests().last().cloned()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.lock_requests().len()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Response>>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<Request>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        log::debug!("MockTransport: {request}");
        self.lock_requests().push(request);
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("no response queued")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
