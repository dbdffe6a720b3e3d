//! Mock implementations for testing.
//!
//! Provides a mock HTTP transport that records requests and replays queued
//! responses, so the client can be exercised without calling Mandrill.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Mock HTTP transport for testing.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<Vec<Result<MockResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self {
            status: 200,
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// Creates a Mandrill error response.
    pub fn error(name: &str, message: &str) -> Self {
        let error = serde_json::json!({
            "status": "error",
            "code": -1,
            "name": name,
            "message": message,
        });

        Self {
            status: 500,
            body: serde_json::to_vec(&error).unwrap_or_default(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        lock(&self.responses).push(Ok(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues a connection failure.
    pub fn queue_connection_error(&self, message: &str) {
        lock(&self.responses).push(Err(message.to_string()));
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Gets the body of the last request as JSON.
    pub fn last_body(&self) -> Option<serde_json::Value> {
        lock(&self.requests)
            .last()
            .and_then(|r| serde_json::from_slice(&r.body).ok())
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request);

        let next = {
            let mut responses = lock(&self.responses);
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };

        match next {
            Some(Ok(response)) => Ok(HttpResponse {
                status: response.status,
                body: response.body,
            }),
            Some(Err(message)) => Err(TransportError::Connection { message }),
            None => Err(TransportError::InvalidResponse {
                message: "No mock response configured".to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}

/// Test fixtures for common response types.
pub mod fixtures {
    use crate::types::{SendResponseEntry, SendStatus};

    /// One response entry per `(email, status)` pair, with sequential IDs.
    pub fn send_response(entries: &[(&str, SendStatus)]) -> Vec<SendResponseEntry> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (email, status))| SendResponseEntry {
                email: (*email).to_string(),
                status: status.clone(),
                reject_reason: None,
                id: Some(format!("fake-id-{}", i + 1)),
            })
            .collect()
    }
}
