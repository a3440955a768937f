//! Mock transport for testing without network access.
//!
//! Responses are registered per verb and method path. Query and form
//! parameters are recorded but not matched, so one registration serves
//! every parameterisation of an endpoint.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{PoliceError, Result};

use super::{Transport, Verb};

/// A canned reply.
#[derive(Debug, Clone)]
enum MockResponse {
    Json(Value),
    Status { status: u16, message: String },
}

/// A request the mock has received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub verb: Verb,
    pub method: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Value of a recorded parameter, if sent.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Transport serving registered responses and recording every request.
///
/// When several responses are queued for one endpoint they are served in
/// order; the last one then repeats.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<(Verb, String), VecDeque<MockResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `verb method` with a JSON body.
    pub fn respond(&self, verb: Verb, method: &str, body: Value) -> &Self {
        self.push(verb, method, MockResponse::Json(body))
    }

    /// Reply to `verb method` with an error status.
    pub fn fail(&self, verb: Verb, method: &str, status: u16) -> &Self {
        self.push(
            verb,
            method,
            MockResponse::Status {
                status,
                message: format!("mock status {status}"),
            },
        )
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of requests received for one method path.
    pub fn requests_to(&self, method: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    fn push(&self, verb: Verb, method: &str, response: MockResponse) -> &Self {
        lock(&self.responses)
            .entry((verb, method.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    fn next_response(&self, verb: Verb, method: &str) -> Option<MockResponse> {
        let mut responses = lock(&self.responses);
        let queue = responses.get_mut(&(verb, method.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, verb: Verb, method: &str, params: &[(&str, String)]) -> Result<Value> {
        lock(&self.requests).push(RecordedRequest {
            verb,
            method: method.to_string(),
            params: params
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        });

        match self.next_response(verb, method) {
            Some(MockResponse::Json(body)) => Ok(body),
            Some(MockResponse::Status { status, message }) => Err(PoliceError::Api {
                status,
                message,
                method: method.to_string(),
            }),
            None => Err(PoliceError::Unmocked {
                verb: verb.to_string(),
                method: method.to_string(),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn serves_registered_response() {
        let mock = MockTransport::new();
        mock.respond(Verb::Get, "forces", json!([{"id": "a", "name": "A"}]));

        let body = mock
            .request(Verb::Get, "forces", &[("date", "2013-01".to_string())])
            .await
            .unwrap();

        assert_eq!(body, json!([{"id": "a", "name": "A"}]));
        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.last_request().unwrap().param("date"), Some("2013-01"));
    }

    #[tokio::test]
    async fn verb_is_part_of_the_key() {
        let mock = MockTransport::new();
        mock.respond(Verb::Post, "crimes-street/all-crime", json!([]));

        let result = mock.request(Verb::Get, "crimes-street/all-crime", &[]).await;

        assert!(matches!(result, Err(PoliceError::Unmocked { .. })));
    }

    #[tokio::test]
    async fn queued_responses_are_served_in_order() {
        let mock = MockTransport::new();
        mock.fail(Verb::Get, "forces/x", 503)
            .respond(Verb::Get, "forces/x", json!({"name": "X"}));

        let first = mock.request(Verb::Get, "forces/x", &[]).await;
        assert!(matches!(first, Err(PoliceError::Api { status: 503, .. })));

        let second = mock.request(Verb::Get, "forces/x", &[]).await.unwrap();
        let third = mock.request(Verb::Get, "forces/x", &[]).await.unwrap();
        assert_eq!(second, third);
        assert_eq!(mock.requests_to("forces/x"), 3);
    }
}
