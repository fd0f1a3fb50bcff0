//! Mock API client for unit testing.
//!
//! Serves canned responses per endpoint, optionally after a delay, and
//! records every fetch in call order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{unwrap_envelope, ApiClient};
use crate::error::FetchError;

#[derive(Debug, Clone)]
struct CannedResponse {
    delay: Duration,
    result: Result<Value, FetchError>,
}

/// Responses for one endpoint. Queued responses are served once each; the
/// last one served keeps being repeated.
#[derive(Debug, Default)]
struct Route {
    queued: VecDeque<CannedResponse>,
    last: Option<CannedResponse>,
}

impl Route {
    fn next(&mut self) -> Option<CannedResponse> {
        if let Some(next) = self.queued.pop_front() {
            self.last = Some(next.clone());
            return Some(next);
        }
        self.last.clone()
    }
}

/// Mock implementation of `ApiClient` for testing.
#[derive(Default)]
pub struct MockApiClient {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` (envelope unwrapped, as the HTTP client would) for `endpoint`.
    pub fn with_json(self, endpoint: &str, body: Value) -> Self {
        self.push_json(endpoint, body);
        self
    }

    /// Serve `body` for `endpoint` after `delay`.
    pub fn with_delayed_json(self, endpoint: &str, delay: Duration, body: Value) -> Self {
        self.push(
            endpoint,
            CannedResponse {
                delay,
                result: Ok(unwrap_envelope(body)),
            },
        );
        self
    }

    /// Fail fetches of `endpoint` with `err`.
    pub fn with_error(self, endpoint: &str, err: FetchError) -> Self {
        self.push_error(endpoint, err);
        self
    }

    /// Queue another JSON response for `endpoint` on a shared mock.
    pub fn push_json(&self, endpoint: &str, body: Value) {
        self.push(
            endpoint,
            CannedResponse {
                delay: Duration::ZERO,
                result: Ok(unwrap_envelope(body)),
            },
        );
    }

    /// Queue an error response for `endpoint` on a shared mock.
    pub fn push_error(&self, endpoint: &str, err: FetchError) {
        self.push(
            endpoint,
            CannedResponse {
                delay: Duration::ZERO,
                result: Err(err),
            },
        );
    }

    fn push(&self, endpoint: &str, response: CannedResponse) {
        lock(&self.routes)
            .entry(endpoint.to_string())
            .or_default()
            .queued
            .push_back(response);
    }

    /// Return all recorded endpoints in call order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Number of fetches of `endpoint` so far.
    pub fn call_count(&self, endpoint: &str) -> usize {
        lock(&self.calls).iter().filter(|c| *c == endpoint).count()
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn fetch(&self, endpoint: &str) -> Result<Value, FetchError> {
        lock(&self.calls).push(endpoint.to_string());
        let canned = lock(&self.routes)
            .get_mut(endpoint)
            .and_then(Route::next);
        let Some(canned) = canned else {
            return Err(FetchError::status(404, "Not Found"));
        };
        if !canned.delay.is_zero() {
            tokio::time::sleep(canned.delay).await;
        }
        canned.result
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn unknown_endpoint_is_not_found() {
        let mock = MockApiClient::new();
        let err = mock.fetch("/nowhere").await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(mock.calls(), vec!["/nowhere".to_string()]);
    }

    #[tokio::test]
    async fn queued_responses_are_served_in_order_then_repeat() {
        let mock = MockApiClient::new()
            .with_json("/clusters", json!({"clusters": [{"id": "a"}]}))
            .with_error("/clusters", FetchError::status(500, "Internal Server Error"));

        assert!(mock.fetch("/clusters").await.is_ok());
        assert!(mock.fetch("/clusters").await.is_err());
        assert!(mock.fetch("/clusters").await.is_err());
        assert_eq!(mock.call_count("/clusters"), 3);
    }

    #[tokio::test]
    async fn json_bodies_are_envelope_unwrapped() {
        let mock = MockApiClient::new().with_json("/tablets", json!({"result": {"tablets": []}}));
        let value = mock.fetch("/tablets").await.unwrap();
        assert_eq!(value, json!({"tablets": []}));
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_response_waits() {
        let mock = MockApiClient::new().with_delayed_json(
            "/schemas",
            Duration::from_secs(3),
            json!({"schemas": []}),
        );
        let start = tokio::time::Instant::now();
        let _ = mock.fetch("/schemas").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
