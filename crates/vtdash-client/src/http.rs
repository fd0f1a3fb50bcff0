//! HTTP-backed `ApiClient`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{decode_response, ApiClient};
use crate::error::FetchError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::network(format!("build http client: {err}")))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn get(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("");
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), status_text));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::network(format!("read body: {err}")))?;
        decode_response(status.as_u16(), status_text, &body)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch(&self, endpoint: &str) -> Result<Value, FetchError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "fetch");
        let result = self.get(&url).await;
        if let Err(err) = &result {
            tracing::warn!(endpoint, error = %err, "fetch failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::HttpApiClient;

    #[test]
    fn url_joins_without_duplicate_slashes() {
        let client = HttpApiClient::new("http://localhost:14200/api/").unwrap();
        assert_eq!(
            client.url("/clusters"),
            "http://localhost:14200/api/clusters"
        );
        let client = HttpApiClient::new("http://localhost:14200/api").unwrap();
        assert_eq!(
            client.url("/vschema/c1/ks"),
            "http://localhost:14200/api/vschema/c1/ks"
        );
    }
}
