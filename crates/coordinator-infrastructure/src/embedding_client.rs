//! `EmbeddingClient` adapter: a JSON-over-HTTP embedding service.
//!
//! The wire protocol is intentionally minimal and provider-agnostic: `POST
//! {base_url}/embeddings` with `{"input": "<text>"}`, expecting back
//! `{"embedding": [f32, ...]}`. A local on-device library or a hosted API
//! both fit behind this same shape; only the base URL and bearer token
//! differ.

use std::time::Duration;

use async_trait::async_trait;
use coordinator_domain::constants::EMBEDDING_TIMEOUT_SECS;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::embedding::EmbeddingClient;
use serde::{Deserialize, Serialize};

use crate::retry::{with_retry, RetryPolicy};

const SERVICE_NAME: &str = "embedding";

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embeds text by calling a configured HTTP embedding service.
pub struct HttpEmbeddingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    dimensions: usize,
    retry_policy: RetryPolicy,
}

impl HttpEmbeddingClient {
    /// Build a client targeting `base_url`, with the given known output
    /// dimensionality and an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, dimensions: usize) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(EMBEDDING_TIMEOUT_SECS))
            .build()
            .map_err(|err| Error::internal(format!("building embedding HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            dimensions,
            retry_policy: RetryPolicy::default(),
        })
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let mut request = self.http.post(&url).json(&EmbedRequest { input: text });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                Error::transient(SERVICE_NAME, err.to_string())
            } else {
                Error::upstream_unavailable(SERVICE_NAME, err.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return if status.is_server_error() {
                Err(Error::transient(SERVICE_NAME, format!("{status}: {body}")))
            } else {
                Err(Error::upstream_unavailable(SERVICE_NAME, format!("{status}: {body}")))
            };
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|err| Error::upstream_unavailable(SERVICE_NAME, format!("malformed response: {err}")))?;
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        with_retry(self.retry_policy, SERVICE_NAME, || self.embed_once(text)).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_reports_the_configured_value() {
        let client = HttpEmbeddingClient::new("http://localhost:9000", None, 768).unwrap();
        assert_eq!(client.dimensions(), 768);
    }
}
