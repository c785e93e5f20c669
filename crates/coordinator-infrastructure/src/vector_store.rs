//! `VectorStore` adapter: a JSON-over-HTTP vector database client, shaped
//! after the common collection/points/search surface (Qdrant and
//! compatible stores expose this same shape).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use coordinator_domain::constants::VECTOR_STORE_TIMEOUT_SECS;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::vector_store::{PayloadFilter, SearchHit, VectorPoint, VectorStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::retry::{with_retry, RetryPolicy};

const SERVICE_NAME: &str = "vector_store";

#[derive(Debug, Serialize)]
struct EnsureCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    points: Vec<WirePoint>,
}

#[derive(Debug, Serialize)]
struct WirePoint {
    id: String,
    vector: Vec<f32>,
    payload: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct DeleteByIdsRequest<'a> {
    points: &'a [String],
}

#[derive(Debug, Serialize)]
struct DeleteByFilterRequest {
    filter: WireFilter,
}

#[derive(Debug, Serialize)]
struct WireFilter {
    must: Vec<FieldCondition>,
}

#[derive(Debug, Serialize)]
struct FieldCondition {
    key: String,
    #[serde(rename = "match")]
    matches: MatchValue,
}

#[derive(Debug, Serialize)]
struct MatchValue {
    value: Value,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<WireSearchHit>,
}

#[derive(Debug, Deserialize)]
struct WireSearchHit {
    id: String,
    score: f32,
    #[serde(default)]
    payload: HashMap<String, Value>,
}

/// Talks to a vector database's HTTP API for collection management, point
/// upsert/delete, and k-NN search.
pub struct HttpVectorStore {
    http: reqwest::Client,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl HttpVectorStore {
    /// Build a client targeting `base_url`, with an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(api_key) = api_key {
            let mut value = reqwest::header::HeaderValue::from_str(&api_key)
                .map_err(|err| Error::internal(format!("invalid vector store API key: {err}")))?;
            value.set_sensitive(true);
            headers.insert("api-key", value);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(VECTOR_STORE_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|err| Error::internal(format!("building vector store HTTP client: {err}")))?;
        Ok(Self { http, base_url: base_url.into(), retry_policy: RetryPolicy::default() })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{collection}", self.base_url.trim_end_matches('/'))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                Error::transient(SERVICE_NAME, err.to_string())
            } else {
                Error::upstream_unavailable(SERVICE_NAME, err.to_string())
            }
        })?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(Error::transient(SERVICE_NAME, format!("{status}: {body}")))
        } else {
            Err(Error::upstream_unavailable(SERVICE_NAME, format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn ensure_collection(&self, collection: &str, dim: usize) -> Result<()> {
        let url = self.collection_url(collection);
        with_retry(self.retry_policy, SERVICE_NAME, || async {
            let body = EnsureCollectionRequest { vectors: VectorParams { size: dim, distance: "Cosine" } };
            let response = self.http.put(&url).json(&body).send().await.map_err(|err| {
                if err.is_timeout() {
                    Error::transient(SERVICE_NAME, err.to_string())
                } else {
                    Error::upstream_unavailable(SERVICE_NAME, err.to_string())
                }
            })?;
            // A 409 means the collection is already there; idempotent either way.
            if response.status().is_success() || response.status() == reqwest::StatusCode::CONFLICT {
                return Ok(());
            }
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                Err(Error::transient(SERVICE_NAME, format!("{status}: {body}")))
            } else {
                Err(Error::upstream_unavailable(SERVICE_NAME, format!("{status}: {body}")))
            }
        })
        .await
    }

    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()> {
        let url = format!("{}/points", self.collection_url(collection));
        let body = UpsertRequest {
            points: points
                .into_iter()
                .map(|point| WirePoint { id: point.id, vector: point.vector, payload: point.payload })
                .collect(),
        };
        with_retry(self.retry_policy, SERVICE_NAME, || async {
            self.send(reqwest::Method::PUT, &url, Some(&body)).await.map(|_| ())
        })
        .await
    }

    async fn delete_by_ids(&self, collection: &str, ids: &[String]) -> Result<()> {
        let url = format!("{}/points/delete", self.collection_url(collection));
        with_retry(self.retry_policy, SERVICE_NAME, || async {
            let body = DeleteByIdsRequest { points: ids };
            self.send(reqwest::Method::POST, &url, Some(&body)).await.map(|_| ())
        })
        .await
    }

    async fn delete_by_filter(&self, collection: &str, filter: PayloadFilter) -> Result<()> {
        let url = format!("{}/points/delete", self.collection_url(collection));
        let body = DeleteByFilterRequest {
            filter: WireFilter {
                must: vec![FieldCondition { key: filter.field, matches: MatchValue { value: filter.value } }],
            },
        };
        with_retry(self.retry_policy, SERVICE_NAME, || async {
            self.send(reqwest::Method::POST, &url, Some(&body)).await.map(|_| ())
        })
        .await
    }

    async fn search(&self, collection: &str, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let url = format!("{}/points/search", self.collection_url(collection));
        let hits = with_retry(self.retry_policy, SERVICE_NAME, || async {
            let body = SearchRequest { vector, limit, with_payload: true };
            let response = self.send(reqwest::Method::POST, &url, Some(&body)).await?;
            let parsed: SearchResponse = response
                .json()
                .await
                .map_err(|err| Error::upstream_unavailable(SERVICE_NAME, format!("malformed response: {err}")))?;
            Ok(parsed.result)
        })
        .await?;

        Ok(hits
            .into_iter()
            .map(|hit| SearchHit { id: hit.id, score: hit.score, payload: hit.payload })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_strips_trailing_slash_from_base() {
        let store = HttpVectorStore::new("http://localhost:6333/", None).unwrap();
        assert_eq!(store.collection_url("code_index"), "http://localhost:6333/collections/code_index");
    }
}
