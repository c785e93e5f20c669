//! The `VectorStore` port: named collections of `(id, vector, payload)`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// One point to upsert into a collection.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    /// The point's id, unique within its collection.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Arbitrary JSON payload carried alongside the vector.
    pub payload: HashMap<String, Value>,
}

/// A scored search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matching point's id.
    pub id: String,
    /// Cosine similarity in `[-1, 1]`; higher is more similar.
    pub score: f32,
    /// The matching point's payload.
    pub payload: HashMap<String, Value>,
}

/// A filter over a collection's payload, used for `delete_by_filter`.
///
/// Kept as a small closed set of operations rather than an open-ended query
/// language — the only filter this crate ever issues is "payload field equals
/// value" (e.g. `folder_id == <id>`).
#[derive(Debug, Clone)]
pub struct PayloadFilter {
    /// The payload field to match.
    pub field: String,
    /// The value it must equal.
    pub value: Value,
}

impl PayloadFilter {
    /// Build an equality filter on `field`.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A named bucket of vectors with k-NN search, as specified for the external
/// vector-store collaborator.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Ensure `collection` exists with dimensionality `dim`. Idempotent.
    async fn ensure_collection(&self, collection: &str, dim: usize) -> Result<()>;

    /// Upsert `points` into `collection`.
    async fn upsert(&self, collection: &str, points: Vec<VectorPoint>) -> Result<()>;

    /// Delete points by id.
    async fn delete_by_ids(&self, collection: &str, ids: &[String]) -> Result<()>;

    /// Delete every point whose payload matches `filter`.
    async fn delete_by_filter(&self, collection: &str, filter: PayloadFilter) -> Result<()>;

    /// Search `collection` for the `limit` nearest neighbors of `vector`.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>>;
}
