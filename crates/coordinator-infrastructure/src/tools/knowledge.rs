//! `knowledge_find` / `knowledge_store`: thin wrappers pairing the
//! `EmbeddingClient` with the `VectorStore` (find) and additionally the
//! `MetaStore` (store), keeping the vector point and its metadata row under
//! the same id per the `KnowledgeEntry` contract.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use coordinator_domain::entities::KnowledgeEntry;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::tool::{ToolContext, ToolExecutor, ToolSchema};
use coordinator_domain::ports::vector_store::VectorPoint;
use coordinator_domain::ports::{EmbeddingClient, MetaStore, VectorStore};
use serde_json::{json, Value};

const DEFAULT_LIMIT: usize = 5;

fn required_str<'a>(args: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::validation(format!("tool requires a string '{key}' argument")))
}

fn metadata_map(value: Option<&Value>) -> HashMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| (key.clone(), value.as_str().map_or_else(|| value.to_string(), str::to_owned)))
                .collect()
        })
        .unwrap_or_default()
}

/// Embeds a query and returns the `k` nearest knowledge entries from a
/// collection.
pub struct KnowledgeFindTool {
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_store: Arc<dyn VectorStore>,
}

impl KnowledgeFindTool {
    /// Build a find tool over the given collaborators.
    #[must_use]
    pub fn new(embedding_client: Arc<dyn EmbeddingClient>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self { embedding_client, vector_store }
    }
}

#[async_trait]
impl ToolExecutor for KnowledgeFindTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "knowledge_find".to_owned(),
            description: "Search a knowledge collection for entries similar to a query.".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "collection": { "type": "string" },
                    "query": { "type": "string" },
                    "limit": { "type": "integer" },
                },
                "required": ["collection", "query"],
            }),
        }
    }

    async fn execute(&self, _ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        let collection = required_str(&args, "collection")?;
        let query = required_str(&args, "query")?;
        let limit = args.get("limit").and_then(Value::as_u64).map_or(DEFAULT_LIMIT, |limit| limit as usize);

        let vector = self.embedding_client.embed(query).await?;
        let hits = self.vector_store.search(collection, &vector, limit).await?;

        Ok(json!({
            "hits": hits.into_iter().map(|hit| json!({
                "id": hit.id,
                "score": hit.score,
                "payload": hit.payload,
            })).collect::<Vec<_>>(),
        }))
    }
}

/// Embeds text, then upserts it as a paired `MetaStore` row and `VectorStore`
/// point under the same id.
pub struct KnowledgeStoreTool {
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_store: Arc<dyn VectorStore>,
    meta_store: Arc<dyn MetaStore>,
}

impl KnowledgeStoreTool {
    /// Build a store tool over the given collaborators.
    #[must_use]
    pub fn new(
        embedding_client: Arc<dyn EmbeddingClient>,
        vector_store: Arc<dyn VectorStore>,
        meta_store: Arc<dyn MetaStore>,
    ) -> Self {
        Self { embedding_client, vector_store, meta_store }
    }
}

#[async_trait]
impl ToolExecutor for KnowledgeStoreTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "knowledge_store".to_owned(),
            description: "Store text as a searchable knowledge entry in a collection.".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "collection": { "type": "string" },
                    "text": { "type": "string" },
                    "metadata": { "type": "object" },
                },
                "required": ["collection", "text"],
            }),
        }
    }

    async fn execute(&self, _ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        let collection = required_str(&args, "collection")?.to_owned();
        let text = required_str(&args, "text")?.to_owned();
        let metadata = metadata_map(args.get("metadata"));

        let entry = KnowledgeEntry::new(collection.clone(), text.clone(), metadata.clone());
        let vector = self.embedding_client.embed(&text).await?;

        self.vector_store.ensure_collection(&collection, self.embedding_client.dimensions()).await?;
        let payload = metadata.into_iter().map(|(key, value)| (key, Value::String(value))).collect();
        self.vector_store
            .upsert(&collection, vec![VectorPoint { id: entry.id.to_string(), vector, payload }])
            .await?;
        self.meta_store.insert_knowledge_entry(entry.clone()).await?;

        Ok(json!({ "id": entry.id.to_string() }))
    }
}
