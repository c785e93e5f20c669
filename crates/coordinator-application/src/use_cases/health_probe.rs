//! `HealthProbe`: liveness checks for the embedding service, vector store,
//! and meta store, each bounded by `HEALTH_PROBE_TIMEOUT_SECS`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use coordinator_domain::constants::HEALTH_PROBE_TIMEOUT_SECS;
use coordinator_domain::ports::{EmbeddingClient, MetaStore, VectorStore};

/// A single dependency's probe outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Whether the probe succeeded within its timeout.
    pub status: HealthStatus,
    /// Round-trip latency of the probe.
    pub latency_ms: u64,
    /// The failure message, if the probe failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Whether a probed dependency is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// The probe completed within its timeout.
    Up,
    /// The probe timed out or returned an error.
    Down,
}

/// The full liveness report: one entry per external dependency, plus an
/// overall verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// `Up` only if every dependency is `Up`.
    pub overall: HealthStatus,
    /// The embedding service's probe result.
    pub embedding: ServiceHealth,
    /// The vector store's probe result.
    pub vector_store: ServiceHealth,
    /// The meta store's probe result.
    pub meta_store: ServiceHealth,
}

/// Runs the three liveness checks named in the component design: a
/// collections-list against the vector store, a trivial embed, and a ping
/// against the meta store. Failure of the first two is not fatal to the
/// process; failure of the meta store is surfaced as `Fatal` by the caller
/// at startup (this probe only reports; it does not terminate anything).
pub struct HealthProbe {
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_store: Arc<dyn VectorStore>,
    meta_store: Arc<dyn MetaStore>,
    timeout: Duration,
}

impl HealthProbe {
    /// Construct a probe over the three collaborating ports, using the
    /// default `HEALTH_PROBE_TIMEOUT_SECS` timeout.
    #[must_use]
    pub fn new(
        embedding_client: Arc<dyn EmbeddingClient>,
        vector_store: Arc<dyn VectorStore>,
        meta_store: Arc<dyn MetaStore>,
    ) -> Self {
        Self {
            embedding_client,
            vector_store,
            meta_store,
            timeout: Duration::from_secs(HEALTH_PROBE_TIMEOUT_SECS),
        }
    }

    /// Run all three probes and assemble the report. Never returns an
    /// `Err`; failures are captured in the per-service `last_error` field.
    pub async fn check(&self) -> HealthReport {
        let embedding = self.probe_embedding().await;
        let vector_store = self.probe_vector_store().await;
        let meta_store = self.probe_meta_store().await;

        let overall = if embedding.status == HealthStatus::Up
            && vector_store.status == HealthStatus::Up
            && meta_store.status == HealthStatus::Up
        {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        HealthReport {
            overall,
            embedding,
            vector_store,
            meta_store,
        }
    }

    async fn probe_embedding(&self) -> ServiceHealth {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.embedding_client.embed("ping")).await;
        Self::to_service_health(started, outcome)
    }

    async fn probe_vector_store(&self) -> ServiceHealth {
        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.timeout,
            self.vector_store
                .search(coordinator_domain::constants::CODE_COLLECTION, &[], 1),
        )
        .await;
        Self::to_service_health(started, outcome)
    }

    async fn probe_meta_store(&self) -> ServiceHealth {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.meta_store.ping()).await;
        Self::to_service_health(started, outcome)
    }

    fn to_service_health<T>(
        started: Instant,
        outcome: Result<coordinator_domain::error::Result<T>, tokio::time::error::Elapsed>,
    ) -> ServiceHealth {
        let latency_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(_)) => ServiceHealth {
                status: HealthStatus::Up,
                latency_ms,
                last_error: None,
            },
            Ok(Err(err)) => ServiceHealth {
                status: HealthStatus::Down,
                latency_ms,
                last_error: Some(err.to_string()),
            },
            Err(_) => ServiceHealth {
                status: HealthStatus::Down,
                latency_ms,
                last_error: Some("timed out".to_owned()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coordinator_domain::error::{Error, Result};
    use coordinator_domain::ports::vector_store::{PayloadFilter, SearchHit, VectorPoint};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeEmbeddingClient {
        fails: bool,
    }

    #[async_trait]
    impl EmbeddingClient for FakeEmbeddingClient {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            if self.fails {
                Err(Error::upstream_unavailable("embedding", "connection refused"))
            } else {
                Ok(vec![0.0; 4])
            }
        }
        fn dimensions(&self) -> usize {
            4
        }
    }

    struct FakeVectorStore {
        up: AtomicBool,
    }

    #[async_trait]
    impl VectorStore for FakeVectorStore {
        async fn ensure_collection(&self, _collection: &str, _dim: usize) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _collection: &str, _points: Vec<VectorPoint>) -> Result<()> {
            Ok(())
        }
        async fn delete_by_ids(&self, _collection: &str, _ids: &[String]) -> Result<()> {
            Ok(())
        }
        async fn delete_by_filter(&self, _collection: &str, _filter: PayloadFilter) -> Result<()> {
            Ok(())
        }
        async fn search(&self, _collection: &str, _vector: &[f32], _limit: usize) -> Result<Vec<SearchHit>> {
            if self.up.load(Ordering::Acquire) {
                Ok(Vec::new())
            } else {
                Err(Error::upstream_unavailable("vector_store", "connection refused"))
            }
        }
    }

    struct FakeMetaStorePing {
        up: bool,
    }

    #[async_trait]
    impl MetaStore for FakeMetaStorePing {
        async fn insert_folder(&self, _f: coordinator_domain::entities::IndexedFolder) -> Result<()> {
            unimplemented!()
        }
        async fn get_folder(
            &self,
            _id: coordinator_domain::value_objects::FolderId,
        ) -> Result<coordinator_domain::entities::IndexedFolder> {
            unimplemented!()
        }
        async fn find_folder_by_path(
            &self,
            _p: &str,
        ) -> Result<Option<coordinator_domain::entities::IndexedFolder>> {
            unimplemented!()
        }
        async fn update_folder(&self, _f: coordinator_domain::entities::IndexedFolder) -> Result<()> {
            unimplemented!()
        }
        async fn delete_folder(&self, _id: coordinator_domain::value_objects::FolderId) -> Result<()> {
            unimplemented!()
        }
        async fn list_folders(&self) -> Result<Vec<coordinator_domain::entities::IndexedFolder>> {
            unimplemented!()
        }
        async fn insert_file(&self, _f: coordinator_domain::entities::IndexedFile) -> Result<()> {
            unimplemented!()
        }
        async fn find_file_by_path(
            &self,
            _folder_id: coordinator_domain::value_objects::FolderId,
            _p: &str,
        ) -> Result<Option<coordinator_domain::entities::IndexedFile>> {
            unimplemented!()
        }
        async fn update_file(&self, _f: coordinator_domain::entities::IndexedFile) -> Result<()> {
            unimplemented!()
        }
        async fn delete_file(&self, _id: coordinator_domain::value_objects::FileId) -> Result<()> {
            unimplemented!()
        }
        async fn list_files_for_folder(
            &self,
            _folder_id: coordinator_domain::value_objects::FolderId,
        ) -> Result<Vec<coordinator_domain::entities::IndexedFile>> {
            unimplemented!()
        }
        async fn insert_chunks(&self, _c: Vec<coordinator_domain::entities::FileChunk>) -> Result<()> {
            unimplemented!()
        }
        async fn list_chunks_for_file(
            &self,
            _file_id: coordinator_domain::value_objects::FileId,
        ) -> Result<Vec<coordinator_domain::entities::FileChunk>> {
            unimplemented!()
        }
        async fn delete_chunks_for_file(&self, _file_id: coordinator_domain::value_objects::FileId) -> Result<()> {
            unimplemented!()
        }
        async fn insert_session(&self, _session: coordinator_domain::entities::ChatSession) -> Result<()> {
            unimplemented!()
        }
        async fn get_session(
            &self,
            _id: coordinator_domain::value_objects::SessionId,
        ) -> Result<coordinator_domain::entities::ChatSession> {
            unimplemented!()
        }
        async fn update_session(&self, _session: coordinator_domain::entities::ChatSession) -> Result<()> {
            unimplemented!()
        }
        async fn append_message(&self, _message: coordinator_domain::entities::ChatMessage) -> Result<()> {
            unimplemented!()
        }
        async fn list_messages(
            &self,
            _session_id: coordinator_domain::value_objects::SessionId,
        ) -> Result<Vec<coordinator_domain::entities::ChatMessage>> {
            unimplemented!()
        }
        async fn upsert_subagent(&self, _subagent: coordinator_domain::entities::SubAgentDefinition) -> Result<()> {
            unimplemented!()
        }
        async fn find_subagent_by_name(
            &self,
            _name: &str,
        ) -> Result<Option<coordinator_domain::entities::SubAgentDefinition>> {
            unimplemented!()
        }
        async fn get_subagent(
            &self,
            _id: coordinator_domain::value_objects::SubAgentId,
        ) -> Result<coordinator_domain::entities::SubAgentDefinition> {
            unimplemented!()
        }
        async fn get_system_prompt(
            &self,
            _u: &str,
            _c: &str,
        ) -> Result<Option<coordinator_domain::entities::SystemPrompt>> {
            unimplemented!()
        }
        async fn set_system_prompt(&self, _p: coordinator_domain::entities::SystemPrompt) -> Result<()> {
            unimplemented!()
        }
        async fn insert_http_tool(&self, _t: coordinator_domain::entities::HttpToolDefinition) -> Result<()> {
            unimplemented!()
        }
        async fn list_http_tools(&self) -> Result<Vec<coordinator_domain::entities::HttpToolDefinition>> {
            unimplemented!()
        }
        async fn insert_knowledge_entry(&self, _e: coordinator_domain::entities::KnowledgeEntry) -> Result<()> {
            unimplemented!()
        }
        async fn get_knowledge_entry(
            &self,
            _id: coordinator_domain::value_objects::KnowledgeEntryId,
        ) -> Result<coordinator_domain::entities::KnowledgeEntry> {
            unimplemented!()
        }
        async fn record_tool_invocation(
            &self,
            _record: coordinator_domain::ports::meta_store::ToolInvocationRecord,
        ) -> Result<()> {
            unimplemented!()
        }
        async fn ping(&self) -> Result<()> {
            if self.up {
                Ok(())
            } else {
                Err(Error::fatal("meta store unreachable"))
            }
        }
    }

    #[tokio::test]
    async fn all_dependencies_up_reports_overall_up() {
        let probe = HealthProbe::new(
            Arc::new(FakeEmbeddingClient { fails: false }),
            Arc::new(FakeVectorStore {
                up: AtomicBool::new(true),
            }),
            Arc::new(FakeMetaStorePing { up: true }),
        );
        let report = probe.check().await;
        assert_eq!(report.overall, HealthStatus::Up);
        assert_eq!(report.embedding.status, HealthStatus::Up);
        assert_eq!(report.vector_store.status, HealthStatus::Up);
        assert_eq!(report.meta_store.status, HealthStatus::Up);
    }

    #[tokio::test]
    async fn meta_store_failure_marks_overall_down_with_error_message() {
        let probe = HealthProbe::new(
            Arc::new(FakeEmbeddingClient { fails: false }),
            Arc::new(FakeVectorStore {
                up: AtomicBool::new(true),
            }),
            Arc::new(FakeMetaStorePing { up: false }),
        );
        let report = probe.check().await;
        assert_eq!(report.overall, HealthStatus::Down);
        assert_eq!(report.meta_store.status, HealthStatus::Down);
        assert!(report.meta_store.last_error.is_some());
        assert_eq!(report.embedding.status, HealthStatus::Up);
    }
}
