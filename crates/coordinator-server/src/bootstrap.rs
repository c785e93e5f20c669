//! Dependency-injection wiring: assembles every infrastructure adapter
//! behind its domain port, builds and seals the tool registry, and seeds
//! the canonical sub-agent set.
//!
//! The `execute_subagent` tool and the orchestrator that registers it refer
//! to each other (a nested turn needs the very registry it is a member of).
//! We break the cycle with a [`OnceLock`]: the [`OrchestratorFactory`]
//! closure captures a handle to a cell that is filled in once the registry
//! is sealed, a beat after the closure itself is built.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::{info, warn};

use coordinator_application::{
    ChatOrchestrator, HealthProbe, Indexer, OrchestratorConfig, OrchestratorFactory, SubAgentRunner,
};
use coordinator_domain::entities::{SubAgentDefinition, ToolScope};
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::tool::ToolRegistry;
use coordinator_domain::ports::{EventSink, MetaStore};
use coordinator_domain::value_objects::FolderId;
use coordinator_infrastructure::tools::{
    ApplyPatchTool, BashTool, KnowledgeFindTool, KnowledgeStoreTool, ListDirectoryTool, PathCapability,
    ReadFileTool, WriteFileTool,
};
use coordinator_infrastructure::{
    CoordinatorConfig, HttpEmbeddingClient, HttpLlmProvider, HttpVectorStore, NotifyFileWatcher, PathMapper,
    SeaOrmMetaStore, TracingDomainEventPublisher, WalkingFileScanner,
};

/// The canonical, system-seeded sub-agents. Re-applied idempotently on every
/// start; a definition already present under this `name` is left untouched
/// except for the fields the system itself owns (prompt, tool scope),
/// preserving whatever a user may since have customized out-of-band.
fn canonical_subagents() -> Vec<(&'static str, &'static str, &'static str, ToolScope)> {
    vec![
        (
            "code-reviewer",
            "Reviews a diff or file for correctness, style, and missing tests.",
            "You are a meticulous code reviewer. Read the file(s) the user points you at, report \
             concrete defects with a file and line, and say nothing about style choices the user \
             did not ask about.",
            ToolScope::Named(vec!["read_file".to_owned(), "list_directory".to_owned()]),
        ),
        (
            "researcher",
            "Answers questions about the indexed codebase using knowledge search.",
            "You answer questions about this codebase. Use knowledge_find before answering; cite \
             the file paths your answer rests on.",
            ToolScope::Named(vec!["knowledge_find".to_owned(), "read_file".to_owned()]),
        ),
        (
            "patcher",
            "Applies a described change to a single file and reports the diff applied.",
            "You make small, targeted edits. Read the target file, construct a unified diff, and \
             apply it. Never touch a file the user did not name.",
            ToolScope::Named(vec![
                "read_file".to_owned(),
                "write_file".to_owned(),
                "apply_patch".to_owned(),
            ]),
        ),
    ]
}

async fn seed_canonical_subagents(meta_store: &dyn MetaStore) -> Result<()> {
    for (name, description, system_prompt, tools) in canonical_subagents() {
        if meta_store.find_subagent_by_name(name).await?.is_some() {
            continue;
        }
        let subagent = SubAgentDefinition::new(
            name.to_owned(),
            description.to_owned(),
            system_prompt.to_owned(),
            tools,
            Some("system".to_owned()),
            None,
            None,
        )?;
        meta_store.upsert_subagent(subagent).await?;
        info!(name, "seeded canonical sub-agent");
    }
    Ok(())
}

/// Every long-lived collaborator a request handler needs. Cheap to clone
/// (every field is an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Builds a fresh [`ChatOrchestrator`] bound to an arbitrary sink —
    /// used both for top-level turns (one per WebSocket connection) and,
    /// via [`SubAgentRunner`], for nested sub-agent turns.
    pub orchestrator_factory: OrchestratorFactory,
    /// The durable meta store, shared by every use case.
    pub meta_store: Arc<dyn MetaStore>,
    /// The indexing use case, shared across folder registration, scans,
    /// and the per-folder file watchers.
    pub indexer: Arc<Indexer>,
    /// Liveness probe over the embedding/vector-store/meta-store trio.
    pub health_probe: Arc<HealthProbe>,
    /// Active filesystem watchers, one per registered folder, kept alive
    /// for the process lifetime.
    pub watchers: Arc<DashMap<FolderId, NotifyFileWatcher>>,
}

/// Build the full application: every adapter behind its port, the sealed
/// tool registry, the canonical sub-agent seed, and a watcher per
/// auto-registered folder.
///
/// # Errors
///
/// Returns [`Error::Fatal`] if the meta store cannot be reached (migrations
/// included), or [`Error::Validation`] if required configuration fields are
/// absent.
pub async fn bootstrap(config: CoordinatorConfig) -> Result<AppState> {
    let embedding_client: Arc<dyn coordinator_domain::ports::EmbeddingClient> =
        Arc::new(HttpEmbeddingClient::new(
            config
                .embedding_base_url
                .clone()
                .ok_or_else(|| Error::validation("EMBEDDING_BASE_URL is required"))?,
            config.embedding_api_key.clone(),
            config.embedding_dimensions,
        )?);
    let vector_store: Arc<dyn coordinator_domain::ports::VectorStore> = Arc::new(HttpVectorStore::new(
        config.vector_store_url.clone(),
        config.vector_store_api_key.clone(),
    )?);
    let llm_provider: Arc<dyn coordinator_domain::ports::LlmProvider> = Arc::new(HttpLlmProvider::new(
        config.llm_provider_url.clone(),
        config.llm_provider_api_key.clone(),
    )?);
    let meta_store: Arc<dyn MetaStore> = Arc::new(SeaOrmMetaStore::connect(&config.meta_store_uri).await?);
    let path_mapper = PathMapper::new(config.path_mapping_pairs()?);
    let file_scanner: Arc<dyn coordinator_domain::ports::FileScanner> =
        Arc::new(WalkingFileScanner::new().with_path_mapper(path_mapper.clone()));
    let events = Arc::new(TracingDomainEventPublisher::new());

    seed_canonical_subagents(meta_store.as_ref()).await?;

    let capability = PathCapability::new(config.allowed_dir_paths());
    let orchestrator_config = OrchestratorConfig {
        max_tool_calls: config.max_tool_calls,
        chunk_size: config.chunk_size,
        tool_result_chunk_threshold: config.tool_result_chunk_threshold,
    };

    let registry_cell: Arc<OnceLock<Arc<ToolRegistry>>> = Arc::new(OnceLock::new());
    let orchestrator_factory: OrchestratorFactory = {
        let registry_cell = Arc::clone(&registry_cell);
        let meta_store = Arc::clone(&meta_store);
        let llm_provider = Arc::clone(&llm_provider);
        Arc::new(move |sink: Arc<dyn EventSink>| {
            let registry = registry_cell
                .get()
                .expect("tool registry must be sealed before the orchestrator factory runs")
                .clone();
            ChatOrchestrator::new(
                Arc::clone(&meta_store),
                Arc::clone(&llm_provider),
                registry,
                sink,
                orchestrator_config,
            )
        })
    };

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(BashTool::new()))?;
    registry.register(Arc::new(ReadFileTool::new(capability.clone())))?;
    registry.register(Arc::new(WriteFileTool::new(capability.clone())))?;
    registry.register(Arc::new(ListDirectoryTool::new(capability.clone())))?;
    registry.register(Arc::new(ApplyPatchTool::new(capability)))?;
    registry.register(Arc::new(KnowledgeFindTool::new(
        Arc::clone(&embedding_client),
        Arc::clone(&vector_store),
    )))?;
    registry.register(Arc::new(KnowledgeStoreTool::new(
        Arc::clone(&embedding_client),
        Arc::clone(&vector_store),
        Arc::clone(&meta_store),
    )))?;
    registry.register(Arc::new(SubAgentRunner::new(
        Arc::clone(&meta_store),
        orchestrator_factory.clone(),
    )))?;
    registry.seal();
    registry_cell
        .set(Arc::new(registry))
        .map_err(|_| Error::internal("tool registry initialized twice"))?;

    let indexer = Arc::new(Indexer::new(
        Arc::clone(&meta_store),
        Arc::clone(&vector_store),
        Arc::clone(&embedding_client),
        file_scanner,
        events,
    ));
    let health_probe = Arc::new(HealthProbe::new(
        Arc::clone(&embedding_client),
        Arc::clone(&vector_store),
        Arc::clone(&meta_store),
    ));

    let watchers = Arc::new(DashMap::new());
    register_configured_folders(&config, &indexer, &meta_store, &watchers, &path_mapper).await;

    Ok(AppState {
        orchestrator_factory,
        meta_store,
        indexer,
        health_probe,
        watchers,
    })
}

/// Auto-register every `INDEX_ROOTS` path not already known, scan it if
/// `INDEX_AUTO_SCAN` is set and it has never been scanned, and start a
/// watcher on its root. A single folder's failure is logged and skipped —
/// one bad path must not abort the rest of startup.
async fn register_configured_folders(
    config: &CoordinatorConfig,
    indexer: &Arc<Indexer>,
    meta_store: &Arc<dyn MetaStore>,
    watchers: &Arc<DashMap<FolderId, NotifyFileWatcher>>,
    path_mapper: &PathMapper,
) {
    for root in config.index_root_paths() {
        let absolute_path = root.to_string_lossy().into_owned();
        let folder_id = match meta_store.find_folder_by_path(&absolute_path).await {
            Ok(Some(folder)) => folder.id,
            Ok(None) => match indexer.add_folder(absolute_path.clone(), None).await {
                Ok(id) => id,
                Err(err) => {
                    warn!(path = %absolute_path, error = %err, "failed to auto-register folder");
                    continue;
                }
            },
            Err(err) => {
                warn!(path = %absolute_path, error = %err, "failed to look up folder during auto-registration");
                continue;
            }
        };

        if config.index_auto_scan {
            let file_count = meta_store
                .list_files_for_folder(folder_id)
                .await
                .map(|files| files.len())
                .unwrap_or(0);
            if file_count == 0 {
                if let Err(err) = indexer.scan(folder_id).await {
                    warn!(path = %absolute_path, error = %err, "initial scan failed");
                }
            }
        }

        match NotifyFileWatcher::new(
            Arc::clone(meta_store),
            Arc::clone(indexer),
            std::time::Duration::from_millis(config.debounce_ms),
            path_mapper.clone(),
        ) {
            Ok(mut watcher) => {
                if let Err(err) = watcher.watch_root(&root) {
                    warn!(path = %absolute_path, error = %err, "failed to start watcher");
                } else {
                    watchers.insert(folder_id, watcher);
                }
            }
            Err(err) => warn!(path = %absolute_path, error = %err, "failed to create watcher"),
        }
    }
}
