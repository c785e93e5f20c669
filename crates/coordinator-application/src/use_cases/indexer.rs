//! Indexer use case
//!
//! Owns the full lifecycle of registered folders: registration, scanning,
//! single-file reindexing (driven by the debouncer), removal, and the
//! per-file diff-and-embed state machine that keeps `MetaStore` and
//! `VectorStore` converged.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use coordinator_domain::constants::CODE_COLLECTION;
use coordinator_domain::entities::{FileChunk, IndexedFile, IndexedFolder};
use coordinator_domain::error::Result;
use coordinator_domain::events::DomainEvent;
use coordinator_domain::ports::file_scanner::{FileScanner, ScannedChunk, ScannedFile};
use coordinator_domain::ports::vector_store::VectorPoint;
use coordinator_domain::ports::{DomainEventPublisher, EmbeddingClient, MetaStore, VectorStore};
use coordinator_domain::value_objects::{ChunkId, FileId, FolderId, FolderStatus};

/// Tally of per-file transitions observed by one `scan` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files seen for the first time.
    pub new_files: u64,
    /// Files whose content hash changed.
    pub updated_files: u64,
    /// Files that were indexed but no longer exist on disk.
    pub missing_files: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileTransition {
    New,
    Updated,
    Unchanged,
}

/// Orchestrates folder registration, scanning, and incremental reindexing.
///
/// Does not hold a filesystem watcher: starting/stopping the watcher for a
/// folder's root is the caller's responsibility (`coordinator-server`'s
/// process wiring), so this crate stays free of the `notify` dependency.
pub struct Indexer {
    meta_store: Arc<dyn MetaStore>,
    vector_store: Arc<dyn VectorStore>,
    embedding_client: Arc<dyn EmbeddingClient>,
    file_scanner: Arc<dyn FileScanner>,
    events: Arc<dyn DomainEventPublisher>,
}

impl Indexer {
    /// Construct an `Indexer` over its collaborating ports.
    pub fn new(
        meta_store: Arc<dyn MetaStore>,
        vector_store: Arc<dyn VectorStore>,
        embedding_client: Arc<dyn EmbeddingClient>,
        file_scanner: Arc<dyn FileScanner>,
        events: Arc<dyn DomainEventPublisher>,
    ) -> Self {
        Self {
            meta_store,
            vector_store,
            embedding_client,
            file_scanner,
            events,
        }
    }

    /// Register a new folder. Fails with [`coordinator_domain::error::Error::AlreadyRegistered`]
    /// if `absolute_path` is already registered.
    pub async fn add_folder(
        &self,
        absolute_path: String,
        description: Option<String>,
    ) -> Result<FolderId> {
        if self
            .meta_store
            .find_folder_by_path(&absolute_path)
            .await?
            .is_some()
        {
            return Err(coordinator_domain::error::Error::already_registered(
                absolute_path,
            ));
        }
        let folder = IndexedFolder::register(absolute_path, description);
        let id = folder.id;
        self.meta_store.insert_folder(folder).await?;
        Ok(id)
    }

    /// Remove a folder and cascade-delete every file, chunk, and vector
    /// point under it. Idempotent: a path that is not registered is a no-op.
    pub async fn remove_folder(&self, absolute_path: &str) -> Result<()> {
        let Some(folder) = self.meta_store.find_folder_by_path(absolute_path).await? else {
            return Ok(());
        };
        let files = self.meta_store.list_files_for_folder(folder.id).await?;
        for file in files {
            self.remove_missing_file(file).await?;
        }
        self.meta_store.delete_folder(folder.id).await?;
        Ok(())
    }

    /// Run a full scan of `folder_id`: walk its root, diff every observed
    /// file against `MetaStore` by `(absolutePath, contentHash)`, and
    /// process each as new/updated/unchanged/missing.
    pub async fn scan(&self, folder_id: FolderId) -> Result<ScanSummary> {
        let mut folder = self.meta_store.get_folder(folder_id).await?;
        folder.status = FolderStatus::Scanning;
        self.meta_store.update_folder(folder.clone()).await?;
        let _ = self
            .events
            .publish(DomainEvent::ScanStarted {
                folder_id,
                at: Utc::now(),
            })
            .await;

        let root = Path::new(&folder.absolute_path);
        let scanned_files = match self.file_scanner.scan(root).await {
            Ok(files) => files,
            Err(err) => {
                folder.status = FolderStatus::Error;
                folder.last_error = Some(err.to_string());
                self.meta_store.update_folder(folder).await?;
                let _ = self
                    .events
                    .publish(DomainEvent::ScanFailed {
                        folder_id,
                        message: err.to_string(),
                        at: Utc::now(),
                    })
                    .await;
                return Err(err);
            }
        };

        let existing_files = self.meta_store.list_files_for_folder(folder_id).await?;
        let mut existing_by_path: HashMap<String, IndexedFile> = existing_files
            .into_iter()
            .map(|f| (f.absolute_path.clone(), f))
            .collect();

        let mut summary = ScanSummary::default();
        let mut seen_paths = HashSet::new();

        for scanned in scanned_files {
            seen_paths.insert(scanned.absolute_path.clone());
            let existing = existing_by_path.remove(&scanned.absolute_path);
            let relative_path = scanned.relative_path.clone();
            match self.process_scanned_file(&folder, scanned, existing).await {
                Ok(FileTransition::New) => summary.new_files += 1,
                Ok(FileTransition::Updated) => summary.updated_files += 1,
                Ok(FileTransition::Unchanged) => {}
                Err(err) => {
                    tracing::warn!(relative_path, error = %err, "failed to index file during scan");
                }
            }
        }

        for (_, file) in existing_by_path {
            let relative_path = file.relative_path.clone();
            match self.remove_missing_file(file).await {
                Ok(()) => summary.missing_files += 1,
                Err(err) => {
                    tracing::warn!(relative_path, error = %err, "failed to remove missing file during scan");
                }
            }
        }

        let file_count = self.meta_store.list_files_for_folder(folder_id).await?.len() as u64;
        folder.status = FolderStatus::Active;
        folder.last_scanned_at = Some(Utc::now());
        folder.file_count = file_count;
        folder.last_error = None;
        self.meta_store.update_folder(folder).await?;

        let _ = self
            .events
            .publish(DomainEvent::ScanCompleted {
                folder_id,
                new_files: summary.new_files,
                updated_files: summary.updated_files,
                missing_files: summary.missing_files,
                at: Utc::now(),
            })
            .await;

        Ok(summary)
    }

    /// Reindex a single path, as called by the debouncer on a coalesced
    /// filesystem event. Equivalent to a single-file slice of [`Self::scan`].
    pub async fn index_file(&self, folder_id: FolderId, absolute_path: &str) -> Result<()> {
        let folder = self.meta_store.get_folder(folder_id).await?;
        let existing = self
            .meta_store
            .find_file_by_path(folder_id, absolute_path)
            .await?;
        let root = Path::new(&folder.absolute_path);
        let scanned = self
            .file_scanner
            .scan_file(root, Path::new(absolute_path))
            .await?;

        match scanned {
            Some(scanned_file) => {
                let relative_path = scanned_file.relative_path.clone();
                let transition = self.process_scanned_file(&folder, scanned_file, existing).await?;
                if transition != FileTransition::Unchanged {
                    let chunk_count = self
                        .meta_store
                        .find_file_by_path(folder_id, absolute_path)
                        .await?
                        .map(|f| f.chunk_count)
                        .unwrap_or(0);
                    let _ = self
                        .events
                        .publish(DomainEvent::FileIndexed {
                            folder_id,
                            relative_path,
                            chunk_count,
                        })
                        .await;
                }
                Ok(())
            }
            None => {
                // Ignored, binary, or unrecognized extension: if metadata
                // previously existed, the file is treated as missing.
                if let Some(existing) = existing {
                    self.delete_file(folder_id, &existing.absolute_path).await
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Remove a single file's metadata, chunks, and vector points.
    /// Equivalent to the `missing` branch of the per-file state machine.
    pub async fn delete_file(&self, folder_id: FolderId, absolute_path: &str) -> Result<()> {
        if let Some(existing) = self
            .meta_store
            .find_file_by_path(folder_id, absolute_path)
            .await?
        {
            let relative_path = existing.relative_path.clone();
            self.remove_missing_file(existing).await?;
            let _ = self
                .events
                .publish(DomainEvent::FileRemoved {
                    folder_id,
                    relative_path,
                })
                .await;
        }
        Ok(())
    }

    /// Classify an observed file against its prior `MetaStore` record and
    /// apply the corresponding action of the per-file state machine.
    ///
    /// Embeds every chunk before making any destructive change: a file with
    /// zero successfully embedded chunks leaves its prior indexed state
    /// untouched, per the embedding failure policy.
    async fn process_scanned_file(
        &self,
        folder: &IndexedFolder,
        scanned: ScannedFile,
        existing: Option<IndexedFile>,
    ) -> Result<FileTransition> {
        if let Some(existing) = &existing {
            if existing.content_hash == scanned.content_hash {
                return Ok(FileTransition::Unchanged);
            }
        }

        let file_id = existing.as_ref().map(|f| f.id).unwrap_or_else(FileId::new);
        let successes = self.embed_chunks(&scanned.chunks).await;
        if successes.is_empty() {
            tracing::warn!(
                relative_path = %scanned.relative_path,
                "no chunks embedded successfully; preserving prior indexed state"
            );
            return Ok(FileTransition::Unchanged);
        }

        if let Some(existing) = &existing {
            self.delete_chunks_and_points(existing.id).await?;
        }

        let file_chunks = self.write_chunks(folder, file_id, &scanned, &successes).await?;
        let file_record = IndexedFile {
            id: file_id,
            folder_id: folder.id,
            absolute_path: scanned.absolute_path,
            relative_path: scanned.relative_path,
            language: scanned.language,
            content_hash: scanned.content_hash,
            size: scanned.size,
            line_count: scanned.line_count,
            chunk_count: file_chunks.len() as u32,
            indexed_at: Utc::now(),
        };

        if existing.is_some() {
            self.meta_store.update_file(file_record).await?;
            Ok(FileTransition::Updated)
        } else {
            self.meta_store.insert_file(file_record).await?;
            Ok(FileTransition::New)
        }
    }

    /// Embed every chunk individually; a failing chunk is logged and
    /// dropped rather than aborting the whole file.
    async fn embed_chunks(&self, chunks: &[ScannedChunk]) -> Vec<(ScannedChunk, Vec<f32>)> {
        let mut successes = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match self.embedding_client.embed(&chunk.content).await {
                Ok(vector) => successes.push((chunk.clone(), vector)),
                Err(err) => {
                    tracing::warn!(
                        chunk_number = chunk.chunk_number,
                        error = %err,
                        "embedding failed for chunk, skipping"
                    );
                }
            }
        }
        successes
    }

    /// Upsert successfully embedded chunks: vector points first, then the
    /// corresponding `MetaStore` chunk rows (insert ordering per the
    /// crash-consistency rule).
    async fn write_chunks(
        &self,
        folder: &IndexedFolder,
        file_id: FileId,
        scanned: &ScannedFile,
        successes: &[(ScannedChunk, Vec<f32>)],
    ) -> Result<Vec<FileChunk>> {
        let mut points = Vec::with_capacity(successes.len());
        let mut file_chunks = Vec::with_capacity(successes.len());

        for (chunk, vector) in successes {
            let vector_id = FileChunk::vector_id_for(file_id, chunk.chunk_number);
            let mut payload = HashMap::new();
            payload.insert("file_id".to_owned(), Value::String(file_id.to_string()));
            payload.insert(
                "folder_id".to_owned(),
                Value::String(folder.id.to_string()),
            );
            payload.insert(
                "relative_path".to_owned(),
                Value::String(scanned.relative_path.clone()),
            );
            if let Some(language) = &scanned.language {
                payload.insert("language".to_owned(), Value::String(language.clone()));
            }
            points.push(VectorPoint {
                id: vector_id.clone(),
                vector: vector.clone(),
                payload,
            });
            file_chunks.push(FileChunk {
                id: ChunkId::new(),
                file_id,
                chunk_number: chunk.chunk_number,
                content: chunk.content.clone(),
                start_line: chunk.start_line,
                end_line: chunk.end_line,
                vector_id,
            });
        }

        self.vector_store
            .ensure_collection(CODE_COLLECTION, self.embedding_client.dimensions())
            .await?;
        self.vector_store
            .upsert(CODE_COLLECTION, points)
            .await?;
        self.meta_store.insert_chunks(file_chunks.clone()).await?;
        Ok(file_chunks)
    }

    /// Delete every chunk (and its vector point) owned by `file_id`, without
    /// touching the file record itself. `MetaStore` rows are deleted before
    /// the corresponding vector points, so a crash mid-delete leaves only an
    /// orphaned (reclaimable) vector point, never a dangling `MetaStore` row.
    async fn delete_chunks_and_points(&self, file_id: FileId) -> Result<()> {
        let chunks = self.meta_store.list_chunks_for_file(file_id).await?;
        let ids: Vec<String> = chunks.into_iter().map(|c| c.vector_id).collect();
        self.meta_store.delete_chunks_for_file(file_id).await?;
        if !ids.is_empty() {
            self.vector_store.delete_by_ids(CODE_COLLECTION, &ids).await?;
        }
        Ok(())
    }

    /// Remove a file no longer observed on disk: its chunks and vector
    /// points, then the file record itself.
    async fn remove_missing_file(&self, file: IndexedFile) -> Result<()> {
        self.delete_chunks_and_points(file.id).await?;
        self.meta_store.delete_file(file.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coordinator_domain::entities::ChatMessage;
    use coordinator_domain::entities::ChatSession;
    use coordinator_domain::entities::{HttpToolDefinition, KnowledgeEntry, SubAgentDefinition, SystemPrompt};
    use coordinator_domain::error::Error;
    use coordinator_domain::ports::file_scanner::{FileScanner, ScannedChunk, ScannedFile};
    use coordinator_domain::ports::meta_store::ToolInvocationRecord;
    use coordinator_domain::ports::vector_store::{PayloadFilter, SearchHit};
    use coordinator_domain::value_objects::{KnowledgeEntryId, SessionId, SubAgentId};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeMetaStore {
        folders: StdMutex<HashMap<FolderId, IndexedFolder>>,
        files: StdMutex<HashMap<FileId, IndexedFile>>,
        chunks: StdMutex<HashMap<FileId, Vec<FileChunk>>>,
    }

    #[async_trait]
    impl MetaStore for FakeMetaStore {
        async fn insert_folder(&self, folder: IndexedFolder) -> Result<()> {
            self.folders.lock().unwrap().insert(folder.id, folder);
            Ok(())
        }
        async fn get_folder(&self, id: FolderId) -> Result<IndexedFolder> {
            self.folders
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::not_found("folder"))
        }
        async fn find_folder_by_path(&self, absolute_path: &str) -> Result<Option<IndexedFolder>> {
            Ok(self
                .folders
                .lock()
                .unwrap()
                .values()
                .find(|f| f.absolute_path == absolute_path)
                .cloned())
        }
        async fn update_folder(&self, folder: IndexedFolder) -> Result<()> {
            self.folders.lock().unwrap().insert(folder.id, folder);
            Ok(())
        }
        async fn delete_folder(&self, id: FolderId) -> Result<()> {
            self.folders.lock().unwrap().remove(&id);
            Ok(())
        }
        async fn list_folders(&self) -> Result<Vec<IndexedFolder>> {
            Ok(self.folders.lock().unwrap().values().cloned().collect())
        }
        async fn insert_file(&self, file: IndexedFile) -> Result<()> {
            self.files.lock().unwrap().insert(file.id, file);
            Ok(())
        }
        async fn find_file_by_path(
            &self,
            folder_id: FolderId,
            absolute_path: &str,
        ) -> Result<Option<IndexedFile>> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .values()
                .find(|f| f.folder_id == folder_id && f.absolute_path == absolute_path)
                .cloned())
        }
        async fn update_file(&self, file: IndexedFile) -> Result<()> {
            self.files.lock().unwrap().insert(file.id, file);
            Ok(())
        }
        async fn delete_file(&self, id: FileId) -> Result<()> {
            self.files.lock().unwrap().remove(&id);
            Ok(())
        }
        async fn list_files_for_folder(&self, folder_id: FolderId) -> Result<Vec<IndexedFile>> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .values()
                .filter(|f| f.folder_id == folder_id)
                .cloned()
                .collect())
        }
        async fn insert_chunks(&self, chunks: Vec<FileChunk>) -> Result<()> {
            let mut guard = self.chunks.lock().unwrap();
            for chunk in chunks {
                guard.entry(chunk.file_id).or_default().push(chunk);
            }
            Ok(())
        }
        async fn list_chunks_for_file(&self, file_id: FileId) -> Result<Vec<FileChunk>> {
            Ok(self.chunks.lock().unwrap().get(&file_id).cloned().unwrap_or_default())
        }
        async fn delete_chunks_for_file(&self, file_id: FileId) -> Result<()> {
            self.chunks.lock().unwrap().remove(&file_id);
            Ok(())
        }
        async fn insert_session(&self, _session: ChatSession) -> Result<()> {
            Ok(())
        }
        async fn get_session(&self, id: SessionId) -> Result<ChatSession> {
            Err(Error::not_found(format!("session {id}")))
        }
        async fn update_session(&self, _session: ChatSession) -> Result<()> {
            Ok(())
        }
        async fn append_message(&self, _message: ChatMessage) -> Result<()> {
            Ok(())
        }
        async fn list_messages(&self, _session_id: SessionId) -> Result<Vec<ChatMessage>> {
            Ok(Vec::new())
        }
        async fn upsert_subagent(&self, _subagent: SubAgentDefinition) -> Result<()> {
            Ok(())
        }
        async fn find_subagent_by_name(&self, _name: &str) -> Result<Option<SubAgentDefinition>> {
            Ok(None)
        }
        async fn get_subagent(&self, id: SubAgentId) -> Result<SubAgentDefinition> {
            Err(Error::not_found(format!("subagent {id}")))
        }
        async fn get_system_prompt(
            &self,
            _user_id: &str,
            _company_id: &str,
        ) -> Result<Option<SystemPrompt>> {
            Ok(None)
        }
        async fn set_system_prompt(&self, _prompt: SystemPrompt) -> Result<()> {
            Ok(())
        }
        async fn insert_http_tool(&self, _tool: HttpToolDefinition) -> Result<()> {
            Ok(())
        }
        async fn list_http_tools(&self) -> Result<Vec<HttpToolDefinition>> {
            Ok(Vec::new())
        }
        async fn insert_knowledge_entry(&self, _entry: KnowledgeEntry) -> Result<()> {
            Ok(())
        }
        async fn get_knowledge_entry(&self, id: KnowledgeEntryId) -> Result<KnowledgeEntry> {
            Err(Error::not_found(format!("knowledge entry {id}")))
        }
        async fn record_tool_invocation(&self, _record: ToolInvocationRecord) -> Result<()> {
            Ok(())
        }
        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeVectorStore {
        points: StdMutex<HashMap<String, VectorPoint>>,
    }

    #[async_trait]
    impl VectorStore for FakeVectorStore {
        async fn ensure_collection(&self, _collection: &str, _dim: usize) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _collection: &str, points: Vec<VectorPoint>) -> Result<()> {
            let mut guard = self.points.lock().unwrap();
            for point in points {
                guard.insert(point.id.clone(), point);
            }
            Ok(())
        }
        async fn delete_by_ids(&self, _collection: &str, ids: &[String]) -> Result<()> {
            let mut guard = self.points.lock().unwrap();
            for id in ids {
                guard.remove(id);
            }
            Ok(())
        }
        async fn delete_by_filter(&self, _collection: &str, _filter: PayloadFilter) -> Result<()> {
            Ok(())
        }
        async fn search(
            &self,
            _collection: &str,
            _vector: &[f32],
            _limit: usize,
        ) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
    }

    struct FakeEmbeddingClient;

    #[async_trait]
    impl EmbeddingClient for FakeEmbeddingClient {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32])
        }
        fn dimensions(&self) -> usize {
            1
        }
    }

    struct FakeFileScanner {
        files: Vec<ScannedFile>,
    }

    #[async_trait]
    impl FileScanner for FakeFileScanner {
        async fn scan(&self, _root: &Path) -> Result<Vec<ScannedFile>> {
            Ok(self.files.clone())
        }
        async fn scan_file(&self, _root: &Path, path: &Path) -> Result<Option<ScannedFile>> {
            let absolute = path.to_string_lossy().to_string();
            Ok(self.files.iter().find(|f| f.absolute_path == absolute).cloned())
        }
    }

    struct NoopEvents;

    #[async_trait]
    impl DomainEventPublisher for NoopEvents {
        async fn publish(&self, _event: DomainEvent) -> Result<()> {
            Ok(())
        }
    }

    fn scanned_file(relative: &str, content: &str) -> ScannedFile {
        ScannedFile {
            relative_path: relative.to_owned(),
            absolute_path: format!("/repo/{relative}"),
            language: Some("go".to_owned()),
            size: content.len() as u64,
            line_count: 1,
            content_hash: format!("{:x}", md5ish(content)),
            chunks: vec![ScannedChunk {
                chunk_number: 0,
                content: content.to_owned(),
                start_line: 1,
                end_line: 1,
            }],
        }
    }

    // A content-addressed stand-in hash for test fixtures only — the real
    // scanner hashes with SHA-256 in the infrastructure adapter.
    fn md5ish(content: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    fn make_indexer(files: Vec<ScannedFile>) -> (Indexer, Arc<FakeMetaStore>, Arc<FakeVectorStore>) {
        let meta = Arc::new(FakeMetaStore::default());
        let vectors = Arc::new(FakeVectorStore::default());
        let indexer = Indexer::new(
            meta.clone(),
            vectors.clone(),
            Arc::new(FakeEmbeddingClient),
            Arc::new(FakeFileScanner { files }),
            Arc::new(NoopEvents),
        );
        (indexer, meta, vectors)
    }

    #[tokio::test]
    async fn add_folder_rejects_duplicate_path() {
        let (indexer, _, _) = make_indexer(vec![]);
        indexer
            .add_folder("/repo".to_owned(), None)
            .await
            .expect("first registration succeeds");
        let err = indexer
            .add_folder("/repo".to_owned(), None)
            .await
            .expect_err("duplicate registration must fail");
        assert_eq!(err.kind(), coordinator_domain::error::ErrorKind::AlreadyRegistered);
    }

    #[tokio::test]
    async fn scan_indexes_new_files_and_sets_counts() {
        let files = vec![scanned_file("a.go", "package a"), scanned_file("b.go", "package b")];
        let (indexer, meta, vectors) = make_indexer(files);
        let folder_id = indexer.add_folder("/repo".to_owned(), None).await.unwrap();

        let summary = indexer.scan(folder_id).await.unwrap();
        assert_eq!(summary.new_files, 2);
        assert_eq!(summary.updated_files, 0);
        assert_eq!(summary.missing_files, 0);

        let folder = meta.get_folder(folder_id).await.unwrap();
        assert_eq!(folder.file_count, 2);
        assert_eq!(folder.status, FolderStatus::Active);
        assert_eq!(vectors.points.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn second_scan_with_no_changes_produces_no_transitions() {
        let files = vec![scanned_file("a.go", "package a")];
        let (indexer, _, _) = make_indexer(files);
        let folder_id = indexer.add_folder("/repo".to_owned(), None).await.unwrap();

        indexer.scan(folder_id).await.unwrap();
        let second = indexer.scan(folder_id).await.unwrap();
        assert_eq!(second, ScanSummary::default());
    }

    #[tokio::test]
    async fn remove_folder_cascades_to_zero_residue() {
        let files = vec![scanned_file("a.go", "package a")];
        let (indexer, meta, vectors) = make_indexer(files);
        let folder_id = indexer.add_folder("/repo".to_owned(), None).await.unwrap();
        indexer.scan(folder_id).await.unwrap();

        indexer.remove_folder("/repo").await.unwrap();

        assert!(meta.list_files_for_folder(folder_id).await.unwrap().is_empty());
        assert!(vectors.points.lock().unwrap().is_empty());
        assert!(meta.find_folder_by_path("/repo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_folder_is_idempotent() {
        let (indexer, _, _) = make_indexer(vec![]);
        indexer.remove_folder("/never-registered").await.unwrap();
    }
}
