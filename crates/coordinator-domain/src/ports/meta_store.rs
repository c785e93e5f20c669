//! The `MetaStore` port: durable, read-your-writes document storage for
//! every entity in the data model, with the secondary indexes named in the
//! persisted state layout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    ChatMessage, ChatSession, FileChunk, HttpToolDefinition, IndexedFile, IndexedFolder,
    KnowledgeEntry, SubAgentDefinition, SystemPrompt,
};
use crate::error::Result;
use crate::value_objects::{FileId, FolderId, KnowledgeEntryId, SessionId, SubAgentId};

/// Durable storage for every entity named in the data model.
///
/// Operations are read-your-writes on a single document; unique indexes are
/// enforced on `(folder.absolute_path)`, `(file.folder_id, file.absolute_path)`,
/// `(chunk.file_id, chunk.chunk_number)`, and `(subagent.name)`.
#[async_trait]
pub trait MetaStore: Send + Sync {
    // -- Folders ------------------------------------------------------

    /// Insert a new folder. Fails if `absolute_path` is already registered.
    async fn insert_folder(&self, folder: IndexedFolder) -> Result<()>;
    /// Fetch a folder by id.
    async fn get_folder(&self, id: FolderId) -> Result<IndexedFolder>;
    /// Fetch a folder by its absolute path, if registered.
    async fn find_folder_by_path(&self, absolute_path: &str) -> Result<Option<IndexedFolder>>;
    /// Persist an updated folder record.
    async fn update_folder(&self, folder: IndexedFolder) -> Result<()>;
    /// Delete a folder record. Idempotent.
    async fn delete_folder(&self, id: FolderId) -> Result<()>;
    /// List every registered folder.
    async fn list_folders(&self) -> Result<Vec<IndexedFolder>>;

    // -- Files ----------------------------------------------------------

    /// Insert a new file record.
    async fn insert_file(&self, file: IndexedFile) -> Result<()>;
    /// Fetch a file record by `(folder_id, absolute_path)`.
    async fn find_file_by_path(
        &self,
        folder_id: FolderId,
        absolute_path: &str,
    ) -> Result<Option<IndexedFile>>;
    /// Persist an updated file record.
    async fn update_file(&self, file: IndexedFile) -> Result<()>;
    /// Delete a file record. Idempotent.
    async fn delete_file(&self, id: FileId) -> Result<()>;
    /// List every file record under a folder.
    async fn list_files_for_folder(&self, folder_id: FolderId) -> Result<Vec<IndexedFile>>;

    // -- Chunks -----------------------------------------------------------

    /// Insert chunks for a file. Chunk numbers must be dense from 0.
    async fn insert_chunks(&self, chunks: Vec<FileChunk>) -> Result<()>;
    /// List every chunk owned by a file, ordered by `chunk_number`.
    async fn list_chunks_for_file(&self, file_id: FileId) -> Result<Vec<FileChunk>>;
    /// Delete every chunk owned by a file.
    async fn delete_chunks_for_file(&self, file_id: FileId) -> Result<()>;

    // -- Chat sessions & messages -----------------------------------------

    /// Insert a new chat session.
    async fn insert_session(&self, session: ChatSession) -> Result<()>;
    /// Fetch a chat session by id.
    async fn get_session(&self, id: SessionId) -> Result<ChatSession>;
    /// Persist an updated chat session.
    async fn update_session(&self, session: ChatSession) -> Result<()>;
    /// Append a message to a session's transcript. Append-only: never edits
    /// an existing message.
    async fn append_message(&self, message: ChatMessage) -> Result<()>;
    /// List a session's messages in canonical order (`created_at`, then id).
    async fn list_messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>>;

    // -- Sub-agents & system prompts ---------------------------------------

    /// Insert or update a sub-agent definition, keyed by its unique `name`.
    /// Upserts are idempotent and must not clobber a user-modified field with
    /// a system-seeded default (see `SubAgentRunner`'s seeding contract).
    async fn upsert_subagent(&self, subagent: SubAgentDefinition) -> Result<()>;
    /// Fetch a sub-agent definition by name.
    async fn find_subagent_by_name(&self, name: &str) -> Result<Option<SubAgentDefinition>>;
    /// Fetch a sub-agent definition by id.
    async fn get_subagent(&self, id: SubAgentId) -> Result<SubAgentDefinition>;

    /// Fetch the per-`(user, company)` system prompt, if one has been set.
    async fn get_system_prompt(
        &self,
        user_id: &str,
        company_id: &str,
    ) -> Result<Option<SystemPrompt>>;
    /// Set the per-`(user, company)` system prompt.
    async fn set_system_prompt(&self, prompt: SystemPrompt) -> Result<()>;

    // -- HTTP tool definitions ---------------------------------------------

    /// Register an HTTP tool definition. Immutable once registered.
    async fn insert_http_tool(&self, tool: HttpToolDefinition) -> Result<()>;
    /// List every registered HTTP tool definition.
    async fn list_http_tools(&self) -> Result<Vec<HttpToolDefinition>>;

    // -- Knowledge entries ---------------------------------------------------

    /// Insert a knowledge entry's metadata row.
    async fn insert_knowledge_entry(&self, entry: KnowledgeEntry) -> Result<()>;
    /// Fetch a knowledge entry by id.
    async fn get_knowledge_entry(&self, id: KnowledgeEntryId) -> Result<KnowledgeEntry>;

    // -- Tool invocation audit ------------------------------------------------

    /// Record a completed tool invocation for audit purposes.
    async fn record_tool_invocation(&self, record: ToolInvocationRecord) -> Result<()>;

    // -- Health -----------------------------------------------------------

    /// A trivial round-trip used by the health probe.
    async fn ping(&self) -> Result<()>;
}

/// An audit row for one completed tool invocation, supplementing the data
/// model with a durable record beyond the in-transcript `tool` message.
#[derive(Debug, Clone)]
pub struct ToolInvocationRecord {
    /// The session the invocation happened in.
    pub session_id: SessionId,
    /// The tool's name.
    pub tool_name: String,
    /// A stable digest of the arguments (not the raw arguments, which may be
    /// large or sensitive).
    pub args_digest: String,
    /// How long the invocation took.
    pub duration_ms: u64,
    /// The error kind, if the invocation failed.
    pub error_kind: Option<crate::error::ErrorKind>,
    /// When the invocation completed.
    pub completed_at: DateTime<Utc>,
}
