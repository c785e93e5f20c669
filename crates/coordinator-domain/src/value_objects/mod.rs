//! Immutable value objects shared across entities and ports.

mod ids;

pub use ids::{
    ChunkId, CompanyId, FileId, FolderId, KnowledgeEntryId, MessageId, OperationId, SessionId,
    SubAgentId, TenantContext, ToolCallId, UserId,
};

/// A folder's lifecycle status, per the data model's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    /// The folder is registered and its last scan (if any) succeeded.
    Active,
    /// A scan is currently in progress.
    Scanning,
    /// The last scan ended in a fatal failure; see `last_error`.
    Error,
}

/// A chat message's role, per the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// A message authored by the end user.
    User,
    /// A message authored by the assistant.
    Assistant,
    /// A synthetic system prompt, prepended in-memory only.
    System,
    /// The result of a tool invocation, appended to the transcript.
    Tool,
}

/// The outcome of classifying one observed file against `MetaStore` state
/// during a scan or single-file event, per the Indexer's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTransition {
    /// File present on disk, no prior `MetaStore` record.
    New,
    /// File present on disk; `contentHash` matches the stored record.
    Unchanged,
    /// File present on disk; `contentHash` differs from the stored record.
    Updated,
    /// File absent from disk; a `MetaStore` record still exists.
    Missing,
}
