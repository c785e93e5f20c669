//! Core domain entities, named and shaped after the data model.

mod chat;
mod chunk;
mod folder;
mod knowledge;
mod subagent;

pub use chat::{ChatMessage, ChatSession};
pub use chunk::{FileChunk, IndexedFile};
pub use folder::IndexedFolder;
pub use knowledge::KnowledgeEntry;
pub use subagent::{HttpToolDefinition, SubAgentDefinition, SystemPrompt, ToolScope};
