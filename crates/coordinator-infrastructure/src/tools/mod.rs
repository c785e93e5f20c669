//! Built-in `ToolExecutor` implementations registered into the
//! `ToolRegistry` at process start: `bash`, the file/patch tools, and the
//! knowledge-query tools. `execute_subagent` lives in
//! `coordinator_application::SubAgentRunner` since it closes over an
//! orchestrator factory rather than an infrastructure adapter.

mod apply_patch;
mod bash;
mod file_io;
mod knowledge;
mod path_capability;

pub use apply_patch::ApplyPatchTool;
pub use bash::BashTool;
pub use file_io::{ListDirectoryTool, ReadFileTool, WriteFileTool};
pub use knowledge::{KnowledgeFindTool, KnowledgeStoreTool};
pub use path_capability::PathCapability;
