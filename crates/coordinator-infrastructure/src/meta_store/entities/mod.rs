//! `sea-orm` entity definitions, one module per table in the persisted
//! state layout. Enum-valued and structured columns are stored as plain
//! `String`/JSON-text columns and converted at the `store` boundary, rather
//! than leaning on `sea-orm`'s `DeriveActiveEnum` — keeps the schema legible
//! in raw SQL and side-steps a migration every time a variant is added.

pub mod chunk;
pub mod file;
pub mod folder;
pub mod http_tool;
pub mod knowledge_entry;
pub mod message;
pub mod session;
pub mod subagent;
pub mod system_prompt;
pub mod tool_invocation;
