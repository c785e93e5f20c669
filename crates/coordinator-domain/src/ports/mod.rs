//! Port traits: the boundary between the application layer's use cases and
//! the infrastructure layer's adapters. Every trait here is `Send + Sync` and
//! `async_trait`, following the workspace's hexagonal convention.

pub mod domain_events;
pub mod embedding;
pub mod event_sink;
pub mod file_scanner;
pub mod llm_provider;
pub mod meta_store;
pub mod tool;
pub mod vector_store;

pub use domain_events::DomainEventPublisher;
pub use embedding::EmbeddingClient;
pub use event_sink::EventSink;
pub use file_scanner::FileScanner;
pub use llm_provider::LlmProvider;
pub use meta_store::MetaStore;
pub use tool::ToolExecutor;
pub use vector_store::VectorStore;
