//! # Infrastructure layer
//!
//! Concrete adapters for every port declared in `coordinator_domain::ports`:
//! filesystem scanning and watching, a SQLite-backed meta store, HTTP
//! clients for the embedding/vector-store/LLM collaborators, the built-in
//! tool executors, plus the ambient concerns (configuration, logging,
//! retry) that sit outside the hexagon.

pub mod config;
pub mod debouncer;
pub mod domain_events;
pub mod embedding_client;
pub mod file_scanner;
pub mod file_watcher;
pub mod llm_provider;
pub mod logging;
pub mod meta_store;
pub mod path_mapper;
pub mod retry;
pub mod tools;
pub mod vector_store;

pub use config::CoordinatorConfig;
pub use debouncer::Debouncer;
pub use domain_events::TracingDomainEventPublisher;
pub use embedding_client::HttpEmbeddingClient;
pub use file_scanner::WalkingFileScanner;
pub use file_watcher::NotifyFileWatcher;
pub use llm_provider::HttpLlmProvider;
pub use meta_store::SeaOrmMetaStore;
pub use path_mapper::PathMapper;
pub use vector_store::HttpVectorStore;
