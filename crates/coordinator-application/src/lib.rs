//! # Application layer
//!
//! Use cases that orchestrate the domain ports into the coordinator's three
//! fused subsystems: the indexing pipeline, the tool-call chat orchestrator,
//! and sub-agent spawning. No concrete adapters live here — every external
//! dependency is consumed through a `coordinator_domain::ports` trait.

pub mod use_cases;

pub use use_cases::chat_orchestrator::{
    ChatOrchestrator, OrchestratorConfig, OrchestratorFactory, TurnInput,
};
pub use use_cases::health_probe::{HealthProbe, HealthReport, HealthStatus, ServiceHealth};
pub use use_cases::indexer::{Indexer, ScanSummary};
pub use use_cases::subagent_runner::{SubAgentRunner, SUBAGENT_TOOL_NAME};
