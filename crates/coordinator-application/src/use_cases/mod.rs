//! Use cases: one module per long-lived orchestration the coordinator owns.

pub mod chat_orchestrator;
pub mod health_probe;
pub mod indexer;
pub mod subagent_runner;
