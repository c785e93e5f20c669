//! # Server layer
//!
//! Process wiring for the coordinator: assembles every infrastructure
//! adapter behind its domain port, serves the chat/indexing surface over
//! HTTP and WebSocket, and owns the lifecycle of background watchers. No
//! business logic lives here — this crate is glue.

pub mod bootstrap;
pub mod routes;
pub mod wire;

pub use bootstrap::{bootstrap, AppState};
pub use wire::WsEventSink;
