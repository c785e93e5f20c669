//! The `EventSink` port: an abstract duplex channel to the UI.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, Result};
use crate::value_objects::ToolCallId;

/// One outbound event emitted during a turn. Ordering per session is
/// preserved by the sink; a `Done` or `Error` terminates the turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// An incremental text fragment of the assistant's turn.
    Token {
        /// The text fragment.
        content: String,
        /// The tool call this token is narrating progress for, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<ToolCallId>,
    },
    /// The LLM requests execution of a tool.
    ToolCall {
        /// Opaque id correlating this call to its result.
        id: ToolCallId,
        /// The tool's name.
        name: String,
        /// The raw JSON arguments, as a string (matches the wire shape).
        args_json: String,
    },
    /// A small tool result, delivered whole.
    ToolResult {
        /// The originating tool call's id.
        id: ToolCallId,
        /// The tool's JSON result.
        result: serde_json::Value,
        /// How long the tool took to execute.
        duration_ms: u64,
        /// The error message, if the tool failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// One fragment of a large tool result, reassembled by `(id, seq)`.
    ToolResultChunk {
        /// The originating tool call's id.
        id: ToolCallId,
        /// 0-based sequence number within this tool call's chunk stream.
        seq: u32,
        /// The fragment's text.
        content: String,
        /// Whether this is the last fragment.
        done: bool,
    },
    /// The turn failed.
    Error {
        /// The stable error discriminator.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
    /// The turn completed successfully.
    Done,
}

/// One inbound message from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A new user message, starting or continuing a turn.
    UserMessage {
        /// The message text.
        content: String,
    },
    /// Request cancellation of the in-flight turn, if any.
    Cancel,
}

/// An abstract duplex channel to the UI. Implementations serialize to
/// whatever transport is in use (WebSocket, SSE, in-process channel, ...);
/// the contract is ordering-per-session plus a terminal event per turn.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emit one outbound event. Writes per session are serialized by the
    /// caller (the orchestrator); if the sink blocks, the caller blocks.
    async fn emit(&self, event: OutboundEvent) -> Result<()>;
}
