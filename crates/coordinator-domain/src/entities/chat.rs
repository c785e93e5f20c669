//! The `ChatSession` and `ChatMessage` entities.

use chrono::{DateTime, Utc};

use crate::value_objects::{MessageId, MessageRole, SessionId, SubAgentId, ToolCallId};

/// A conversation between a user and the assistant.
///
/// Created at session open; mutated only by the owning user; destroyed by
/// explicit delete or purge (both out of scope for this crate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    /// Stable identifier.
    pub id: SessionId,
    /// The owning user.
    pub user_id: String,
    /// The owning company.
    pub company_id: String,
    /// Display title.
    pub title: String,
    /// The sub-agent currently bound to this session, if any.
    pub active_subagent_id: Option<SubAgentId>,
    /// The parent session, if this session was created by `execute_subagent`.
    pub parent_session_id: Option<SessionId>,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    /// Last time a message was appended.
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Open a brand new top-level session.
    #[must_use]
    pub fn open(user_id: String, company_id: String, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id,
            company_id,
            title,
            active_subagent_id: None,
            parent_session_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Open a child session for a sub-agent invocation.
    #[must_use]
    pub fn open_child(
        user_id: String,
        company_id: String,
        subagent_id: SubAgentId,
        parent_session_id: SessionId,
        title: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id,
            company_id,
            title,
            active_subagent_id: Some(subagent_id),
            parent_session_id: Some(parent_session_id),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One append-only entry in a session's transcript.
///
/// Ordering by `created_at` with a monotonic tie-break (the identifier,
/// generated in insertion order) is the canonical transcript order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Stable identifier; also the tie-break for ordering.
    pub id: MessageId,
    /// The owning session.
    pub session_id: SessionId,
    /// Who authored the message.
    pub role: MessageRole,
    /// The message text (or tool result payload, serialized).
    pub content: String,
    /// The tool call this message answers, if `role == Tool`.
    pub tool_call_id: Option<ToolCallId>,
    /// The tool name this message answers, if `role == Tool`.
    pub tool_name: Option<String>,
    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Construct a user-authored message.
    #[must_use]
    pub fn user(session_id: SessionId, content: String) -> Self {
        Self::new(session_id, MessageRole::User, content, None, None)
    }

    /// Construct an assistant-authored message.
    #[must_use]
    pub fn assistant(session_id: SessionId, content: String) -> Self {
        Self::new(session_id, MessageRole::Assistant, content, None, None)
    }

    /// Construct a tool-result message.
    #[must_use]
    pub fn tool(
        session_id: SessionId,
        content: String,
        tool_call_id: ToolCallId,
        tool_name: String,
    ) -> Self {
        Self::new(
            session_id,
            MessageRole::Tool,
            content,
            Some(tool_call_id),
            Some(tool_name),
        )
    }

    fn new(
        session_id: SessionId,
        role: MessageRole,
        content: String,
        tool_call_id: Option<ToolCallId>,
        tool_name: Option<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            session_id,
            role,
            content,
            tool_call_id,
            tool_name,
            created_at: Utc::now(),
        }
    }
}
