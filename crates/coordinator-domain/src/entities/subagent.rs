//! The `SubAgentDefinition`, `SystemPrompt`, and `HTTPToolDefinition` entities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::value_objects::SubAgentId;

/// Maximum length of a system prompt or sub-agent system prompt, in bytes.
pub const MAX_SYSTEM_PROMPT_LEN: usize = 10_000;

/// Which tools a sub-agent may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolScope {
    /// Every tool in the registry.
    All,
    /// A named subset of registry tools.
    Named(Vec<String>),
}

/// A named `(systemPrompt, tool-subset)` bundle that parameterizes a nested
/// orchestrator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAgentDefinition {
    /// Stable identifier.
    pub id: SubAgentId,
    /// Unique name, 3-50 chars.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The system prompt this sub-agent runs with.
    pub system_prompt: String,
    /// The tools this sub-agent may invoke.
    pub tools: ToolScope,
    /// Optional grouping label.
    pub category: Option<String>,
    /// Owning user; `None` means system-seeded.
    pub user_id: Option<String>,
    /// Owning company; `None` means system-seeded.
    pub company_id: Option<String>,
}

impl SubAgentDefinition {
    /// Validate and construct a sub-agent definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `name` is outside 3-50 chars or
    /// `system_prompt` exceeds [`MAX_SYSTEM_PROMPT_LEN`].
    pub fn new(
        name: String,
        description: String,
        system_prompt: String,
        tools: ToolScope,
        category: Option<String>,
        user_id: Option<String>,
        company_id: Option<String>,
    ) -> Result<Self> {
        if !(3..=50).contains(&name.chars().count()) {
            return Err(Error::validation(
                "sub-agent name must be 3-50 characters",
            ));
        }
        if system_prompt.len() > MAX_SYSTEM_PROMPT_LEN {
            return Err(Error::validation(format!(
                "sub-agent system prompt exceeds {MAX_SYSTEM_PROMPT_LEN} characters"
            )));
        }
        Ok(Self {
            id: SubAgentId::new(),
            name,
            description,
            system_prompt,
            tools,
            category,
            user_id,
            company_id,
        })
    }

    /// Whether `tool_name` is usable by this sub-agent.
    #[must_use]
    pub fn allows_tool(&self, tool_name: &str) -> bool {
        match &self.tools {
            ToolScope::All => true,
            ToolScope::Named(names) => names.iter().any(|n| n == tool_name),
        }
    }
}

/// A per-`(userId, companyId)` default system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    /// Owning user.
    pub user_id: String,
    /// Owning company.
    pub company_id: String,
    /// The prompt text, at most [`MAX_SYSTEM_PROMPT_LEN`] characters.
    pub text: String,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// An HTTP-backed tool definition, used only at `ToolRegistry` registration
/// time. Immutable once registered; an update is modeled as delete + create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description, exposed to the LLM.
    pub description: String,
    /// The HTTP endpoint to call.
    pub endpoint: String,
    /// The HTTP method to use.
    pub method: String,
    /// Static headers to attach to every call.
    pub headers: HashMap<String, String>,
    /// The JSON-schema-shaped parameter list, keyed by parameter name.
    pub parameters: Vec<HttpToolParameter>,
    /// Authentication scheme.
    pub auth_type: String,
    /// Authentication configuration (e.g. the header name for a bearer token).
    pub auth_config: HashMap<String, String>,
}

/// A single parameter of an [`HttpToolDefinition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpToolParameter {
    /// Parameter name.
    pub name: String,
    /// JSON-schema type name (`"string"`, `"number"`, ...).
    pub schema_type: String,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Human-readable description.
    pub description: String,
}
