//! The `ToolRegistry`'s executor shape: a uniform invocation boundary for
//! bash, file I/O, patch application, knowledge queries, and sub-agent
//! spawning.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::value_objects::{CompanyId, SessionId, UserId};

/// Ambient context passed to every tool invocation: who is calling, in which
/// session, at what sub-agent recursion depth, and a cancellation handle.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// The acting user.
    pub user_id: UserId,
    /// The acting user's company.
    pub company_id: CompanyId,
    /// The session the tool call belongs to.
    pub session_id: SessionId,
    /// Current sub-agent recursion depth (0 at the top-level turn).
    pub recursion_depth: u32,
    /// Cooperative cancellation handle for this turn.
    pub cancellation: tokio_util::sync::CancellationToken,
}

/// A tool's JSON-schema-shaped input description, keyed for LLM introspection.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    /// The tool's unique name.
    pub name: String,
    /// Human-readable description shown to the LLM.
    pub description: String,
    /// A JSON-schema object describing the expected arguments.
    pub input_schema: Value,
}

/// The uniform invocation shape every registered tool implements.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// This tool's schema, for registry introspection.
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the given arguments.
    ///
    /// Returns `Ok(value)` with the tool's JSON result on success, or an
    /// [`Error`] that the caller turns into `tool_result.error` (the turn
    /// continues either way — a failed tool call is still delivered to the
    /// model as a typed error, not an aborted turn).
    async fn execute(&self, ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value>;
}

/// Name -> executor registration, append-only after process start.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
    sealed: std::sync::atomic::AtomicBool,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            sealed: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Register a tool. Fails with [`Error::Validation`] if the name is
    /// already taken, or if the registry has been sealed (see [`Self::seal`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] on a duplicate name or a registration
    /// attempt after sealing.
    pub fn register(&mut self, executor: Arc<dyn ToolExecutor>) -> Result<()> {
        if self.sealed.load(std::sync::atomic::Ordering::Acquire) {
            return Err(Error::validation(
                "tool registry is sealed; no further registrations are allowed",
            ));
        }
        let name = executor.schema().name;
        if self.tools.contains_key(&name) {
            return Err(Error::validation(format!(
                "a tool named '{name}' is already registered"
            )));
        }
        self.tools.insert(name, executor);
        Ok(())
    }

    /// Seal the registry: read-only for the remainder of the process, per
    /// the concurrency model's "append-only at process start" rule.
    pub fn seal(&self) {
        self.sealed.store(true, std::sync::atomic::Ordering::Release);
    }

    /// List every registered tool's schema.
    #[must_use]
    pub fn list(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Describe a single tool by name.
    #[must_use]
    pub fn describe(&self, name: &str) -> Option<ToolSchema> {
        self.tools.get(name).map(|t| t.schema())
    }

    /// Invoke a tool by name. Callers are responsible for applying timeouts
    /// via `ctx.cancellation`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no tool is registered under `name`, or
    /// whatever error the tool itself returns.
    pub async fn execute(
        &self,
        ctx: &ToolContext,
        name: &str,
        args: HashMap<String, Value>,
    ) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::not_found(format!("tool '{name}'")))?
            .clone();
        tool.execute(ctx, args).await
    }
}
