//! The `bash` tool: runs a shell command under a deadline, refusing
//! destructive patterns and system directories.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use coordinator_domain::constants::BASH_TIMEOUT_SECS;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::tool::{ToolContext, ToolExecutor, ToolSchema};
use serde_json::{json, Value};
use tokio::process::Command;

use super::path_capability::touches_denied_system_dir;

/// Command substrings that are always refused, regardless of working
/// directory: filesystem-wide destruction and disk-level writes.
const DENIED_PATTERNS: &[&str] = &["rm -rf /", "mkfs", "dd if=", ":(){ :|:& };:", "> /dev/sda"];

/// Runs an arbitrary shell command with a bounded deadline.
pub struct BashTool {
    timeout: Duration,
}

impl BashTool {
    /// Build a bash tool with the default [`BASH_TIMEOUT_SECS`] deadline.
    #[must_use]
    pub fn new() -> Self {
        Self { timeout: Duration::from_secs(BASH_TIMEOUT_SECS) }
    }

    /// Build a bash tool with an explicit deadline, for testing.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for BashTool {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_command(command: &str) -> Result<()> {
    for pattern in DENIED_PATTERNS {
        if command.contains(pattern) {
            return Err(Error::tool_denied(format!("command matches a denied pattern: '{pattern}'")));
        }
    }
    for token in command.split_whitespace() {
        if token.starts_with('/') && touches_denied_system_dir(std::path::Path::new(token)) {
            return Err(Error::tool_denied(format!("command touches a denied system directory: '{token}'")));
        }
    }
    Ok(())
}

#[async_trait]
impl ToolExecutor for BashTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "bash".to_owned(),
            description: "Run a shell command and return its stdout, stderr, and exit code.".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "command": { "type": "string" } },
                "required": ["command"],
            }),
        }
    }

    async fn execute(&self, ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        let command = args
            .get("command")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("bash tool requires a string 'command' argument"))?;
        validate_command(command)?;

        let start = Instant::now();
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::internal(format!("spawning bash command: {err}")))?;

        let output = tokio::select! {
            result = child.wait_with_output() => {
                result.map_err(|err| Error::internal(format!("waiting for bash command: {err}")))?
            }
            () = tokio::time::sleep(self.timeout) => {
                return Err(Error::transient("bash", format!("command timed out after {:?}", self.timeout)));
            }
            () = ctx.cancellation.cancelled() => {
                return Err(Error::internal("bash command cancelled"));
            }
        };

        Ok(json!({
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
            "exitCode": output.status.code().unwrap_or(-1),
            "durationMs": start.elapsed().as_millis() as u64,
        }))
    }
}
