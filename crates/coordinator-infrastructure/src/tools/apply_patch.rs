//! `apply_patch`: applies unified-diff text to a single target file,
//! inferring the target path from its headers and supporting a dry-run mode.

use std::collections::HashMap;

use async_trait::async_trait;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::tool::{ToolContext, ToolExecutor, ToolSchema};
use serde_json::{json, Value};

use super::path_capability::PathCapability;

/// One line within a hunk: context, addition, or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HunkLineKind {
    Context,
    Add,
    Remove,
}

struct ParsedPatch {
    target_path: String,
    hunks: Vec<Vec<(HunkLineKind, String)>>,
}

/// Infers the target path from a unified-diff's headers and parses its hunks.
fn parse_patch(patch_text: &str) -> Result<ParsedPatch> {
    let mut target_path = None;
    let mut hunks = Vec::new();
    let mut current_hunk: Option<Vec<(HunkLineKind, String)>> = None;

    for line in patch_text.lines() {
        if let Some(path) = line.strip_prefix("+++ b/") {
            target_path = Some(path.to_owned());
        } else if let Some(path) = line.strip_prefix("*** Update File: ") {
            target_path = Some(path.trim().to_owned());
        } else if line.starts_with("--- a/") || line.starts_with("--- ") || line.starts_with("+++ ") {
            // Source-side header or a plain +++ without the b/ prefix; not the target.
        } else if line.starts_with("@@") {
            if let Some(hunk) = current_hunk.take() {
                hunks.push(hunk);
            }
            current_hunk = Some(Vec::new());
        } else if let Some(hunk) = current_hunk.as_mut() {
            if let Some(added) = line.strip_prefix('+') {
                hunk.push((HunkLineKind::Add, added.to_owned()));
            } else if let Some(removed) = line.strip_prefix('-') {
                hunk.push((HunkLineKind::Remove, removed.to_owned()));
            } else {
                let context = line.strip_prefix(' ').unwrap_or(line);
                hunk.push((HunkLineKind::Context, context.to_owned()));
            }
        }
    }
    if let Some(hunk) = current_hunk.take() {
        hunks.push(hunk);
    }

    let target_path = target_path.ok_or_else(|| {
        Error::validation("patch has no '+++ b/...' or '*** Update File: ...' header to infer a target path")
    })?;
    Ok(ParsedPatch { target_path, hunks })
}

/// Applies `hunks` to `original`, matching each hunk's context/removal lines
/// against the next unconsumed lines of `original` in order.
fn apply_hunks(original: &str, hunks: &[Vec<(HunkLineKind, String)>]) -> Result<String> {
    let original_lines: Vec<&str> = original.lines().collect();
    let mut cursor = 0usize;
    let mut output = Vec::new();

    for hunk in hunks {
        let anchor = hunk
            .iter()
            .find(|(kind, _)| *kind != HunkLineKind::Add)
            .map(|(_, text)| text.as_str());
        if let Some(anchor) = anchor {
            match original_lines[cursor..].iter().position(|line| *line == anchor) {
                Some(offset) => {
                    output.extend(original_lines[cursor..cursor + offset].iter().copied());
                    cursor += offset;
                }
                None => return Err(Error::validation("patch hunk context does not match the file contents")),
            }
        }
        for (kind, text) in hunk {
            match kind {
                HunkLineKind::Context => {
                    if original_lines.get(cursor) != Some(&text.as_str()) {
                        return Err(Error::validation("patch hunk context does not match the file contents"));
                    }
                    output.push(text.as_str());
                    cursor += 1;
                }
                HunkLineKind::Remove => {
                    if original_lines.get(cursor) != Some(&text.as_str()) {
                        return Err(Error::validation("patch hunk removal does not match the file contents"));
                    }
                    cursor += 1;
                }
                HunkLineKind::Add => output.push(text.as_str()),
            }
        }
    }
    output.extend(original_lines[cursor..].iter().copied());

    let mut result = output.join("\n");
    if original.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

/// Applies unified-diff text to a single target file, inferred from the
/// patch's own headers.
pub struct ApplyPatchTool {
    capability: PathCapability,
}

impl ApplyPatchTool {
    /// Build an apply-patch tool scoped to `capability`.
    #[must_use]
    pub fn new(capability: PathCapability) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl ToolExecutor for ApplyPatchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "apply_patch".to_owned(),
            description: "Apply unified-diff text to the file it targets; supports dryRun.".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "patch": { "type": "string" },
                    "dryRun": { "type": "boolean" },
                },
                "required": ["patch"],
            }),
        }
    }

    async fn execute(&self, _ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        let patch_text = args
            .get("patch")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("apply_patch requires a string 'patch' argument"))?;
        let dry_run = args.get("dryRun").and_then(Value::as_bool).unwrap_or(false);

        let parsed = parse_patch(patch_text)?;
        let target = self.capability.validate(&parsed.target_path)?;

        let original = tokio::fs::read_to_string(&target)
            .await
            .map_err(|err| Error::io(format!("reading {}", target.display()), err))?;
        let patched = apply_hunks(&original, &parsed.hunks)?;

        if !dry_run {
            tokio::fs::write(&target, &patched)
                .await
                .map_err(|err| Error::io(format!("writing {}", target.display()), err))?;
        }

        Ok(json!({ "path": parsed.target_path, "applied": !dry_run, "bytesWritten": patched.len() }))
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use coordinator_domain::value_objects::{CompanyId, SessionId, UserId};

    fn ctx() -> ToolContext {
        ToolContext {
            user_id: UserId("u1".to_owned()),
            company_id: CompanyId("c1".to_owned()),
            session_id: SessionId::new(),
            recursion_depth: 0,
            cancellation: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn applies_a_single_line_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("greeting.txt");
        std::fs::write(&file_path, "line one\nline two\nline three\n").unwrap();

        let patch =
            "--- a/greeting.txt\n+++ b/greeting.txt\n@@ -1,3 +1,3 @@\n line one\n-line two\n+line TWO\n line three\n"
                .to_owned();
        let mut args = HashMap::new();
        args.insert("patch".to_owned(), Value::String(patch));

        let capability = PathCapability::new(vec![dir.path().to_path_buf()]);
        let tool = ApplyPatchTool::new(capability);
        let result = tool.execute(&ctx(), args).await.unwrap();
        assert_eq!(result["applied"], true);

        let patched = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(patched, "line one\nline TWO\nline three\n");
    }

    #[tokio::test]
    async fn dry_run_reports_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("greeting.txt");
        std::fs::write(&file_path, "line one\nline two\n").unwrap();

        let patch = "--- a/greeting.txt\n+++ b/greeting.txt\n@@ -1,2 +1,2 @@\n line one\n-line two\n+line TWO\n"
            .to_owned();
        let mut args = HashMap::new();
        args.insert("patch".to_owned(), Value::String(patch));
        args.insert("dryRun".to_owned(), Value::Bool(true));

        let capability = PathCapability::new(vec![dir.path().to_path_buf()]);
        let tool = ApplyPatchTool::new(capability);
        let result = tool.execute(&ctx(), args).await.unwrap();
        assert_eq!(result["applied"], false);
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "line one\nline two\n");
    }

    #[tokio::test]
    async fn mismatched_context_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("greeting.txt");
        std::fs::write(&file_path, "completely different contents\n").unwrap();

        let patch = "--- a/greeting.txt\n+++ b/greeting.txt\n@@ -1,1 +1,1 @@\n-line two\n+line TWO\n".to_owned();
        let mut args = HashMap::new();
        args.insert("patch".to_owned(), Value::String(patch));

        let capability = PathCapability::new(vec![dir.path().to_path_buf()]);
        let tool = ApplyPatchTool::new(capability);
        assert!(tool.execute(&ctx(), args).await.is_err());
    }
}
