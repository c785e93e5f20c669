//! `read_file`, `write_file`, and `list_directory`: path-validated, size-capped
//! file I/O. Writes are atomic (temp file + rename).

use std::collections::HashMap;

use async_trait::async_trait;
use coordinator_domain::constants::{LIST_DIRECTORY_MAX_ENTRIES, READ_FILE_MAX_BYTES, WRITE_FILE_MAX_BYTES};
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::tool::{ToolContext, ToolExecutor, ToolSchema};
use serde_json::{json, Value};

use super::path_capability::PathCapability;

fn required_str<'a>(args: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::validation(format!("tool requires a string '{key}' argument")))
}

/// Reads a file's contents, capped at [`READ_FILE_MAX_BYTES`].
pub struct ReadFileTool {
    capability: PathCapability,
}

impl ReadFileTool {
    /// Build a read tool scoped to `capability`.
    #[must_use]
    pub fn new(capability: PathCapability) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl ToolExecutor for ReadFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "read_file".to_owned(),
            description: "Read a file's contents.".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "path": { "type": "string" } },
                "required": ["path"],
            }),
        }
    }

    async fn execute(&self, _ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        let path = self.capability.validate(required_str(&args, "path")?)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|err| Error::io(format!("stat {}", path.display()), err))?;
        if metadata.len() > READ_FILE_MAX_BYTES {
            return Err(Error::validation(format!(
                "{} is {} bytes, exceeding the {READ_FILE_MAX_BYTES}-byte read cap",
                path.display(),
                metadata.len()
            )));
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| Error::io(format!("reading {}", path.display()), err))?;
        Ok(json!({ "content": content }))
    }
}

/// Writes a file's contents atomically (temp file + rename), capped at
/// [`WRITE_FILE_MAX_BYTES`].
pub struct WriteFileTool {
    capability: PathCapability,
}

impl WriteFileTool {
    /// Build a write tool scoped to `capability`.
    #[must_use]
    pub fn new(capability: PathCapability) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl ToolExecutor for WriteFileTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "write_file".to_owned(),
            description: "Write a file's contents, replacing it atomically.".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "content": { "type": "string" },
                },
                "required": ["path", "content"],
            }),
        }
    }

    async fn execute(&self, _ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        let path = self.capability.validate(required_str(&args, "path")?)?;
        let content = required_str(&args, "content")?;
        if content.len() as u64 > WRITE_FILE_MAX_BYTES {
            return Err(Error::validation(format!(
                "write of {} bytes exceeds the {WRITE_FILE_MAX_BYTES}-byte write cap",
                content.len()
            )));
        }
        write_atomic(&path, content).await?;
        Ok(json!({ "bytesWritten": content.len() }))
    }
}

async fn write_atomic(path: &std::path::Path, content: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| Error::validation("path has no parent directory"))?;
    let temp_path = parent.join(format!(".{}.tmp-{}", file_name(path), uuid::Uuid::new_v4()));
    tokio::fs::write(&temp_path, content)
        .await
        .map_err(|err| Error::io(format!("writing temp file for {}", path.display()), err))?;
    tokio::fs::rename(&temp_path, path).await.map_err(|err| {
        Error::io(format!("renaming temp file into place at {}", path.display()), err)
    })
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| "file".to_owned())
}

/// Lists a directory's immediate entries, capped at [`LIST_DIRECTORY_MAX_ENTRIES`].
pub struct ListDirectoryTool {
    capability: PathCapability,
}

impl ListDirectoryTool {
    /// Build a list tool scoped to `capability`.
    #[must_use]
    pub fn new(capability: PathCapability) -> Self {
        Self { capability }
    }
}

#[async_trait]
impl ToolExecutor for ListDirectoryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "list_directory".to_owned(),
            description: "List a directory's immediate entries.".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "path": { "type": "string" } },
                "required": ["path"],
            }),
        }
    }

    async fn execute(&self, _ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        let path = self.capability.validate(required_str(&args, "path")?)?;
        let mut read_dir = tokio::fs::read_dir(&path)
            .await
            .map_err(|err| Error::io(format!("listing {}", path.display()), err))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|err| Error::io(format!("reading directory entry under {}", path.display()), err))?
        {
            if entries.len() >= LIST_DIRECTORY_MAX_ENTRIES {
                break;
            }
            let file_type = entry.file_type().await.ok();
            entries.push(json!({
                "name": entry.file_name().to_string_lossy(),
                "isDirectory": file_type.is_some_and(|ft| ft.is_dir()),
            }));
        }

        Ok(json!({ "entries": entries }))
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

    fn path_args(path: &std::path::Path) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        map.insert("path".to_owned(), Value::String(path.to_string_lossy().into_owned()));
        map
    }

    #[tokio::test]
    async fn write_then_read_round_trips_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let capability = PathCapability::new(vec![dir.path().to_path_buf()]);
        let file_path = dir.path().join("notes.txt");

        let mut write_args = path_args(&file_path);
        write_args.insert("content".to_owned(), Value::String("hello world".to_owned()));
        WriteFileTool::new(capability.clone()).execute(&ctx(), write_args).await.unwrap();

        let read_result = ReadFileTool::new(capability).execute(&ctx(), path_args(&file_path)).await.unwrap();
        assert_eq!(read_result["content"], "hello world");
    }

    #[tokio::test]
    async fn read_rejects_a_path_outside_the_capability() {
        let dir = tempfile::tempdir().unwrap();
        let capability = PathCapability::new(vec![dir.path().join("allowed")]);
        let err =
            ReadFileTool::new(capability).execute(&ctx(), path_args(&dir.path().join("other.txt"))).await.unwrap_err();
        assert_eq!(err.kind(), coordinator_domain::error::ErrorKind::ToolDenied);
    }

    #[tokio::test]
    async fn list_directory_reports_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let capability = PathCapability::new(vec![dir.path().to_path_buf()]);
        let result = ListDirectoryTool::new(capability).execute(&ctx(), path_args(dir.path())).await.unwrap();
        assert_eq!(result["entries"].as_array().unwrap().len(), 2);
    }
}
