//! Conversions between `sea-orm` row models and domain entities, one
//! function pair per entity, mirroring each table's shape in
//! `super::entities`.

use std::collections::HashMap;
use std::str::FromStr;

use coordinator_domain::entities::{
    ChatMessage, ChatSession, FileChunk, HttpToolDefinition, HttpToolParameter, IndexedFile,
    IndexedFolder, KnowledgeEntry, SubAgentDefinition, SystemPrompt, ToolScope,
};
use coordinator_domain::error::{Error, Result};
use coordinator_domain::value_objects::{
    ChunkId, FileId, FolderId, FolderStatus, KnowledgeEntryId, MessageId, MessageRole, SessionId,
    SubAgentId, ToolCallId,
};

use super::entities::{chunk, file, folder, http_tool, knowledge_entry, message, session, subagent, system_prompt};

fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse().map_err(|_| Error::internal(format!("corrupt {what} id stored: '{raw}'")))
}

// -- folders ----------------------------------------------------------------

pub fn folder_status_to_string(status: FolderStatus) -> String {
    match status {
        FolderStatus::Active => "active",
        FolderStatus::Scanning => "scanning",
        FolderStatus::Error => "error",
    }
    .to_owned()
}

fn folder_status_from_str(raw: &str) -> Result<FolderStatus> {
    match raw {
        "active" => Ok(FolderStatus::Active),
        "scanning" => Ok(FolderStatus::Scanning),
        "error" => Ok(FolderStatus::Error),
        other => Err(Error::internal(format!("corrupt folder status stored: '{other}'"))),
    }
}

pub fn folder_to_model(folder: &IndexedFolder) -> folder::Model {
    folder::Model {
        id: folder.id.to_string(),
        absolute_path: folder.absolute_path.clone(),
        description: folder.description.clone(),
        status: folder_status_to_string(folder.status),
        added_at: folder.added_at,
        last_scanned_at: folder.last_scanned_at,
        file_count: folder.file_count as i64,
        last_error: folder.last_error.clone(),
    }
}

pub fn folder_from_model(model: folder::Model) -> Result<IndexedFolder> {
    Ok(IndexedFolder {
        id: parse_id::<FolderId>(&model.id, "folder")?,
        absolute_path: model.absolute_path,
        description: model.description,
        status: folder_status_from_str(&model.status)?,
        added_at: model.added_at,
        last_scanned_at: model.last_scanned_at,
        file_count: model.file_count.max(0) as u64,
        last_error: model.last_error,
    })
}

// -- files --------------------------------------------------------------------

pub fn file_to_model(file: &IndexedFile) -> file::Model {
    file::Model {
        id: file.id.to_string(),
        folder_id: file.folder_id.to_string(),
        absolute_path: file.absolute_path.clone(),
        relative_path: file.relative_path.clone(),
        language: file.language.clone(),
        content_hash: file.content_hash.clone(),
        size: file.size as i64,
        line_count: file.line_count as i64,
        chunk_count: file.chunk_count as i32,
        indexed_at: file.indexed_at,
    }
}

pub fn file_from_model(model: file::Model) -> Result<IndexedFile> {
    Ok(IndexedFile {
        id: parse_id::<FileId>(&model.id, "file")?,
        folder_id: parse_id::<FolderId>(&model.folder_id, "folder")?,
        absolute_path: model.absolute_path,
        relative_path: model.relative_path,
        language: model.language,
        content_hash: model.content_hash,
        size: model.size.max(0) as u64,
        line_count: model.line_count.max(0) as u64,
        chunk_count: model.chunk_count.max(0) as u32,
        indexed_at: model.indexed_at,
    })
}

// -- chunks -------------------------------------------------------------------

pub fn chunk_to_model(chunk: &FileChunk) -> chunk::Model {
    chunk::Model {
        id: chunk.id.to_string(),
        file_id: chunk.file_id.to_string(),
        chunk_number: chunk.chunk_number as i32,
        content: chunk.content.clone(),
        start_line: chunk.start_line as i64,
        end_line: chunk.end_line as i64,
        vector_id: chunk.vector_id.clone(),
    }
}

pub fn chunk_from_model(model: chunk::Model) -> Result<FileChunk> {
    Ok(FileChunk {
        id: parse_id::<ChunkId>(&model.id, "chunk")?,
        file_id: parse_id::<FileId>(&model.file_id, "file")?,
        chunk_number: model.chunk_number.max(0) as u32,
        content: model.content,
        start_line: model.start_line.max(0) as u64,
        end_line: model.end_line.max(0) as u64,
        vector_id: model.vector_id,
    })
}

// -- chat sessions & messages ---------------------------------------------------

pub fn session_to_model(session: &ChatSession) -> session::Model {
    session::Model {
        id: session.id.to_string(),
        user_id: session.user_id.clone(),
        company_id: session.company_id.clone(),
        title: session.title.clone(),
        active_subagent_id: session.active_subagent_id.map(|id| id.to_string()),
        parent_session_id: session.parent_session_id.map(|id| id.to_string()),
        created_at: session.created_at,
        updated_at: session.updated_at,
    }
}

pub fn session_from_model(model: session::Model) -> Result<ChatSession> {
    Ok(ChatSession {
        id: parse_id::<SessionId>(&model.id, "session")?,
        user_id: model.user_id,
        company_id: model.company_id,
        title: model.title,
        active_subagent_id: model
            .active_subagent_id
            .map(|raw| parse_id::<SubAgentId>(&raw, "subagent"))
            .transpose()?,
        parent_session_id: model
            .parent_session_id
            .map(|raw| parse_id::<SessionId>(&raw, "session"))
            .transpose()?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn message_role_to_string(role: MessageRole) -> String {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "system",
        MessageRole::Tool => "tool",
    }
    .to_owned()
}

fn message_role_from_str(raw: &str) -> Result<MessageRole> {
    match raw {
        "user" => Ok(MessageRole::User),
        "assistant" => Ok(MessageRole::Assistant),
        "system" => Ok(MessageRole::System),
        "tool" => Ok(MessageRole::Tool),
        other => Err(Error::internal(format!("corrupt message role stored: '{other}'"))),
    }
}

pub fn message_to_model(message: &ChatMessage) -> message::Model {
    message::Model {
        id: message.id.to_string(),
        session_id: message.session_id.to_string(),
        role: message_role_to_string(message.role),
        content: message.content.clone(),
        tool_call_id: message.tool_call_id.as_ref().map(|id| id.0.clone()),
        tool_name: message.tool_name.clone(),
        created_at: message.created_at,
    }
}

pub fn message_from_model(model: message::Model) -> Result<ChatMessage> {
    Ok(ChatMessage {
        id: parse_id::<MessageId>(&model.id, "message")?,
        session_id: parse_id::<SessionId>(&model.session_id, "session")?,
        role: message_role_from_str(&model.role)?,
        content: model.content,
        tool_call_id: model.tool_call_id.map(ToolCallId),
        tool_name: model.tool_name,
        created_at: model.created_at,
    })
}

// -- sub-agents & system prompts -------------------------------------------------

fn tools_to_json(tools: &ToolScope) -> String {
    match tools {
        ToolScope::All => "\"*\"".to_owned(),
        ToolScope::Named(names) => serde_json::to_string(names).unwrap_or_default(),
    }
}

fn tools_from_json(raw: &str) -> Result<ToolScope> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value == serde_json::Value::String("*".to_owned()) {
        return Ok(ToolScope::All);
    }
    let names: Vec<String> = serde_json::from_value(value)?;
    Ok(ToolScope::Named(names))
}

pub fn subagent_to_model(subagent: &SubAgentDefinition) -> subagent::Model {
    subagent::Model {
        id: subagent.id.to_string(),
        name: subagent.name.clone(),
        description: subagent.description.clone(),
        system_prompt: subagent.system_prompt.clone(),
        tools_json: tools_to_json(&subagent.tools),
        category: subagent.category.clone(),
        user_id: subagent.user_id.clone(),
        company_id: subagent.company_id.clone(),
    }
}

pub fn subagent_from_model(model: subagent::Model) -> Result<SubAgentDefinition> {
    Ok(SubAgentDefinition {
        id: parse_id::<SubAgentId>(&model.id, "subagent")?,
        name: model.name,
        description: model.description,
        system_prompt: model.system_prompt,
        tools: tools_from_json(&model.tools_json)?,
        category: model.category,
        user_id: model.user_id,
        company_id: model.company_id,
    })
}

pub fn system_prompt_to_model(prompt: &SystemPrompt) -> system_prompt::Model {
    system_prompt::Model {
        user_id: prompt.user_id.clone(),
        company_id: prompt.company_id.clone(),
        text: prompt.text.clone(),
        updated_at: prompt.updated_at,
    }
}

pub fn system_prompt_from_model(model: system_prompt::Model) -> SystemPrompt {
    SystemPrompt { user_id: model.user_id, company_id: model.company_id, text: model.text, updated_at: model.updated_at }
}

// -- HTTP tool definitions --------------------------------------------------------

pub fn http_tool_to_model(tool: &HttpToolDefinition) -> Result<http_tool::Model> {
    Ok(http_tool::Model {
        name: tool.name.clone(),
        description: tool.description.clone(),
        endpoint: tool.endpoint.clone(),
        method: tool.method.clone(),
        headers_json: serde_json::to_string(&tool.headers)?,
        parameters_json: serde_json::to_string(&tool.parameters.iter().map(parameter_to_json).collect::<Vec<_>>())?,
        auth_type: tool.auth_type.clone(),
        auth_config_json: serde_json::to_string(&tool.auth_config)?,
    })
}

fn parameter_to_json(parameter: &HttpToolParameter) -> serde_json::Value {
    serde_json::json!({
        "name": parameter.name,
        "schemaType": parameter.schema_type,
        "required": parameter.required,
        "description": parameter.description,
    })
}

pub fn http_tool_from_model(model: http_tool::Model) -> Result<HttpToolDefinition> {
    let headers: HashMap<String, String> = serde_json::from_str(&model.headers_json)?;
    let auth_config: HashMap<String, String> = serde_json::from_str(&model.auth_config_json)?;
    let raw_parameters: Vec<serde_json::Value> = serde_json::from_str(&model.parameters_json)?;
    let parameters = raw_parameters
        .into_iter()
        .map(|value| HttpToolParameter {
            name: value["name"].as_str().unwrap_or_default().to_owned(),
            schema_type: value["schemaType"].as_str().unwrap_or_default().to_owned(),
            required: value["required"].as_bool().unwrap_or(false),
            description: value["description"].as_str().unwrap_or_default().to_owned(),
        })
        .collect();
    Ok(HttpToolDefinition {
        name: model.name,
        description: model.description,
        endpoint: model.endpoint,
        method: model.method,
        headers,
        parameters,
        auth_type: model.auth_type,
        auth_config,
    })
}

// -- knowledge entries ---------------------------------------------------------

pub fn knowledge_entry_to_model(entry: &KnowledgeEntry) -> Result<knowledge_entry::Model> {
    Ok(knowledge_entry::Model {
        id: entry.id.to_string(),
        collection: entry.collection.clone(),
        text: entry.text.clone(),
        metadata_json: serde_json::to_string(&entry.metadata)?,
        created_at: entry.created_at,
    })
}

pub fn knowledge_entry_from_model(model: knowledge_entry::Model) -> Result<KnowledgeEntry> {
    let metadata: HashMap<String, String> = serde_json::from_str(&model.metadata_json)?;
    Ok(KnowledgeEntry {
        id: parse_id::<KnowledgeEntryId>(&model.id, "knowledge entry")?,
        collection: model.collection,
        text: model.text,
        metadata,
        created_at: model.created_at,
    })
}
