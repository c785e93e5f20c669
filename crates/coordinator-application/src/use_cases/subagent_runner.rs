//! `SubAgentRunner`: the `execute_subagent` tool.
//!
//! Resolves a named [`SubAgentDefinition`], opens a child [`ChatSession`],
//! and drives a nested [`ChatOrchestrator`] turn through an
//! [`OrchestratorFactory`] closure — see the design notes on the cyclic
//! reference between this tool and the orchestrator that registers it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use coordinator_domain::constants::SUBAGENT_MAX_DEPTH;
use coordinator_domain::entities::ChatSession;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::event_sink::OutboundEvent;
use coordinator_domain::ports::tool::{ToolContext, ToolExecutor, ToolSchema};
use coordinator_domain::ports::{EventSink, MetaStore};
use coordinator_domain::value_objects::SessionId;

use super::chat_orchestrator::{OrchestratorFactory, TurnInput};

/// The tool name registered in the `ToolRegistry`.
pub const SUBAGENT_TOOL_NAME: &str = "execute_subagent";

/// An `EventSink` that buffers every emitted event instead of writing to a
/// transport, so the parent tool call can fold the child's whole transcript
/// into its own result.
#[derive(Default)]
struct CollectingSink {
    events: std::sync::Mutex<Vec<OutboundEvent>>,
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn emit(&self, event: OutboundEvent) -> Result<()> {
        self.events.lock().expect("collecting sink mutex poisoned").push(event);
        Ok(())
    }
}

/// The `execute_subagent` tool executor.
pub struct SubAgentRunner {
    meta_store: Arc<dyn MetaStore>,
    orchestrator_factory: OrchestratorFactory,
    max_depth: u32,
}

impl SubAgentRunner {
    /// Construct a runner over a factory that can build a nested
    /// orchestrator bound to an arbitrary `EventSink`.
    #[must_use]
    pub fn new(meta_store: Arc<dyn MetaStore>, orchestrator_factory: OrchestratorFactory) -> Self {
        Self {
            meta_store,
            orchestrator_factory,
            max_depth: SUBAGENT_MAX_DEPTH,
        }
    }

    /// Construct a runner with a non-default recursion cap (used by tests).
    #[must_use]
    pub fn with_max_depth(
        meta_store: Arc<dyn MetaStore>,
        orchestrator_factory: OrchestratorFactory,
        max_depth: u32,
    ) -> Self {
        Self {
            meta_store,
            orchestrator_factory,
            max_depth,
        }
    }

    fn visible_to(subagent: &coordinator_domain::entities::SubAgentDefinition, ctx: &ToolContext) -> bool {
        match (&subagent.user_id, &subagent.company_id) {
            (None, None) => true,
            (Some(user_id), Some(company_id)) => {
                *user_id == ctx.user_id.0 && *company_id == ctx.company_id.0
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ToolExecutor for SubAgentRunner {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: SUBAGENT_TOOL_NAME.to_owned(),
            description: "Spawn a specialist sub-agent on a named system prompt and tool subset, \
                and relay its transcript back as this call's result."
                .to_owned(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "subagentName": {"type": "string"},
                    "userMessage": {"type": "string"},
                    "parentChatId": {"type": "string"},
                },
                "required": ["subagentName", "userMessage"],
            }),
        }
    }

    async fn execute(&self, ctx: &ToolContext, args: HashMap<String, Value>) -> Result<Value> {
        if ctx.recursion_depth >= self.max_depth {
            return Err(Error::RecursionDepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let subagent_name = args
            .get("subagentName")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("subagentName is required"))?;
        let user_message = args
            .get("userMessage")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("userMessage is required"))?;
        let parent_chat_id = args
            .get("parentChatId")
            .and_then(Value::as_str)
            .map(|s| s.parse::<SessionId>())
            .transpose()
            .map_err(|_| Error::validation("parentChatId is not a valid session id"))?
            .unwrap_or(ctx.session_id);

        let subagent = self
            .meta_store
            .find_subagent_by_name(subagent_name)
            .await?
            .ok_or_else(|| Error::not_found(format!("sub-agent '{subagent_name}'")))?;
        if !Self::visible_to(&subagent, ctx) {
            return Err(Error::unauthorized(format!(
                "sub-agent '{subagent_name}' is not visible to this tenant"
            )));
        }

        let child_session = ChatSession::open_child(
            ctx.user_id.0.clone(),
            ctx.company_id.0.clone(),
            subagent.id,
            parent_chat_id,
            format!("{subagent_name} sub-chat"),
        );
        self.meta_store.insert_session(child_session.clone()).await?;

        let sink = Arc::new(CollectingSink::default());
        let orchestrator = (self.orchestrator_factory)(sink.clone());
        orchestrator
            .run_turn(TurnInput {
                session_id: child_session.id,
                user_text: user_message.to_owned(),
                user_id: ctx.user_id.clone(),
                company_id: ctx.company_id.clone(),
                recursion_depth: ctx.recursion_depth + 1,
                cancellation: ctx.cancellation.clone(),
            })
            .await?;

        let transcript = self.meta_store.list_messages(child_session.id).await?;
        let final_assistant_text = transcript
            .iter()
            .rev()
            .find(|m| m.role == coordinator_domain::value_objects::MessageRole::Assistant)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let relayed_events = sink
            .events
            .lock()
            .expect("collecting sink mutex poisoned")
            .clone();

        Ok(serde_json::json!({
            "subchatId": child_session.id.to_string(),
            "messageCount": transcript.len(),
            "finalAssistantText": final_assistant_text,
            "transcript": relayed_events,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator_domain::entities::{
        ChatMessage, HttpToolDefinition, IndexedFile, IndexedFolder, KnowledgeEntry, SubAgentDefinition,
        SystemPrompt, ToolScope,
    };
    use coordinator_domain::ports::meta_store::ToolInvocationRecord;
    use coordinator_domain::value_objects::{
        CompanyId, FileId, FolderId, KnowledgeEntryId, SubAgentId, UserId,
    };
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex as StdMutex;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct FakeMetaStore {
        sessions: StdMutex<StdHashMap<SessionId, ChatSession>>,
        messages: StdMutex<StdHashMap<SessionId, Vec<ChatMessage>>>,
        subagents: StdMutex<StdHashMap<String, SubAgentDefinition>>,
    }

    #[async_trait]
    impl MetaStore for FakeMetaStore {
        async fn insert_folder(&self, _f: IndexedFolder) -> Result<()> {
            Ok(())
        }
        async fn get_folder(&self, id: FolderId) -> Result<IndexedFolder> {
            Err(Error::not_found(format!("folder {id}")))
        }
        async fn find_folder_by_path(&self, _p: &str) -> Result<Option<IndexedFolder>> {
            Ok(None)
        }
        async fn update_folder(&self, _f: IndexedFolder) -> Result<()> {
            Ok(())
        }
        async fn delete_folder(&self, _id: FolderId) -> Result<()> {
            Ok(())
        }
        async fn list_folders(&self) -> Result<Vec<IndexedFolder>> {
            Ok(Vec::new())
        }
        async fn insert_file(&self, _f: IndexedFile) -> Result<()> {
            Ok(())
        }
        async fn find_file_by_path(&self, _folder_id: FolderId, _p: &str) -> Result<Option<IndexedFile>> {
            Ok(None)
        }
        async fn update_file(&self, _f: IndexedFile) -> Result<()> {
            Ok(())
        }
        async fn delete_file(&self, _id: FileId) -> Result<()> {
            Ok(())
        }
        async fn list_files_for_folder(&self, _folder_id: FolderId) -> Result<Vec<IndexedFile>> {
            Ok(Vec::new())
        }
        async fn insert_chunks(&self, _c: Vec<coordinator_domain::entities::FileChunk>) -> Result<()> {
            Ok(())
        }
        async fn list_chunks_for_file(
            &self,
            _file_id: FileId,
        ) -> Result<Vec<coordinator_domain::entities::FileChunk>> {
            Ok(Vec::new())
        }
        async fn delete_chunks_for_file(&self, _file_id: FileId) -> Result<()> {
            Ok(())
        }
        async fn insert_session(&self, session: ChatSession) -> Result<()> {
            self.sessions.lock().unwrap().insert(session.id, session);
            Ok(())
        }
        async fn get_session(&self, id: SessionId) -> Result<ChatSession> {
            self.sessions
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("session {id}")))
        }
        async fn update_session(&self, session: ChatSession) -> Result<()> {
            self.sessions.lock().unwrap().insert(session.id, session);
            Ok(())
        }
        async fn append_message(&self, message: ChatMessage) -> Result<()> {
            self.messages
                .lock()
                .unwrap()
                .entry(message.session_id)
                .or_default()
                .push(message);
            Ok(())
        }
        async fn list_messages(&self, session_id: SessionId) -> Result<Vec<ChatMessage>> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .get(&session_id)
                .cloned()
                .unwrap_or_default())
        }
        async fn upsert_subagent(&self, subagent: SubAgentDefinition) -> Result<()> {
            self.subagents
                .lock()
                .unwrap()
                .insert(subagent.name.clone(), subagent);
            Ok(())
        }
        async fn find_subagent_by_name(&self, name: &str) -> Result<Option<SubAgentDefinition>> {
            Ok(self.subagents.lock().unwrap().get(name).cloned())
        }
        async fn get_subagent(&self, id: SubAgentId) -> Result<SubAgentDefinition> {
            self.subagents
                .lock()
                .unwrap()
                .values()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("subagent {id}")))
        }
        async fn get_system_prompt(&self, _u: &str, _c: &str) -> Result<Option<SystemPrompt>> {
            Ok(None)
        }
        async fn set_system_prompt(&self, _p: SystemPrompt) -> Result<()> {
            Ok(())
        }
        async fn insert_http_tool(&self, _t: HttpToolDefinition) -> Result<()> {
            Ok(())
        }
        async fn list_http_tools(&self) -> Result<Vec<HttpToolDefinition>> {
            Ok(Vec::new())
        }
        async fn insert_knowledge_entry(&self, _e: KnowledgeEntry) -> Result<()> {
            Ok(())
        }
        async fn get_knowledge_entry(&self, id: KnowledgeEntryId) -> Result<KnowledgeEntry> {
            Err(Error::not_found(format!("knowledge {id}")))
        }
        async fn record_tool_invocation(&self, _record: ToolInvocationRecord) -> Result<()> {
            Ok(())
        }
        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    fn make_ctx(recursion_depth: u32) -> ToolContext {
        ToolContext {
            user_id: UserId("u".to_owned()),
            company_id: CompanyId("c".to_owned()),
            session_id: SessionId::new(),
            recursion_depth,
            cancellation: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn recursion_cap_rejects_before_spawning_a_child_session() {
        let meta = Arc::new(FakeMetaStore::default());
        let factory: OrchestratorFactory = Arc::new(|_sink| {
            panic!("factory must not be called once the depth cap is hit")
        });
        let runner = SubAgentRunner::with_max_depth(meta.clone(), factory, 3);

        let mut args = StdHashMap::new();
        args.insert("subagentName".to_owned(), Value::String("reviewer".to_owned()));
        args.insert("userMessage".to_owned(), Value::String("hi".to_owned()));

        let err = runner
            .execute(&make_ctx(3), args)
            .await
            .expect_err("depth 3 with max 3 must fail");
        assert_eq!(err.kind(), coordinator_domain::error::ErrorKind::RecursionDepthExceeded);
        assert!(meta.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_subagent_name_is_not_found() {
        let meta = Arc::new(FakeMetaStore::default());
        let factory: OrchestratorFactory = Arc::new(|_sink| panic!("must not be called"));
        let runner = SubAgentRunner::new(meta, factory);

        let mut args = StdHashMap::new();
        args.insert("subagentName".to_owned(), Value::String("ghost".to_owned()));
        args.insert("userMessage".to_owned(), Value::String("hi".to_owned()));

        let err = runner
            .execute(&make_ctx(0), args)
            .await
            .expect_err("unregistered sub-agent must fail");
        assert_eq!(err.kind(), coordinator_domain::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn user_scoped_subagent_is_invisible_to_a_different_tenant() {
        let meta = Arc::new(FakeMetaStore::default());
        let subagent = SubAgentDefinition::new(
            "private-helper".to_owned(),
            "a private helper".to_owned(),
            "be terse".to_owned(),
            ToolScope::All,
            None,
            Some("someone-else".to_owned()),
            Some("other-co".to_owned()),
        )
        .unwrap();
        meta.subagents
            .lock()
            .unwrap()
            .insert(subagent.name.clone(), subagent);

        let factory: OrchestratorFactory = Arc::new(|_sink| panic!("must not be called"));
        let runner = SubAgentRunner::new(meta, factory);

        let mut args = StdHashMap::new();
        args.insert(
            "subagentName".to_owned(),
            Value::String("private-helper".to_owned()),
        );
        args.insert("userMessage".to_owned(), Value::String("hi".to_owned()));

        let err = runner
            .execute(&make_ctx(0), args)
            .await
            .expect_err("cross-tenant sub-agent must be unauthorized");
        assert_eq!(err.kind(), coordinator_domain::error::ErrorKind::Unauthorized);
    }
}
