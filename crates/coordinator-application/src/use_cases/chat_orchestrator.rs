//! `ChatOrchestrator` use case.
//!
//! Owns one session's streaming turn: system-prompt resolution, the bounded
//! tool-call loop, chunked delivery of large tool outputs, and cooperative
//! cancellation. Mutual exclusion per session (`Busy`) is enforced here, not
//! at the transport layer, since it is a property of the turn itself.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::StreamExt;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use coordinator_domain::entities::ChatMessage;
use coordinator_domain::error::{Error, ErrorKind, Result};
use coordinator_domain::ports::event_sink::OutboundEvent;
use coordinator_domain::ports::llm_provider::{CompletionConfig, ProviderEvent, ProviderMessage};
use coordinator_domain::ports::meta_store::ToolInvocationRecord;
use coordinator_domain::ports::tool::{ToolContext, ToolRegistry};
use coordinator_domain::ports::{EventSink, LlmProvider, MetaStore};
use coordinator_domain::value_objects::{CompanyId, MessageRole, SessionId, ToolCallId, UserId};

/// Tunable bounds governing one orchestrator's turns. Defaults mirror
/// `coordinator_domain::constants`.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Bound on tool-call-loop iterations per turn.
    pub max_tool_calls: u32,
    /// Size of each `tool_result_chunk` fragment, in bytes.
    pub chunk_size: usize,
    /// Byte threshold above which a tool result is delivered chunked.
    pub tool_result_chunk_threshold: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: coordinator_domain::constants::MAX_TOOL_CALLS,
            chunk_size: coordinator_domain::constants::CHUNK_SIZE,
            tool_result_chunk_threshold: coordinator_domain::constants::TOOL_RESULT_CHUNK_THRESHOLD,
        }
    }
}

/// One turn's input: the user's message plus the tenant and cancellation
/// context it runs under.
#[derive(Debug, Clone)]
pub struct TurnInput {
    /// The session this turn belongs to.
    pub session_id: SessionId,
    /// The user's message text.
    pub user_text: String,
    /// The acting user.
    pub user_id: UserId,
    /// The acting user's company.
    pub company_id: CompanyId,
    /// Sub-agent recursion depth this turn runs at (0 at the top level).
    /// Threaded into every tool call's [`ToolContext`] so nested
    /// `execute_subagent` calls can enforce `SUBAGENT_MAX_DEPTH`.
    pub recursion_depth: u32,
    /// Cooperative cancellation handle for this turn.
    pub cancellation: CancellationToken,
}

/// A factory that builds a fresh [`ChatOrchestrator`] bound to a given
/// [`EventSink`]. Used by `SubAgentRunner` to instantiate a nested
/// orchestrator without holding a concrete instance, breaking the cyclic
/// reference between the sub-agent tool and the orchestrator that registers
/// it (see the design notes on the sub-agent/orchestrator cycle).
pub type OrchestratorFactory =
    Arc<dyn Fn(Arc<dyn EventSink>) -> ChatOrchestrator + Send + Sync>;

/// Per-session streaming state machine. At most one turn per session runs at
/// a time; a concurrent second turn is rejected with `Busy`.
pub struct ChatOrchestrator {
    meta_store: Arc<dyn MetaStore>,
    llm_provider: Arc<dyn LlmProvider>,
    tool_registry: Arc<ToolRegistry>,
    event_sink: Arc<dyn EventSink>,
    active_sessions: Arc<DashMap<SessionId, ()>>,
    config: OrchestratorConfig,
}

impl ChatOrchestrator {
    /// Construct an orchestrator over its collaborating ports.
    pub fn new(
        meta_store: Arc<dyn MetaStore>,
        llm_provider: Arc<dyn LlmProvider>,
        tool_registry: Arc<ToolRegistry>,
        event_sink: Arc<dyn EventSink>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            meta_store,
            llm_provider,
            tool_registry,
            event_sink,
            active_sessions: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Run one turn: persist the user's message, resolve the system prompt,
    /// and drive the tool-call loop to a terminal `done` or `error` event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a turn is already active for this session —
    /// in that case the user's message is *not* persisted. Every other
    /// failure is surfaced as a terminal `error` event rather than a bubbled
    /// `Err`; this function still returns `Ok(())` in that case, matching
    /// "the orchestrator never panics to the caller".
    pub async fn run_turn(&self, input: TurnInput) -> Result<()> {
        match self.active_sessions.entry(input.session_id) {
            Entry::Occupied(_) => {
                let err = Error::Busy {
                    session_id: input.session_id.to_string(),
                };
                self.event_sink
                    .emit(OutboundEvent::Error {
                        kind: err.kind(),
                        message: err.to_string(),
                    })
                    .await?;
                return Err(err);
            }
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }

        let outcome = self.run_turn_inner(&input).await;
        self.active_sessions.remove(&input.session_id);

        if let Err(err) = outcome {
            self.event_sink
                .emit(OutboundEvent::Error {
                    kind: err.kind(),
                    message: err.to_string(),
                })
                .await?;
        }
        Ok(())
    }

    async fn run_turn_inner(&self, input: &TurnInput) -> Result<()> {
        let session = self.meta_store.get_session(input.session_id).await?;

        let system_prompt = self.resolve_system_prompt(&session, input).await?;
        let allowed_tool_names = self.resolve_allowed_tools(&session).await?;

        self.meta_store
            .append_message(ChatMessage::user(input.session_id, input.user_text.clone()))
            .await?;

        let mut transcript = self.meta_store.list_messages(input.session_id).await?;

        let mut tool_call_count: u32 = 0;
        let mut assistant_buffer = String::new();

        loop {
            if input.cancellation.is_cancelled() {
                return Err(Error::internal("turn cancelled"));
            }

            let provider_messages =
                Self::build_provider_messages(&system_prompt, &transcript);
            let tool_schemas: Vec<_> = self
                .tool_registry
                .list()
                .into_iter()
                .filter(|schema| {
                    allowed_tool_names
                        .as_ref()
                        .is_none_or(|names| names.iter().any(|n| n == &schema.name))
                })
                .collect();

            let mut stream = self
                .llm_provider
                .stream_completion(provider_messages, tool_schemas, CompletionConfig::default())
                .await?;

            let mut tool_called_this_round = false;

            while let Some(item) = stream.next().await {
                if input.cancellation.is_cancelled() {
                    return Err(Error::internal("turn cancelled"));
                }
                match item? {
                    ProviderEvent::Token(text) => {
                        assistant_buffer.push_str(&text);
                        self.event_sink
                            .emit(OutboundEvent::Token {
                                content: text,
                                tool_call_id: None,
                            })
                            .await?;
                    }
                    ProviderEvent::ToolCall { id, name, args } => {
                        if tool_call_count >= self.config.max_tool_calls {
                            return Err(Error::ToolCallLimitExceeded {
                                max_calls: self.config.max_tool_calls,
                            });
                        }
                        tool_call_count += 1;
                        tool_called_this_round = true;

                        let tool_call_id = ToolCallId(id);
                        self.event_sink
                            .emit(OutboundEvent::ToolCall {
                                id: tool_call_id.clone(),
                                name: name.clone(),
                                args_json: args.to_string(),
                            })
                            .await?;

                        let message = self
                            .execute_and_deliver_tool(input, &tool_call_id, &name, args)
                            .await?;
                        self.meta_store.append_message(message.clone()).await?;
                        transcript.push(message);
                        break;
                    }
                    ProviderEvent::End => break,
                }
            }

            if !tool_called_this_round {
                if !assistant_buffer.is_empty() {
                    self.meta_store
                        .append_message(ChatMessage::assistant(
                            input.session_id,
                            assistant_buffer.clone(),
                        ))
                        .await?;
                }
                self.event_sink.emit(OutboundEvent::Done).await?;
                return Ok(());
            }
        }
    }

    async fn resolve_system_prompt(
        &self,
        session: &coordinator_domain::entities::ChatSession,
        input: &TurnInput,
    ) -> Result<String> {
        if let Some(subagent_id) = session.active_subagent_id {
            let subagent = self.meta_store.get_subagent(subagent_id).await?;
            Ok(subagent.system_prompt)
        } else {
            Ok(self
                .meta_store
                .get_system_prompt(&input.user_id.0, &input.company_id.0)
                .await?
                .map(|p| p.text)
                .unwrap_or_default())
        }
    }

    async fn resolve_allowed_tools(
        &self,
        session: &coordinator_domain::entities::ChatSession,
    ) -> Result<Option<Vec<String>>> {
        let Some(subagent_id) = session.active_subagent_id else {
            return Ok(None);
        };
        let subagent = self.meta_store.get_subagent(subagent_id).await?;
        Ok(match subagent.tools {
            coordinator_domain::entities::ToolScope::All => None,
            coordinator_domain::entities::ToolScope::Named(names) => Some(names),
        })
    }

    fn build_provider_messages(
        system_prompt: &str,
        transcript: &[ChatMessage],
    ) -> Vec<ProviderMessage> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        if !system_prompt.is_empty() {
            messages.push(ProviderMessage {
                role: MessageRole::System,
                content: system_prompt.to_owned(),
            });
        }
        for message in transcript {
            messages.push(ProviderMessage {
                role: message.role,
                content: message.content.clone(),
            });
        }
        messages
    }

    /// Execute one tool call, deliver its result (single or chunked) to the
    /// sink, record the audit row, and return the `tool` transcript message
    /// to append.
    async fn execute_and_deliver_tool(
        &self,
        input: &TurnInput,
        tool_call_id: &ToolCallId,
        name: &str,
        args: Value,
    ) -> Result<ChatMessage> {
        let args_map = match args {
            Value::Object(map) => map.into_iter().collect(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_owned(), other);
                map.into_iter().collect()
            }
        };
        let args_digest = digest_args(&args_map);

        let ctx = ToolContext {
            user_id: input.user_id.clone(),
            company_id: input.company_id.clone(),
            session_id: input.session_id,
            recursion_depth: input.recursion_depth,
            cancellation: input.cancellation.clone(),
        };

        let started = Instant::now();
        let outcome = self.tool_registry.execute(&ctx, name, args_map).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (result_value, error_message, error_kind) = match &outcome {
            Ok(value) => (value.clone(), None, None),
            Err(err) => (Value::Null, Some(err.to_string()), Some(err.kind())),
        };

        self.meta_store
            .record_tool_invocation(ToolInvocationRecord {
                session_id: input.session_id,
                tool_name: name.to_owned(),
                args_digest,
                duration_ms,
                error_kind,
                completed_at: chrono::Utc::now(),
            })
            .await?;

        let serialized = if let Some(message) = &error_message {
            serde_json::json!({ "error": message }).to_string()
        } else {
            result_value.to_string()
        };

        self.deliver_tool_result(tool_call_id, &result_value, duration_ms, error_message.as_deref(), &serialized)
            .await?;

        Ok(ChatMessage::tool(
            input.session_id,
            serialized,
            tool_call_id.clone(),
            name.to_owned(),
        ))
    }

    async fn deliver_tool_result(
        &self,
        tool_call_id: &ToolCallId,
        result: &Value,
        duration_ms: u64,
        error: Option<&str>,
        serialized: &str,
    ) -> Result<()> {
        if serialized.len() <= self.config.tool_result_chunk_threshold {
            self.event_sink
                .emit(OutboundEvent::ToolResult {
                    id: tool_call_id.clone(),
                    result: result.clone(),
                    duration_ms,
                    error: error.map(ToOwned::to_owned),
                })
                .await
        } else {
            let mut seq = 0u32;
            let chars: Vec<char> = serialized.chars().collect();
            let mut idx = 0usize;
            while idx < chars.len() {
                let end = (idx + self.config.chunk_size).min(chars.len());
                let fragment: String = chars[idx..end].iter().collect();
                let done = end == chars.len();
                self.event_sink
                    .emit(OutboundEvent::ToolResultChunk {
                        id: tool_call_id.clone(),
                        seq,
                        content: fragment,
                        done,
                    })
                    .await?;
                seq += 1;
                idx = end;
            }
            Ok(())
        }
    }
}

fn digest_args(args: &std::collections::HashMap<String, Value>) -> String {
    let canonical = serde_json::to_string(args).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coordinator_domain::entities::{
        ChatSession, HttpToolDefinition, KnowledgeEntry, SubAgentDefinition, SystemPrompt,
    };
    use coordinator_domain::ports::llm_provider::ProviderStream;
    use coordinator_domain::ports::tool::{ToolExecutor, ToolSchema};
    use coordinator_domain::value_objects::{FileId, FolderId, KnowledgeEntryId, SubAgentId};
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeMetaStore {
        sessions: StdMutex<StdHashMap<SessionId, ChatSession>>,
        messages: StdMutex<StdHashMap<SessionId, Vec<ChatMessage>>>,
        invocations: StdMutex<Vec<ToolInvocationRecord>>,
    }

    #[async_trait]
    impl MetaStore for FakeMetaStore {
        async fn insert_folder(&self, _f: coordinator_domain::entities::IndexedFolder) -> Result<()> {
            Ok(())
        }
        async fn get_folder(&self, id: FolderId) -> Result<coordinator_domain::entities::IndexedFolder> {
            Err(Error::not_found(format!("folder {id}")))
        }
        async fn find_folder_by_path(
            &self,
            _p: &str,
        ) -> Result<Option<coordinator_domain::entities::IndexedFolder>> {
            Ok(None)
        }
        async fn update_folder(&self, _f: coordinator_domain::entities::IndexedFolder) -> Result<()> {
            Ok(())
        }
        async fn delete_folder(&self, _id: FolderId) -> Result<()> {
            Ok(())
        }
        async fn list_folders(&self) -> Result<Vec<coordinator_domain::entities::IndexedFolder>> {
            Ok(Vec::new())
        }
        async fn insert_file(&self, _f: coordinator_domain::entities::IndexedFile) -> Result<()> {
            Ok(())
        }
        async fn find_file_by_path(
            &self,
            _folder_id: FolderId,
            _p: &str,
        ) -> Result<Option<coordinator_domain::entities::IndexedFile>> {
            Ok(None)
        }
        async fn update_file(&self, _f: coordinator_domain::entities::IndexedFile) -> Result<()> {
            Ok(())
        }
        async fn delete_file(&self, _id: FileId) -> Result<()> {
            Ok(())
        }
        async fn list_files_for_folder(
            &self,
            _folder_id: FolderId,
        ) -> Result<Vec<coordinator_domain::entities::IndexedFile>> {
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
        async fn upsert_subagent(&self, _s: SubAgentDefinition) -> Result<()> {
            Ok(())
        }
        async fn find_subagent_by_name(&self, _name: &str) -> Result<Option<SubAgentDefinition>> {
            Ok(None)
        }
        async fn get_subagent(&self, id: SubAgentId) -> Result<SubAgentDefinition> {
            Err(Error::not_found(format!("subagent {id}")))
        }
        async fn get_system_prompt(&self, _u: &str, _c: &str) -> Result<Option<SystemPrompt>> {
            Ok(Some(SystemPrompt {
                user_id: "u".to_owned(),
                company_id: "c".to_owned(),
                text: "respond in one word".to_owned(),
                updated_at: chrono::Utc::now(),
            }))
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
        async fn record_tool_invocation(&self, record: ToolInvocationRecord) -> Result<()> {
            self.invocations.lock().unwrap().push(record);
            Ok(())
        }
        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    struct ScriptedBashTool;

    #[async_trait]
    impl ToolExecutor for ScriptedBashTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "bash".to_owned(),
                description: "run a shell command".to_owned(),
                input_schema: serde_json::json!({"type": "object"}),
            }
        }
        async fn execute(&self, _ctx: &ToolContext, _args: StdHashMap<String, Value>) -> Result<Value> {
            Ok(serde_json::json!({"stdout": "a.txt\n", "stderr": "", "exitCode": 0, "durationMs": 1}))
        }
    }

    struct ScriptedProvider {
        rounds: StdMutex<Vec<Vec<ProviderEvent>>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn stream_completion(
            &self,
            _messages: Vec<ProviderMessage>,
            _tools: Vec<ToolSchema>,
            _config: CompletionConfig,
        ) -> Result<ProviderStream> {
            let round = self.rounds.lock().unwrap().remove(0);
            Ok(Box::pin(futures::stream::iter(round.into_iter().map(Ok))))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        events: StdMutex<Vec<OutboundEvent>>,
    }

    #[async_trait]
    impl EventSink for CollectingSink {
        async fn emit(&self, event: OutboundEvent) -> Result<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn make_session(id: SessionId) -> ChatSession {
        ChatSession {
            id,
            user_id: "u".to_owned(),
            company_id: "c".to_owned(),
            title: "t".to_owned(),
            active_subagent_id: None,
            parent_session_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn turn_with_tool_call_emits_expected_sequence_and_persists_four_messages() {
        let meta = Arc::new(FakeMetaStore::default());
        let session_id = SessionId::new();
        meta.sessions
            .lock()
            .unwrap()
            .insert(session_id, make_session(session_id));

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(ScriptedBashTool)).unwrap();
        registry.seal();

        let provider = Arc::new(ScriptedProvider {
            rounds: StdMutex::new(vec![
                vec![ProviderEvent::ToolCall {
                    id: "call-1".to_owned(),
                    name: "bash".to_owned(),
                    args: serde_json::json!({"command": "ls /tmp"}),
                }],
                vec![
                    ProviderEvent::Token("do".to_owned()),
                    ProviderEvent::Token("ne".to_owned()),
                    ProviderEvent::End,
                ],
            ]),
        });
        let sink = Arc::new(CollectingSink::default());

        let orchestrator = ChatOrchestrator::new(
            meta.clone(),
            provider,
            Arc::new(registry),
            sink.clone(),
            OrchestratorConfig::default(),
        );

        orchestrator
            .run_turn(TurnInput {
                session_id,
                user_text: "list files in /tmp".to_owned(),
                user_id: UserId("u".to_owned()),
                company_id: CompanyId("c".to_owned()),
                recursion_depth: 0,
                cancellation: CancellationToken::new(),
            })
            .await
            .unwrap();

        let events = sink.events.lock().unwrap();
        assert!(matches!(events[0], OutboundEvent::ToolCall { .. }));
        assert!(matches!(events[1], OutboundEvent::ToolResult { .. }));
        assert!(matches!(events[2], OutboundEvent::Token { .. }));
        assert!(matches!(events[3], OutboundEvent::Token { .. }));
        assert!(matches!(events[4], OutboundEvent::Done));

        let transcript = meta.list_messages(session_id).await.unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].role, MessageRole::User);
        assert_eq!(transcript[1].role, MessageRole::Tool);
        assert_eq!(transcript[2].role, MessageRole::Assistant);
        assert_eq!(transcript[2].content, "done");
    }

    #[tokio::test]
    async fn second_turn_while_active_is_rejected_as_busy() {
        let meta = Arc::new(FakeMetaStore::default());
        let session_id = SessionId::new();
        meta.sessions
            .lock()
            .unwrap()
            .insert(session_id, make_session(session_id));

        let registry = Arc::new(ToolRegistry::new());
        let provider = Arc::new(ScriptedProvider {
            rounds: StdMutex::new(vec![vec![ProviderEvent::End]]),
        });
        let sink = Arc::new(CollectingSink::default());
        let orchestrator = Arc::new(ChatOrchestrator::new(
            meta,
            provider,
            registry,
            sink.clone(),
            OrchestratorConfig::default(),
        ));

        orchestrator.active_sessions.insert(session_id, ());

        let err = orchestrator
            .run_turn(TurnInput {
                session_id,
                user_text: "hello again".to_owned(),
                user_id: UserId("u".to_owned()),
                company_id: CompanyId("c".to_owned()),
                recursion_depth: 0,
                cancellation: CancellationToken::new(),
            })
            .await
            .expect_err("busy turn must fail");
        assert_eq!(err.kind(), ErrorKind::Busy);

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], OutboundEvent::Error { kind, .. } if *kind == ErrorKind::Busy));
    }
}
