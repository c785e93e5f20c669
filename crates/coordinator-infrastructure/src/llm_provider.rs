//! `LlmProvider` adapter: a streaming chat-completion HTTP client.
//!
//! The wire protocol is a server-sent-events stream of newline-delimited
//! `data: <json>` frames, each carrying one tagged event
//! (`{"type":"token",...}`, `{"type":"tool_call",...}`, `{"type":"end"}`),
//! terminated by `data: [DONE]`. Cancellation is propagated by dropping the
//! returned stream, which drops the underlying response body.

use std::time::Duration;

use async_trait::async_trait;
use coordinator_domain::constants::LLM_CONNECT_TIMEOUT_SECS;
use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::llm_provider::{
    CompletionConfig, LlmProvider, ProviderEvent, ProviderMessage, ProviderStream,
};
use coordinator_domain::ports::tool::ToolSchema;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SERVICE_NAME: &str = "llm_provider";

#[derive(Debug, Serialize)]
struct CompletionRequest {
    messages: Vec<ProviderMessage>,
    tools: Vec<WireToolSchema>,
    #[serde(flatten)]
    config: CompletionConfig,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireToolSchema {
    name: String,
    description: String,
    input_schema: Value,
}

impl From<ToolSchema> for WireToolSchema {
    fn from(schema: ToolSchema) -> Self {
        Self { name: schema.name, description: schema.description, input_schema: schema.input_schema }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    Token { text: String },
    ToolCall { id: String, name: String, args: Value },
    End,
}

impl From<WireEvent> for ProviderEvent {
    fn from(event: WireEvent) -> Self {
        match event {
            WireEvent::Token { text } => ProviderEvent::Token(text),
            WireEvent::ToolCall { id, name, args } => ProviderEvent::ToolCall { id, name, args },
            WireEvent::End => ProviderEvent::End,
        }
    }
}

/// Streams chat completions from a configured HTTP endpoint over
/// server-sent events.
pub struct HttpLlmProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLlmProvider {
    /// Build a provider client targeting `base_url`, with an optional
    /// bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(LLM_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|err| Error::internal(format!("building LLM provider HTTP client: {err}")))?;
        Ok(Self { http, base_url: base_url.into(), api_key })
    }
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    async fn stream_completion(
        &self,
        messages: Vec<ProviderMessage>,
        tools: Vec<ToolSchema>,
        config: CompletionConfig,
    ) -> Result<ProviderStream> {
        let url = format!("{}/completions", self.base_url.trim_end_matches('/'));
        let body = CompletionRequest {
            messages,
            tools: tools.into_iter().map(WireToolSchema::from).collect(),
            config,
            stream: true,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                Error::transient(SERVICE_NAME, err.to_string())
            } else {
                Error::upstream_unavailable(SERVICE_NAME, err.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return if status.is_server_error() {
                Err(Error::transient(SERVICE_NAME, format!("{status}: {body}")))
            } else {
                Err(Error::upstream_unavailable(SERVICE_NAME, format!("{status}: {body}")))
            };
        }

        let byte_stream = response.bytes_stream();
        let events = futures::stream::unfold(
            (byte_stream, Vec::<u8>::new(), false),
            |(mut byte_stream, mut buffer, done)| async move {
                if done {
                    return None;
                }
                loop {
                    if let Some(pos) = buffer.iter().position(|&byte| byte == b'\n') {
                        let line: Vec<u8> = buffer.drain(..=pos).collect();
                        let line = String::from_utf8_lossy(&line);
                        let line = line.trim();
                        let Some(data) = line.strip_prefix("data:") else { continue };
                        let data = data.trim();
                        if data == "[DONE]" {
                            return Some((Ok(ProviderEvent::End), (byte_stream, buffer, true)));
                        }
                        return match serde_json::from_str::<WireEvent>(data) {
                            Ok(event) => {
                                let is_end = matches!(event, WireEvent::End);
                                Some((Ok(event.into()), (byte_stream, buffer, is_end)))
                            }
                            Err(err) => Some((
                                Err(Error::transient(SERVICE_NAME, format!("malformed event: {err}"))),
                                (byte_stream, buffer, true),
                            )),
                        };
                    }
                    match byte_stream.next().await {
                        Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                        Some(Err(err)) => {
                            return Some((
                                Err(Error::transient(SERVICE_NAME, err.to_string())),
                                (byte_stream, buffer, true),
                            ))
                        }
                        None => return None,
                    }
                }
            },
        );

        Ok(Box::pin(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tool_call_event_maps_to_provider_event() {
        let json = r#"{"type":"tool_call","id":"t1","name":"bash","args":{"command":"ls"}}"#;
        let event: WireEvent = serde_json::from_str(json).unwrap();
        match ProviderEvent::from(event) {
            ProviderEvent::ToolCall { id, name, .. } => {
                assert_eq!(id, "t1");
                assert_eq!(name, "bash");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
