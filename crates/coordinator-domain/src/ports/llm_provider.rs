//! The `LlmProvider` port: a streaming chat-completion endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::ports::tool::ToolSchema;
use crate::value_objects::MessageRole;

/// One message sent to the provider as part of a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMessage {
    /// The message's role.
    pub role: MessageRole,
    /// The message's text content.
    pub content: String,
}

/// Provider-tunable generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletionConfig {
    /// Sampling temperature, if the provider supports it.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate, if the provider supports it.
    pub max_tokens: Option<u32>,
}

/// One item yielded by a streaming completion.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// An incremental text fragment of the assistant's response.
    Token(String),
    /// The model requests a tool invocation.
    ToolCall {
        /// Opaque id correlating this call to its eventual result.
        id: String,
        /// The requested tool's name.
        name: String,
        /// The raw JSON arguments the model supplied.
        args: Value,
    },
    /// The provider signals the end of this completion.
    End,
}

/// A boxed stream of provider events, as produced by
/// [`LlmProvider::stream_completion`].
pub type ProviderStream =
    std::pin::Pin<Box<dyn futures::Stream<Item = Result<ProviderEvent>> + Send>>;

/// A streaming LLM completion endpoint. The concrete wire protocol is
/// external to this crate; only this interface is specified.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request a streaming completion over `messages`, offering `tools` for
    /// the model to call. Cancellation is propagated by dropping the
    /// returned stream.
    async fn stream_completion(
        &self,
        messages: Vec<ProviderMessage>,
        tools: Vec<ToolSchema>,
        config: CompletionConfig,
    ) -> Result<ProviderStream>;
}
