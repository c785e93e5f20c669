//! The WebSocket transport: an [`EventSink`] that writes outbound events as
//! JSON text frames, and a receive loop that turns inbound frames into
//! [`InboundMessage`]s for one session's turns.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::Mutex;

use coordinator_domain::error::{Error, Result};
use coordinator_domain::ports::event_sink::{InboundMessage, OutboundEvent};
use coordinator_domain::ports::EventSink;

/// Serializes [`OutboundEvent`]s to JSON text frames over one WebSocket
/// connection's send half. Cloneable; every clone shares the same
/// underlying socket, serialized by an internal mutex.
#[derive(Clone)]
pub struct WsEventSink {
    sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

impl WsEventSink {
    /// Wrap a WebSocket's send half.
    #[must_use]
    pub fn new(sender: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(sender)),
        }
    }
}

#[async_trait]
impl EventSink for WsEventSink {
    async fn emit(&self, event: OutboundEvent) -> Result<()> {
        let text = serde_json::to_string(&event)
            .map_err(|err| Error::internal(format!("failed to serialize outbound event: {err}")))?;
        self.sender
            .lock()
            .await
            .send(Message::Text(text))
            .await
            .map_err(|err| Error::internal(format!("websocket send failed: {err}")))
    }
}

/// Parse one inbound WebSocket frame into an [`InboundMessage`]. `Ping`,
/// `Pong`, and `Binary` frames are ignored (`Ok(None)`); `Close` ends the
/// connection (`Ok(None)` as well — the caller's receive loop observes the
/// stream ending separately). Malformed `Text` frames are reported to the
/// caller rather than silently dropped, since a client-side bug there
/// deserves a visible error, not dead air.
pub fn parse_inbound(message: Message) -> Result<Option<InboundMessage>> {
    match message {
        Message::Text(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| Error::validation(format!("malformed inbound message: {err}"))),
        Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Close(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_message() {
        let msg = parse_inbound(Message::Text(
            r#"{"type":"user_message","content":"hi"}"#.to_owned(),
        ))
        .unwrap()
        .unwrap();
        assert!(matches!(msg, InboundMessage::UserMessage { content } if content == "hi"));
    }

    #[test]
    fn parses_cancel() {
        let msg = parse_inbound(Message::Text(r#"{"type":"cancel"}"#.to_owned()))
            .unwrap()
            .unwrap();
        assert!(matches!(msg, InboundMessage::Cancel));
    }

    #[test]
    fn ignores_ping() {
        let msg = parse_inbound(Message::Ping(Vec::new())).unwrap();
        assert!(msg.is_none());
    }

    #[test]
    fn rejects_malformed_text() {
        let err = parse_inbound(Message::Text("not json".to_owned())).unwrap_err();
        assert_eq!(err.kind(), coordinator_domain::error::ErrorKind::Validation);
    }
}
