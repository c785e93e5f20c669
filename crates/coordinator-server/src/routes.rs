//! The HTTP surface: a liveness probe and the WebSocket upgrade that drives
//! one chat session's turns.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use coordinator_application::{HealthReport, TurnInput};
use coordinator_domain::entities::ChatSession;
use coordinator_domain::ports::event_sink::{InboundMessage, OutboundEvent};
use coordinator_domain::ports::EventSink;
use coordinator_domain::value_objects::{CompanyId, SessionId, UserId};

use crate::bootstrap::AppState;
use crate::wire::{parse_inbound, WsEventSink};

/// Build the router over a bootstrapped [`AppState`].
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws/chat", get(chat_ws))
        .with_state(state)
}

async fn healthz(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health_probe.check().await)
}

/// Query parameters accepted on the WebSocket upgrade. A returning client
/// passes `session_id` to resume its transcript; a new client omits it and
/// gets a freshly opened session.
#[derive(Debug, Deserialize)]
struct ChatQuery {
    user_id: String,
    company_id: String,
    session_id: Option<SessionId>,
}

async fn chat_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

async fn handle_socket(socket: WebSocket, state: AppState, query: ChatQuery) {
    let session_id = match resolve_session(&state, &query).await {
        Ok(id) => id,
        Err(err) => {
            warn!(error = %err, "failed to open chat session, closing connection");
            return;
        }
    };

    let (sender, mut receiver) = socket.split();
    let sink: Arc<dyn EventSink> = Arc::new(WsEventSink::new(sender));
    let orchestrator = (state.orchestrator_factory)(Arc::clone(&sink));
    // A fresh token per turn: a `cancel` must only abort the turn in flight
    // when it arrives, never poison turns started afterward on the same
    // connection.
    let mut cancellation = CancellationToken::new();

    info!(%session_id, "chat connection opened");

    while let Some(frame) = receiver.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(err) => {
                warn!(%session_id, error = %err, "websocket receive error, closing");
                break;
            }
        };
        if matches!(message, Message::Close(_)) {
            break;
        }
        let inbound = match parse_inbound(message) {
            Ok(Some(inbound)) => inbound,
            Ok(None) => continue,
            Err(err) => {
                let _ = sink
                    .emit(OutboundEvent::Error {
                        kind: err.kind(),
                        message: err.to_string(),
                    })
                    .await;
                continue;
            }
        };

        match inbound {
            InboundMessage::Cancel => cancellation.cancel(),
            InboundMessage::UserMessage { content } => {
                if cancellation.is_cancelled() {
                    cancellation = CancellationToken::new();
                }
                let input = TurnInput {
                    session_id,
                    user_text: content,
                    user_id: UserId(query.user_id.clone()),
                    company_id: CompanyId(query.company_id.clone()),
                    recursion_depth: 0,
                    cancellation: cancellation.clone(),
                };
                if let Err(err) = orchestrator.run_turn(input).await {
                    warn!(%session_id, error = %err, "turn ended in error");
                }
            }
        }
    }

    info!(%session_id, "chat connection closed");
}

async fn resolve_session(
    state: &AppState,
    query: &ChatQuery,
) -> coordinator_domain::error::Result<SessionId> {
    if let Some(session_id) = query.session_id {
        state.meta_store.get_session(session_id).await?;
        return Ok(session_id);
    }
    let session = ChatSession::open(query.user_id.clone(), query.company_id.clone(), "New chat".to_owned());
    let session_id = session.id;
    state.meta_store.insert_session(session).await?;
    Ok(session_id)
}
