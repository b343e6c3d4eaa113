//! WebSocket transport
//!
//! One socket per user. The receive loop stays dedicated to polling the
//! socket; turns run on their own tasks so a close frame is observed
//! while a reply is still being generated, which is what lets the
//! orchestrator cancel mid-turn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use niyati_agent::Outbound;
use niyati_core::{Envelope, Error, InboundMessage, Result, UserProfile};

use crate::state::AppState;

/// Outbound half of a WebSocket connection.
pub struct WsSink {
    sender: tokio::sync::Mutex<SplitSink<WebSocket, Message>>,
    connected: AtomicBool,
}

impl WsSink {
    fn new(sender: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sender: tokio::sync::Mutex::new(sender),
            connected: AtomicBool::new(true),
        }
    }

    fn mark_closed(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Outbound for WsSink {
    async fn send(&self, envelope: &Envelope) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::TransportClosed);
        }

        let json = serde_json::to_string(envelope)
            .map_err(|e| Error::Gateway(format!("envelope serialization: {}", e)))?;

        let mut sender = self.sender.lock().await;
        if sender.send(Message::Text(json)).await.is_err() {
            self.mark_closed();
            return Err(Error::TransportClosed);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Handle `GET /ws/{user_id}`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: String) {
    let (sender, mut receiver) = socket.split();
    let sink = Arc::new(WsSink::new(sender));

    let profile = match state.store.load_profile(&user_id, None).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(
                user_id = %user_id,
                error = %e,
                "profile load failed, starting with a fresh one"
            );
            UserProfile::new(&user_id, "friend")
        }
    };

    let session = match state
        .sessions
        .connect(profile, sink.clone() as Arc<dyn Outbound>)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "connection rejected");
            return;
        }
    };

    if let Err(e) = state.orchestrator.send_greeting(&session, sink.as_ref()).await {
        tracing::debug!(user_id = %user_id, error = %e, "greeting not delivered");
    }

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let inbound = match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(inbound) => inbound,
                    Err(e) => {
                        tracing::debug!(
                            user_id = %user_id,
                            error = %e,
                            "ignoring unparseable frame"
                        );
                        continue;
                    }
                };
                if inbound.message.trim().is_empty() {
                    continue;
                }

                let orchestrator = state.orchestrator.clone();
                let session = session.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    match orchestrator
                        .handle_turn(&session, sink.as_ref(), &inbound.message)
                        .await
                    {
                        Ok(_) | Err(Error::InvalidInput(_)) => {}
                        Err(Error::TransportClosed) => {
                            tracing::debug!(
                                user_id = %session.user_id(),
                                "turn cancelled, client left"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                user_id = %session.user_id(),
                                error = %e,
                                "turn failed"
                            );
                        }
                    }
                });
            }
            // axum answers protocol pings itself.
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Binary(data)) => {
                tracing::debug!(user_id = %user_id, bytes = data.len(), "ignoring binary frame");
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!(user_id = %user_id, error = %e, "websocket receive error");
                break;
            }
        }
    }

    sink.mark_closed();
    state.sessions.disconnect_session(&user_id, &session).await;
    tracing::info!(user_id = %user_id, "websocket closed");
}
