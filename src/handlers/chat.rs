use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{Html, IntoResponse},
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    handlers::common::page,
    models::context::RequestContext,
    services::{
        chat::{ChatHub, ChatPayload, MessageKind},
        session::Session,
    },
    state::AppState,
    views,
};

/// Upper bound on a single socket write.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// Consecutive read errors after which the peer is treated as gone.
const MAX_READ_ERRORS: u32 = 16;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatQuery {
    pub username: String,
}

pub async fn index(
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
) -> Html<String> {
    let page = page(&session, &ctx).await;
    Html(views::chat::index(&page))
}

/// Upgrades to a websocket and joins the chat as `?username=`.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let hub = state.chat.clone();
    ws.on_upgrade(move |socket| handle_connection(socket, hub, query.username))
}

/// Decodes a `{"Message": ...}` frame and fans it out. Text and binary
/// frames carry the same JSON.
async fn relay(hub: &ChatHub, conn_id: Uuid, frame: &[u8]) {
    match sonic_rs::from_slice::<ChatPayload>(frame) {
        Ok(payload) => {
            hub.broadcast(conn_id, MessageKind::Chat, &payload.message)
                .await;
        }
        Err(e) => tracing::warn!("Malformed chat payload: {}", e),
    }
}

/// Drives one chat connection until the peer closes or stops draining.
pub async fn handle_connection(socket: WebSocket, hub: ChatHub, username: String) {
    let (mut sender, mut receiver) = socket.split();
    let (conn_id, mut outbound) = hub.join(&username).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(response) = outbound.recv().await {
            let text = match sonic_rs::to_string(&response) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Chat frame serialization failed: {}", e);
                    continue;
                }
            };
            match tokio::time::timeout(WRITE_TIMEOUT, sender.send(Message::Text(text.into()))).await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!("Chat write failed: {}", e);
                    break;
                }
                Err(_) => {
                    tracing::warn!("⚠️ Chat write timed out, dropping peer");
                    break;
                }
            }
        }
        let _ = sender.close().await;
    });

    let recv_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut errors = 0;
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    errors = 0;
                    relay(&recv_hub, conn_id, text.as_str().as_bytes()).await;
                }
                Ok(Message::Binary(bytes)) => {
                    errors = 0;
                    relay(&recv_hub, conn_id, &bytes).await;
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => errors = 0,
                Err(e) => {
                    errors += 1;
                    tracing::warn!("Chat read error: {}", e);
                    if errors >= MAX_READ_ERRORS {
                        break;
                    }
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.leave(conn_id).await;
}
