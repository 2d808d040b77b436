//! Settlement notifications for the connected user
//!
//! `/api/notifications/ws` streams `trade_settled` events as they happen.
//! The user comes from `?user=` or, failing that, the identity headers.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    handlers::identity::MaybeIdentity,
    models::notification::{Notification, NotificationListResponse},
    AppState,
};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Handler for GET /api/notifications
/// Newest first. Anonymous callers get an empty list.
pub async fn list_notifications(
    State(state): State<AppState>,
    identity: MaybeIdentity,
) -> Json<NotificationListResponse> {
    let notifications = identity
        .user_id()
        .map(|user_id| state.notifications.recent(user_id))
        .unwrap_or_default();

    Json(NotificationListResponse { notifications })
}

#[derive(Debug, Deserialize)]
pub struct NotificationStreamQuery {
    pub user: Option<String>,
}

/// Client control message
#[derive(Debug, Clone, Deserialize)]
pub struct WsClientRequest {
    /// ping or unsubscribe
    pub action: String,
}

/// WebSocket message to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    /// Recent history, sent once after connecting
    #[serde(rename = "initial")]
    Initial { notifications: Vec<Notification> },
    #[serde(rename = "notification")]
    Notification(Notification),
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "pong")]
    Pong,
}

impl WsMessage {
    fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(text) => Some(Message::Text(text.into())),
            Err(e) => {
                error!("Failed to serialize WebSocket message: {}", e);
                None
            }
        }
    }
}

/// Handler for GET /api/notifications/ws
pub async fn notifications_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<NotificationStreamQuery>,
    identity: MaybeIdentity,
) -> impl IntoResponse {
    let user_id = query
        .user
        .filter(|u| !u.trim().is_empty())
        .or_else(|| identity.user_id().map(str::to_string));

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Option<String>) {
    let (mut sender, mut receiver) = socket.split();

    let Some(user_id) = user_id else {
        if let Some(msg) = (WsMessage::Error {
            message: "Connect a wallet to receive notifications".to_string(),
        })
        .to_message()
        {
            let _ = sender.send(msg).await;
        }
        return;
    };

    info!(user_id = %user_id, "New notifications WebSocket connection");

    // Subscribe before reading history so nothing published in between is lost
    let mut broadcast_rx = state.notifications.subscribe();

    if let Some(msg) = (WsMessage::Initial {
        notifications: state.notifications.recent(&user_id),
    })
    .to_message()
    {
        if sender.send(msg).await.is_err() {
            return;
        }
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // The first tick completes immediately
    heartbeat.tick().await;

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(notification) => {
                        if notification.user_id != user_id {
                            continue;
                        }
                        let Some(msg) = WsMessage::Notification(notification).to_message() else {
                            continue;
                        };
                        if let Err(e) = sender.send(msg).await {
                            debug!("WebSocket send error: {}", e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Missed {} notification events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Notification channel closed");
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if let Err(e) = sender.send(Message::Ping(axum::body::Bytes::new())).await {
                    debug!("Heartbeat failed: {}", e);
                    break;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(req) = serde_json::from_str::<WsClientRequest>(&text) {
                            match req.action.as_str() {
                                "ping" => {
                                    if let Some(pong) = WsMessage::Pong.to_message() {
                                        let _ = sender.send(pong).await;
                                    }
                                }
                                "unsubscribe" => {
                                    info!("Client unsubscribed");
                                    break;
                                }
                                _ => {}
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket closed by client");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket receive error: {}", e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!(user_id = %user_id, "Notifications WebSocket connection closed");
}
