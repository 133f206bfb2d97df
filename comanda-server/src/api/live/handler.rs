//! Live WebSocket endpoint - role-projected order push
//!
//! GET /api/live/ws?token=<JWT>
//! Auth: JWT 通过 query parameter 传递（浏览器 WebSocket 不支持自定义 headers）
//!
//! 协议:
//! - Server → Client: LiveMessage (Ready, Event)
//! - Client → Server: LiveCommand (Resync)
//!
//! The session registers its connection *before* taking the snapshot, so no
//! event can fall between them; queued events at or below the snapshot
//! sequence are filtered out (no duplicate delivery, no gap).

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::live::{LiveCommand, LiveMessage};
use tokio::time::Duration;

use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::orders::projection;
use crate::utils::AppError;

/// Heartbeat ping cadence; the registry timeout must stay well above this
const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/live/ws?token=<JWT>
pub async fn handle_live_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    // 手动验证 JWT（浏览器 WebSocket 不支持 Authorization header）
    let auth = state.jwt_service.verify(&query.token).map_err(|e| {
        tracing::debug!("Live WS token validation failed: {e}");
        AppError::invalid_token("Invalid token")
    })?;

    Ok(ws.on_upgrade(move |socket| live_session(socket, state, auth)))
}

async fn live_session(socket: WebSocket, state: ServerState, auth: AuthContext) {
    let (mut sink, mut stream) = socket.split();
    let connection_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(
        connection_id = %connection_id,
        restaurant_id = %auth.actor.restaurant_id,
        role = %auth.actor.role,
        "Live connection established"
    );

    // Register first so events start queueing, then snapshot
    let mut rx = state.registry.register(
        &connection_id,
        &auth.actor.restaurant_id,
        auth.actor.role,
        auth.scope.clone(),
    );

    // Initial full-state sync
    let Ok(mut last_sequence) = send_ready(&mut sink, &state, &auth).await else {
        state.registry.unregister(&connection_id);
        return;
    };

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = rx.recv() => {
                match event {
                    Some(event) => {
                        // Snapshot already covers everything up to last_sequence
                        if event.sequence <= last_sequence {
                            continue;
                        }
                        last_sequence = event.sequence;
                        if let Some(projected) =
                            projection::project_event(&event, auth.actor.role, &auth.scope)
                            && send_message(&mut sink, &LiveMessage::Event(projected))
                                .await
                                .is_err()
                        {
                            break;
                        }
                    }
                    // Registry dropped us (heartbeat sweep)
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        state.registry.heartbeat(&connection_id);
                        if let Ok(LiveCommand::Resync) = serde_json::from_str(&text) {
                            match send_ready(&mut sink, &state, &auth).await {
                                Ok(seq) => last_sequence = seq,
                                Err(()) => break,
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        state.registry.heartbeat(&connection_id);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {} // Binary - ignore
                }
            }
        }
    }

    state.registry.unregister(&connection_id);
    tracing::info!(connection_id = %connection_id, "Live connection closed");
}

/// Send the full-state snapshot and return the sequence it reflects
async fn send_ready<S>(
    sink: &mut S,
    state: &ServerState,
    auth: &AuthContext,
) -> Result<u64, ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let (orders, server_sequence) = state.store.snapshot(&auth.actor.restaurant_id);
    let views: Vec<_> = orders
        .iter()
        .filter_map(|o| projection::project(o, auth.actor.role, &auth.scope))
        .collect();
    send_message(
        sink,
        &LiveMessage::Ready {
            orders: views,
            server_sequence,
        },
    )
    .await?;
    Ok(server_sequence)
}

async fn send_message<S>(sink: &mut S, msg: &LiveMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
