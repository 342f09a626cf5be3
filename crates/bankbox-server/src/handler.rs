//! Per-connection handler: decode, dispatch, deliver.
//!
//! Each accepted connection gets one task running [`handle_connection`]
//! plus a writer task that drains the connection's outbound queue into
//! the socket. The reader loop decodes [`ClientMessage`]s and dispatches
//! them; every reply and broadcast goes through the
//! [`ConnectionRegistry`](crate::ConnectionRegistry), never directly to a
//! socket, so the ledger lock is never held across I/O.

use std::sync::Arc;

use bankbox_protocol::{
    ClientMessage, Codec, ConnectionId, JoinAction, JoinGameRequest,
    ServerMessage, TransactionRequest, UpdateRequest,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    conn_id: ConnectionId,
    state: Arc<ServerState>,
) {
    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.registry.lock().await.register(conn_id, tx);

    // Writer task: the only place this socket is written. Ends when the
    // registry drops the last sender, or on the first failed send.
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match codec
                .encode(&msg)
                .map(|bytes| String::from_utf8(bytes).ok())
            {
                Ok(Some(json)) => json,
                _ => {
                    tracing::warn!(%conn_id, "failed to encode outbound message");
                    continue;
                }
            };
            if sink.send(Message::text(json)).await.is_err() {
                break;
            }
        }
    });

    // Reader loop: one message at a time, to completion, in arrival order.
    while let Some(frame) = stream.next().await {
        let data = match frame {
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    %conn_id,
                    error = %e,
                    "undecodable message, skipping"
                );
                continue;
            }
        };

        dispatch(conn_id, msg, &state).await;
    }

    // The seat survives the disconnect; only the delivery route is torn
    // down. The player reclaims the seat by rejoining with their name.
    if let Some(code) = state
        .rooms
        .lock()
        .await
        .room_for_connection(conn_id)
        .map(|room| room.code().clone())
    {
        tracing::info!(%conn_id, %code, "player connection lost");
    } else {
        tracing::debug!(%conn_id, "connection closed");
    }

    state.registry.lock().await.unregister(conn_id);
    // Let the writer flush anything still queued before tearing down.
    let _ = writer.await;
}

async fn dispatch(
    conn_id: ConnectionId,
    msg: ClientMessage,
    state: &Arc<ServerState>,
) {
    match msg {
        ClientMessage::JoinGame(req) => {
            handle_join_game(conn_id, req, state).await;
        }
        ClientMessage::MakeTransaction(req) => {
            handle_make_transaction(conn_id, req, state).await;
        }
        ClientMessage::RequestUpdate(req) => {
            handle_request_update(conn_id, req, state).await;
        }
        ClientMessage::RequestUpdateBySocket => {
            handle_request_update_by_socket(conn_id, state).await;
        }
    }
}

/// Creates or joins a room, then acknowledges the requester and pushes
/// the fresh snapshot to every member.
async fn handle_join_game(
    conn_id: ConnectionId,
    req: JoinGameRequest,
    state: &Arc<ServerState>,
) {
    // Input hygiene lives here, not in the ledger: a request this
    // malformed never had a room to fail in.
    if req.player_name.trim().is_empty() {
        send_error(state, conn_id, "a player name is required").await;
        return;
    }
    if req.action == JoinAction::Join
        && req
            .room_code
            .as_deref()
            .is_none_or(|code| code.trim().is_empty())
    {
        send_error(state, conn_id, "a room code is required to join").await;
        return;
    }

    let outcome = {
        let mut rooms = state.rooms.lock().await;
        let result = match req.action {
            JoinAction::Create => rooms.create_room(
                conn_id,
                req.player_name.trim(),
                req.color.as_deref(),
                req.settings,
            ),
            JoinAction::Join => rooms.join_room(
                conn_id,
                req.room_code.as_deref().unwrap_or_default(),
                req.player_name.trim(),
                req.color.as_deref(),
            ),
        };
        result.map(|room| (room.snapshot(), room.member_connections()))
    };

    let registry = state.registry.lock().await;
    match outcome {
        Ok((snapshot, members)) => {
            // The ack lands before the broadcast so the joining client
            // never races its own admission.
            registry
                .unicast(conn_id, ServerMessage::JoinSuccess(snapshot.clone()));
            registry
                .broadcast(&members, &ServerMessage::GameUpdated(snapshot));
        }
        Err(e) => {
            registry.unicast(conn_id, ServerMessage::ErrorMessage(e.to_string()));
        }
    }
}

/// Applies a transaction; on success broadcasts the updated room and
/// acknowledges the sender, on failure reports to the sender only.
async fn handle_make_transaction(
    conn_id: ConnectionId,
    req: TransactionRequest,
    state: &Arc<ServerState>,
) {
    let outcome = {
        let mut rooms = state.rooms.lock().await;
        rooms
            .apply_transaction(conn_id, &req)
            .map(|room| (room.snapshot(), room.member_connections()))
    };

    let registry = state.registry.lock().await;
    match outcome {
        Ok((snapshot, members)) => {
            registry
                .broadcast(&members, &ServerMessage::GameUpdated(snapshot));
            registry.unicast(conn_id, ServerMessage::TransactionSuccess);
        }
        Err(e) => {
            registry.unicast(conn_id, ServerMessage::ErrorMessage(e.to_string()));
        }
    }
}

/// Resends a room's snapshot to the requester only.
async fn handle_request_update(
    conn_id: ConnectionId,
    req: UpdateRequest,
    state: &Arc<ServerState>,
) {
    let snapshot = {
        let rooms = state.rooms.lock().await;
        rooms.room_by_code(&req.room_code).map(|room| room.snapshot())
    };

    match snapshot {
        Some(snapshot) => {
            state
                .registry
                .lock()
                .await
                .unicast(conn_id, ServerMessage::GameUpdated(snapshot));
        }
        None => {
            // Best-effort resync; an unknown code is not worth an error.
            tracing::debug!(%conn_id, code = %req.room_code, "resync for unknown room");
        }
    }
}

/// Resends the snapshot of whichever room this connection is bound to,
/// inferred without the client naming it.
async fn handle_request_update_by_socket(
    conn_id: ConnectionId,
    state: &Arc<ServerState>,
) {
    let snapshot = {
        let rooms = state.rooms.lock().await;
        rooms
            .room_for_connection(conn_id)
            .map(|room| room.snapshot())
    };

    match snapshot {
        Some(snapshot) => {
            state
                .registry
                .lock()
                .await
                .unicast(conn_id, ServerMessage::GameUpdated(snapshot));
        }
        None => {
            tracing::debug!(%conn_id, "resync requested by unseated connection");
        }
    }
}

async fn send_error(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    message: &str,
) {
    state
        .registry
        .lock()
        .await
        .unicast(conn_id, ServerMessage::ErrorMessage(message.to_string()));
}
