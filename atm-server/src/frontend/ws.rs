//! Kiosk screen websocket
//!
//! One text frame per message in each direction. Each connection runs a
//! reader (frames -> orchestrator) and a writer (hub queue -> frames); when
//! either side ends, both stop.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use kiosk_bus::Command;
use shared::UiCommand;
use shared::message::HardwareService;
use tokio_util::sync::CancellationToken;

use crate::core::ServerState;

/// GET /ws - upgrade to WebSocket
pub async fn handle_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: ServerState) {
    let (id, mut outgoing) = state.frontend.attach();
    tracing::info!(connection = id, "Frontend connected");

    // A fresh screen starts on the scan page
    if let Err(e) = state
        .hardware
        .command(HardwareService::CodeScanner, Command::Start)
        .await
    {
        tracing::error!(connection = id, error = %e, "Failed to start code scanner");
    }

    let (mut ws_sink, mut ws_stream) = socket.split();
    let closed = CancellationToken::new();

    let writer_closed = closed.clone();
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = writer_closed.cancelled() => break,
                frame = outgoing.recv() => {
                    let Some(frame) = frame else {
                        tracing::debug!(connection = id, "Outbound queue closed");
                        break;
                    };
                    if let Err(e) = ws_sink.send(Message::Text(frame.into())).await {
                        tracing::warn!(connection = id, error = %e, "Failed to write to frontend");
                        break;
                    }
                }
            }
        }
        writer_closed.cancel();
        let _ = ws_sink.close().await;
    });

    loop {
        let msg = tokio::select! {
            _ = closed.cancelled() => break,
            msg = ws_stream.next() => msg,
        };

        match msg {
            Some(Ok(Message::Text(text))) => match UiCommand::decode(text.as_str()) {
                Ok(cmd) => {
                    tracing::info!(connection = id, event = ?cmd, "Frontend event");
                    if state.ui_tx.send(cmd).await.is_err() {
                        tracing::warn!(connection = id, "Orchestrator gone, closing connection");
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(connection = id, error = %e, "Discarding malformed frontend message");
                }
            },
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {} // ping/pong/binary
            Some(Err(e)) => {
                tracing::warn!(connection = id, error = %e, "Frontend read failed");
                break;
            }
        }
    }

    closed.cancel();
    let _ = writer.await;
    state.frontend.detach(id);
    tracing::info!(connection = id, "Frontend disconnected");
}
