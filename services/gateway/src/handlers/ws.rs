//! `GET /ws/match`
//!
//! Each upgraded socket is split in two. A writer task owns the sink and
//! drains the peer's outbound queue; the handler task turns inbound frames
//! into text and runs the matchmaking session over them.

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{BoxStream, SplitSink, SplitStream};
use futures::{future, SinkExt, StreamExt};
use matchmaker::{run_peer, Outbound};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub async fn match_handler(
    State(state): State<AppState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    if state.matchmaker.shutdown().is_cancelled() {
        return Err(AppError::ServiceUnavailable(
            "matchmaker is shutting down".to_string(),
        ));
    }
    let ws = upgrade?;

    let connection = Uuid::now_v7();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection)))
}

#[instrument(skip_all, fields(connection = %connection))]
async fn handle_socket(socket: WebSocket, state: AppState, connection: Uuid) {
    let (ws_tx, ws_rx) = socket.split();
    let capacity = state.matchmaker.config().outbound_capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    let writer = tokio::spawn(write_frames(ws_tx, rx));
    debug!("connection opened");

    let closer = tx.clone();
    match run_peer(&state.matchmaker, tx, text_frames(ws_rx)).await {
        Ok(end) => info!(?end, "session finished"),
        Err(err) => warn!(error = %err, "session failed"),
    }

    // Queued behind anything the session sent, so "end" is flushed first.
    let _ = closer.send(Outbound::Close).await;
    drop(closer);
    if let Err(err) = writer.await {
        warn!(error = %err, "writer task failed");
    }
    debug!("connection closed");
}

async fn write_frames(mut sink: SplitSink<WebSocket, Message>, mut rx: mpsc::Receiver<Outbound>) {
    while let Some(frame) = rx.recv().await {
        match frame {
            Outbound::Text(text) => {
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Outbound::Close => break,
        }
    }
    let _ = sink.close().await;
}

/// Text payloads of inbound frames, ending at the first close frame or read
/// error. Binary frames are accepted if they hold UTF-8.
fn text_frames(stream: SplitStream<WebSocket>) -> BoxStream<'static, String> {
    stream
        .take_while(|msg| future::ready(matches!(msg, Ok(m) if !matches!(m, Message::Close(_)))))
        .filter_map(|msg| future::ready(msg.ok().and_then(frame_text)))
        .boxed()
}

fn frame_text(msg: Message) -> Option<String> {
    match msg {
        Message::Text(text) => Some(text.as_str().to_owned()),
        Message::Binary(data) => match String::from_utf8(data.to_vec()) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(len = data.len(), error = %err, "dropping non-UTF-8 binary frame");
                None
            }
        },
        _ => None,
    }
}
