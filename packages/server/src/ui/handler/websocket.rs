//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, interval_at},
};

use crate::{
    config::KeepAliveConfig,
    domain::{Intent, ParticipantId},
    infrastructure::dto::websocket::InboundMessage,
    ui::state::AppState,
    usecase::{ConnectError, SessionError},
};

/// `GET /ws`
///
/// The participant is registered before the upgrade completes so that a
/// refused connection can still be answered with a status code. Frames
/// queued for it in the meantime (its `sync.full`) wait in the channel.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    let participant_id = ParticipantId::generate();

    // Create a channel for this participant to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    match state.session.connect(participant_id.clone(), tx).await {
        Ok(participant) => {
            tracing::info!(
                "Participant '{}' ({}) connected",
                participant_id,
                participant.name.as_str()
            );
            let failed_state = state.clone();
            let failed_id = participant_id.clone();
            Ok(ws
                .on_failed_upgrade(move |e| {
                    tracing::warn!("WebSocket upgrade for '{}' failed: {}", failed_id, e);
                    let _ = failed_state.session.disconnect(failed_id);
                })
                .on_upgrade(move |socket| handle_socket(socket, state, participant_id, rx)))
        }
        Err(SessionError::Connect(ConnectError::DuplicateParticipant(id))) => {
            tracing::warn!(
                "Participant with ID '{}' is already connected. Rejecting connection.",
                id
            );
            Err(StatusCode::CONFLICT)
        }
        Err(SessionError::Closed) => {
            tracing::warn!("Session is closed. Rejecting connection.");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Spawns a task that forwards frames from the session to the socket and
/// keeps the connection alive.
///
/// The task pings every `keep_alive.interval` and closes the socket once
/// nothing has been received for `keep_alive.deadline()`. It also closes the
/// socket when the session drops the channel (idle expiry, shutdown).
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    last_seen: watch::Receiver<Instant>,
    keep_alive: KeepAliveConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = keep_alive.ping_period();
        let mut ping_tick = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    };
                    tracing::debug!("Pushing frame: {}", msg);
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping_tick.tick() => {
                    let silent_for = last_seen.borrow().elapsed();
                    if silent_for > keep_alive.deadline() {
                        tracing::warn!("Peer silent for {:?}, closing socket", silent_for);
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    participant_id: ParticipantId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();
    let (seen_tx, seen_rx) = watch::channel(Instant::now());

    // Spawn a task to push session events to this participant
    let mut send_task = pusher_loop(rx, sender, seen_rx, state.keep_alive);

    // Spawn a task to receive intents from this participant
    let session = state.session.clone();
    let id = participant_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", id, e);
                    break;
                }
            };

            // Any frame counts as a sign of life
            seen_tx.send_replace(Instant::now());

            match msg {
                Message::Text(text) => match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(inbound) => {
                        if session.submit(id.clone(), Intent::from(inbound)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring malformed frame from '{}': {}", id, e);
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Participant '{}' requested close", id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if state.session.disconnect(participant_id.clone()).is_err() {
        tracing::debug!("Session closed before '{}' disconnected", participant_id);
    }
    tracing::info!("Participant '{}' connection closed", participant_id);
}
