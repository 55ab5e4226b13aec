use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientAction, ConnectionReply, Dispatch},
    services::state_service,
    state::{ClientRole, SharedState, fact::Fact},
};

/// Frames queued per connection before its fact forwarder starts waiting.
const OUTBOUND_BUFFER: usize = 32;
/// Heartbeat text some older clients send instead of a `ping` action.
const LEGACY_PING: &str = "__ping__";

/// The writer side of a connection is gone.
#[derive(Debug, Error)]
#[error("connection closed")]
struct ConnectionClosed;

/// Handle the full lifecycle of one client WebSocket connection.
///
/// Inbound frames are processed strictly one after another; facts committed
/// by any connection, this one included, are forwarded by a separate task.
pub async fn handle_socket(state: SharedState, socket: WebSocket, role: ClientRole) {
    let connection = state.register_connection(role);
    let id = connection.id;
    let facts = state.facts().subscribe();

    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_BUFFER);

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });
    let forwarder_task = tokio::spawn(forward_facts(id, facts, outbound_tx.clone()));

    info!(%id, ?role, "client connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if let Some(reply) = handle_frame(&state, text.as_str()).await {
                    if send_message_to_websocket(&outbound_tx, &reply).await.is_err() {
                        break;
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload)).await;
            }
            Ok(Message::Close(frame)) => {
                info!(%id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame)).await;
                break;
            }
            Ok(Message::Binary(_)) => debug!(%id, "ignoring binary frame"),
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%id, error = %err, "websocket error");
                break;
            }
        }
    }

    forwarder_task.abort();
    let _ = forwarder_task.await;
    state.unregister_connection(&id);
    info!(%id, ?role, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Decode and dispatch one text frame, returning the reply owed to the sender.
///
/// Frames that do not decode to a known action are dropped.
pub async fn handle_frame(state: &SharedState, text: &str) -> Option<ConnectionReply> {
    if text.trim() == LEGACY_PING {
        return Some(ConnectionReply::Pong);
    }

    match serde_json::from_str::<ClientAction>(text) {
        Ok(action) => dispatch(state, action).await,
        Err(err) => {
            debug!(error = %err, "ignoring malformed action");
            None
        }
    }
}

/// Carry out one action: at most one store mutation, then its broadcast.
pub async fn dispatch(state: &SharedState, action: ClientAction) -> Option<ConnectionReply> {
    match action.into_dispatch() {
        Dispatch::Mutate(mutation) => {
            let action = mutation.name();
            match state_service::apply(state, mutation).await {
                Ok(_) => None,
                Err(err) => {
                    warn!(action, error = %err, "action failed");
                    Some(ConnectionReply::ActionFailed {
                        action: action.to_owned(),
                        message: err.to_string(),
                    })
                }
            }
        }
        Dispatch::Signal(fact) => {
            state_service::relay_signal(state, fact);
            None
        }
        Dispatch::Pong => Some(ConnectionReply::Pong),
        Dispatch::Reject { action, message } => {
            debug!(action, %message, "action rejected");
            Some(ConnectionReply::ActionFailed {
                action: action.to_owned(),
                message,
            })
        }
        Dispatch::Ignore => {
            debug!("ignoring unknown action");
            None
        }
    }
}

/// Push every fact from the hub onto the connection's outbound queue.
///
/// A connection slower than the hub capacity skips the facts it missed; the
/// poller brings its view back in line.
async fn forward_facts(id: Uuid, mut facts: broadcast::Receiver<Fact>, tx: mpsc::Sender<Message>) {
    loop {
        match facts.recv().await {
            Ok(fact) => {
                if send_message_to_websocket(&tx, &fact).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(%id, skipped, "connection lagging; facts skipped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Serialize a payload and queue it on the connection's writer.
///
/// Serialization failures are logged and swallowed; only a closed writer is an error.
async fn send_message_to_websocket<T>(
    tx: &mpsc::Sender<Message>,
    value: &T,
) -> Result<(), ConnectionClosed>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .await
        .map_err(|_| ConnectionClosed)
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::Sender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
