use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::state::{SharedState, fact::Fact};

/// Subscribe to the fact stream.
pub fn subscribe_facts(state: &SharedState) -> broadcast::Receiver<Fact> {
    state.facts().subscribe()
}

/// Render a fact as an SSE event named after its kind.
pub fn fact_event(fact: &Fact) -> Option<Event> {
    match serde_json::to_string(fact) {
        Ok(data) => Some(Event::default().event(fact.kind()).data(data)),
        Err(err) => {
            warn!(error = %err, kind = fact.kind(), "failed to serialize fact for SSE");
            None
        }
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding facts until
/// the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<Fact>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(fact) => {
                            let Some(event) = fact_event(&fact) else {
                                continue;
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "SSE subscriber lagging; facts skipped");
                        }
                    }
                }
            }
        }

        info!("fact SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
