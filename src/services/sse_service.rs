use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::state::{Room, RoomSubscription, SharedState};

/// Join a notification room on behalf of a connecting client.
pub fn subscribe_room(state: &SharedState, room: Room) -> RoomSubscription {
    state.fanout().subscribe(room)
}

/// Convert a room subscription into an SSE response, forwarding events and
/// releasing the subscription once the client disconnects.
///
/// A client that lags past the room buffer simply misses those events: on
/// reconnect it is expected to re-fetch current state through the query
/// APIs, not to replay the stream.
pub fn to_sse_stream(
    mut subscription: RoomSubscription,
    keepalive: Duration,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from the room and pushes into the response channel
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                received = subscription.recv() => {
                    match received {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(missed)) => {
                            debug!(room = %subscription.room(), missed, "subscriber lagged; skipping missed events");
                            continue;
                        }
                    }
                }
            }
        }

        // The subscription is owned by this task, so dropping it here is the
        // deterministic release of the room slot.
        info!(room = %subscription.room(), "SSE room stream disconnected");
    });

    // response stream reads from mpsc; when the client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(KeepAlive::new().interval(keepalive).text("keep-alive"))
}
