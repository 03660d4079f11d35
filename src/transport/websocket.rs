//! Relay WebSocket transport
//!
//! Accepts TCP/WebSocket connections and translates broker protocol frames
//! into `Broker` operations. Each connection gets a `Client` registered with
//! the broker and a send loop draining its channel onto the socket. When
//! either side of the connection ends, the client's queues are removed.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::broker::{Broker, Client};
use crate::transport::message::{ClientMessage, ServerMessage};

/// Binds `addr` and serves the relay until the listener fails.
pub async fn start_relay_server(addr: &str, broker: Arc<Mutex<Broker>>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Relay broker listening on ws://{addr}");
    serve_relay(listener, broker).await;
    Ok(())
}

pub async fn serve_relay(listener: TcpListener, broker: Arc<Mutex<Broker>>) {
    while let Ok((stream, peer)) = listener.accept().await {
        let broker = broker.clone();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!("WebSocket handshake error from {peer}: {e}");
                    return;
                }
            };
            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
            let client = Client::new(tx);
            let client_id = client.id.clone();
            lock(&broker).register_client(client);
            debug!("{client_id} connected from {peer}");

            let cleanup_called = Arc::new(AtomicBool::new(false));

            let do_cleanup = {
                let broker = broker.clone();
                let client_id = client_id.clone();
                let cleanup_called = cleanup_called.clone();

                move || {
                    if !cleanup_called.swap(true, Ordering::SeqCst) {
                        lock(&broker).cleanup_client(&client_id);
                    }
                }
            };

            {
                let client_id = client_id.clone();
                let do_cleanup = do_cleanup.clone();

                tokio::spawn(async move {
                    while let Some(msg) = rx.recv().await {
                        if let Err(e) = ws_sender.send(msg).await {
                            warn!("Failed to send message to {client_id}: {e}");
                            break;
                        }
                    }

                    do_cleanup();
                    debug!("Send loop closed for {client_id}");
                });
            }

            while let Some(Ok(msg)) = ws_receiver.next().await {
                let WsMessage::Text(text) = msg else {
                    continue;
                };
                match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(frame) => handle_frame(&broker, &client_id, frame),
                    Err(err) => {
                        warn!(
                            "Invalid client message from {client_id}: {err} | {}",
                            text.chars().take(100).collect::<String>()
                        );
                        lock(&broker).send_to(
                            &client_id,
                            &ServerMessage::Error {
                                message: format!("invalid frame: {err}"),
                            },
                        );
                    }
                }
            }

            debug!("{client_id} disconnected");
            do_cleanup();
        });
    }
}

/// Applies one client frame to the broker and answers the client.
pub fn handle_frame(broker: &Mutex<Broker>, client_id: &str, frame: ClientMessage) {
    let mut broker = lock(broker);

    let reply = match frame {
        ClientMessage::Declare { queue } => broker
            .declare(client_id, queue)
            .map(|queue| Some(ServerMessage::Declared { queue })),
        ClientMessage::Bind { queue, topic } => broker
            .bind(client_id, &queue, &topic)
            .map(|()| Some(ServerMessage::Bound { queue, topic })),
        ClientMessage::Consume { queue } => broker
            .consume(client_id, &queue)
            .map(|()| Some(ServerMessage::Consuming { queue })),
        ClientMessage::Publish { topic, payload } => {
            let delivered = broker.publish(&topic, &payload);
            debug!("{client_id} published to {topic} ({delivered} deliveries)");
            Ok(None)
        }
        ClientMessage::Ack { delivery_tag } => broker.ack(client_id, delivery_tag).map(|()| None),
    };

    match reply {
        Ok(Some(frame)) => broker.send_to(client_id, &frame),
        Ok(None) => {}
        Err(e) => {
            warn!("{client_id}: {e}");
            broker.send_to(
                client_id,
                &ServerMessage::Error {
                    message: e.to_string(),
                },
            );
        }
    }
}

// Poisoning is ignored: broker operations never leave partial state.
fn lock(broker: &Mutex<Broker>) -> MutexGuard<'_, Broker> {
    broker
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
