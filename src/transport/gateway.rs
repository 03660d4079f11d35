//! Gateway WebSocket transport
//!
//! Every text frame a client sends is one request envelope; the server
//! answers each with one text frame holding the response envelope, in
//! order. Connections are served concurrently. A failed dispatch is just an
//! `error=true` response and never closes the connection.

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::connector::Connector;
use crate::gateway::Dispatcher;

/// Binds `addr` and serves the gateway until the listener fails.
pub async fn start_gateway_server<C>(addr: &str, dispatcher: Arc<Dispatcher<C>>) -> std::io::Result<()>
where
    C: Connector + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!("Gateway listening on ws://{addr}");
    serve_gateway(listener, dispatcher).await;
    Ok(())
}

pub async fn serve_gateway<C>(listener: TcpListener, dispatcher: Arc<Dispatcher<C>>)
where
    C: Connector + 'static,
{
    while let Ok((stream, peer)) = listener.accept().await {
        let dispatcher = dispatcher.clone();

        tokio::spawn(async move {
            let mut ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!("WebSocket handshake error from {peer}: {e}");
                    return;
                }
            };

            while let Some(Ok(msg)) = ws_stream.next().await {
                let WsMessage::Text(text) = msg else {
                    continue;
                };
                let response = dispatcher.dispatch(text.as_str()).await;
                if let Err(e) = ws_stream.send(WsMessage::text(response.to_json())).await {
                    warn!("Failed to answer {peer}: {e}");
                    break;
                }
            }

            debug!("{peer} disconnected");
        });
    }
}
