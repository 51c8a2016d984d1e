//! WebSocket implementation of [`Connector`] using `tokio-tungstenite`.
//!
//! # One pump task per connection
//!
//! After the handshake the WebSocket stream is split into a write sink and a
//! read stream, and both are handed to a single pump task.  The pump
//! multiplexes:
//!
//! - frames queued by the panel on the link's `outgoing` channel, written as
//!   WebSocket text frames;
//! - frames read from the backend, forwarded on the `incoming` channel.
//!
//! When the panel drops its end of `outgoing`, the pump sends a Close frame
//! and exits.  When the backend closes or the socket fails, the pump reports
//! [`LinkEvent::Closed`] and exits.  Ping/Pong is answered by tungstenite.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, WebSocketStream};
use tracing::{debug, info, warn};

use super::transport::{Connector, Link, LinkEvent};
use crate::application::TransportError;

/// Opens `ws://` / `wss://` connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &str) -> Result<Link, TransportError> {
        let (ws_stream, _response) =
            connect_async(endpoint)
                .await
                .map_err(|e| TransportError::ConnectFailed {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?;
        info!(endpoint, "WebSocket handshake complete");

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(ws_stream, out_rx, in_tx));

        Ok(Link {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }
}

/// Moves frames between the socket and the link channels until either side
/// goes away.
async fn pump<S>(
    ws_stream: WebSocketStream<S>,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    incoming: mpsc::UnboundedSender<LinkEvent>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
        tokio::select! {
            frame = outgoing.recv() => match frame {
                Some(text) => {
                    if let Err(e) = ws_tx.send(WsMessage::Text(text)).await {
                        warn!("WebSocket send failed: {e}");
                        let _ = incoming.send(LinkEvent::Closed(Some(e.to_string())));
                        break;
                    }
                }
                None => {
                    debug!("link dropped by panel, closing WebSocket");
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    break;
                }
            },
            msg = ws_rx.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => {
                    if incoming.send(LinkEvent::Message(text)).is_err() {
                        break;
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|r| !r.is_empty());
                    debug!(?reason, "backend closed the WebSocket");
                    let _ = incoming.send(LinkEvent::Closed(reason));
                    break;
                }
                // Binary frames are not part of the panel protocol; Ping/Pong
                // are handled by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket read failed: {e}");
                    let _ = incoming.send(LinkEvent::Closed(Some(e.to_string())));
                    break;
                }
                None => {
                    let _ = incoming.send(LinkEvent::Closed(None));
                    break;
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
