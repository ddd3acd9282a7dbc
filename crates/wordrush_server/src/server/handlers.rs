//! Connection handling logic for WebSocket clients.
//!
//! This module manages the lifecycle of a single client connection:
//! WebSocket handshake, message processing, and cleanup.

use crate::{
    error::ServerError,
    messaging::route_client_message,
    session::GameSession,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::protocol::{
    frame::coding::CloseCode, CloseFrame, WebSocketConfig,
};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{accept_async_with_config, WebSocketStream};
use tracing::{debug, error, trace};
use wordrush_game::{Disposition, GameError};

/// Per-connection limits taken from the server configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    /// Frames or messages larger than this close the connection
    pub max_message_size: usize,
    /// Capacity of the outbound queue
    pub outbound_queue_size: usize,
}

impl ConnectionLimits {
    /// Handshake config that makes tungstenite refuse oversized frames
    /// before buffering their payload.
    pub fn websocket_config(&self) -> WebSocketConfig {
        let mut config = WebSocketConfig::default();
        config.max_message_size = Some(self.max_message_size);
        config.max_frame_size = Some(self.max_message_size);
        config
    }
}

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform WebSocket handshake
/// 2. Register the connection with an outbound queue
/// 3. Run the incoming and outgoing tasks until either ends
/// 4. Free the player slot the connection held
///
/// # Message Handling
///
/// * **Incoming Task**: Parses text frames and applies them to the session.
///   Rejections that close the connection send a close frame first.
/// * **Outgoing Task**: Drains the outbound queue into the socket.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    session: Arc<GameSession>,
    limits: ConnectionLimits,
) -> Result<(), ServerError> {
    // Perform WebSocket handshake
    let ws_stream = accept_async_with_config(stream, Some(limits.websocket_config()))
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    let (ws_sender, mut ws_receiver) = ws_stream.split();
    let ws_sender = Arc::new(Mutex::new(ws_sender));
    let (queue_sender, mut queue_receiver) = mpsc::channel(limits.outbound_queue_size.max(1));
    let connection_manager = session.connections();
    let connection_id = connection_manager.add_connection(addr, queue_sender).await;

    let ws_sender_incoming = ws_sender.clone();
    let ws_sender_outgoing = ws_sender.clone();

    let incoming_task = {
        let session = session.clone();

        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if text.len() > limits.max_message_size {
                            debug!(
                                "📏 Dropping {} byte message from connection {}",
                                text.len(),
                                connection_id
                            );
                            continue;
                        }

                        let Err(e) = route_client_message(text.as_str(), connection_id, &session).await
                        else {
                            continue;
                        };
                        match e.disposition() {
                            Disposition::Close => {
                                debug!("🚪 Closing connection {}: {}", connection_id, e);
                                send_close(&ws_sender_incoming, CloseCode::Policy, close_reason(&e)).await;
                                break;
                            }
                            Disposition::Drop => {
                                debug!("❌ Dropped message from connection {}: {}", connection_id, e);
                            }
                            Disposition::Ignore => {
                                trace!("Ignored message from connection {}: {}", connection_id, e);
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Client {} requested close", connection_id);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        let mut ws_sender = ws_sender_incoming.lock().await;
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Ok(_) => {
                        trace!("Dropping non-text frame from connection {}", connection_id);
                    }
                    Err(WsError::Capacity(e)) => {
                        // the oversized payload is never read, so the stream cannot resync
                        debug!("📏 Closing connection {}: {}", connection_id, e);
                        send_close(&ws_sender_incoming, CloseCode::Size, "message too large").await;
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error for connection {}: {}", connection_id, e);
                        break;
                    }
                }
            }
        }
    };

    let outgoing_task = {
        let ws_sender = ws_sender_outgoing;
        async move {
            while let Some(message) = queue_receiver.recv().await {
                let mut ws_sender = ws_sender.lock().await;
                if let Err(e) = ws_sender.send(message).await {
                    error!("Failed to send message: {}", e);
                    break;
                }
            }
        }
    };

    // Run both tasks concurrently until one completes
    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    session.disconnect(connection_id).await;
    Ok(())
}

async fn send_close(ws_sender: &Mutex<WsSink>, code: CloseCode, reason: &str) {
    let frame = CloseFrame {
        code,
        reason: reason.to_string().into(),
    };
    let _ = ws_sender.lock().await.send(Message::Close(Some(frame))).await;
}

/// Short close reason; close frames cap the reason at 123 bytes.
fn close_reason(error: &ServerError) -> &'static str {
    match error {
        ServerError::Game(GameError::RoomNotFound(_)) => "room not found",
        ServerError::Game(GameError::RoomFull) => "room is full",
        _ => "request rejected",
    }
}
