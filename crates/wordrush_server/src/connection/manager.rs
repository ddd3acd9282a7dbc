//! Connection manager for tracking bindings and broadcasting events.
//!
//! This module provides the central registry of live connections. It owns
//! every connection's [`Binding`] and acts as the broadcast hub: an event for
//! a room is serialized once and queued for each connection bound to it.

use super::{client::Binding, client::ClientConnection, ConnectionId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace};
use wordrush_game::{PlayerId, RoomId, ServerMessage};

/// Central manager for all client connections.
///
/// # Architecture
///
/// * Uses `RwLock<HashMap>` for connection storage
/// * Implements atomic connection ID generation
/// * Delivers through bounded per-connection queues with `try_send`, so a
///   slow or dead client never blocks the caller
///
/// Callers may hold a room lock while calling into the manager. The manager
/// itself never waits on a room lock.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Map of connection ID to client connection information
    connections: Arc<RwLock<HashMap<ConnectionId, ClientConnection>>>,

    /// Atomic counter for generating unique connection IDs
    next_id: Arc<AtomicUsize>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Registers a new, unbound connection and returns its unique ID.
    ///
    /// # Arguments
    ///
    /// * `remote_addr` - The network address of the connecting client
    /// * `sender` - Outbound queue drained by the connection's writer task
    pub async fn add_connection(
        &self,
        remote_addr: SocketAddr,
        sender: mpsc::Sender<Message>,
    ) -> ConnectionId {
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let connection = ClientConnection::new(remote_addr, sender);
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, connection);
        info!("🔗 Connection {} from {}", connection_id, remote_addr);
        connection_id
    }

    /// Removes a connection and returns the binding it held.
    pub async fn remove_connection(&self, connection_id: ConnectionId) -> Option<Binding> {
        let mut connections = self.connections.write().await;
        let connection = connections.remove(&connection_id)?;
        info!(
            "❌ Connection {} from {} disconnected after {:.1?}",
            connection_id,
            connection.remote_addr,
            connection.connected_at.elapsed()
        );
        Some(connection.binding)
    }

    /// The binding of a connection. Unknown connections are unbound.
    pub async fn binding(&self, connection_id: ConnectionId) -> Binding {
        let connections = self.connections.read().await;
        connections
            .get(&connection_id)
            .map(|c| c.binding.clone())
            .unwrap_or_default()
    }

    /// Binds a connection to a room and, optionally, a roster slot.
    ///
    /// Returns false if the connection is no longer registered.
    pub async fn bind(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        player_id: Option<PlayerId>,
    ) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get_mut(&connection_id) {
            Some(connection) => {
                debug!(
                    "🔗 Connection {} bound to room {} as {:?}",
                    connection_id, room_id, player_id
                );
                connection.binding = Binding {
                    room_id: Some(room_id),
                    player_id,
                };
                true
            }
            None => false,
        }
    }

    /// Moves every connection bound to `old` over to `new`, clearing their slots.
    ///
    /// Returns the number of connections moved.
    pub async fn rebind_room(&self, old: &RoomId, new: RoomId) -> usize {
        let mut connections = self.connections.write().await;
        let mut moved = 0;
        for connection in connections.values_mut().filter(|c| c.is_bound_to(old)) {
            connection.binding = Binding {
                room_id: Some(new),
                player_id: None,
            };
            moved += 1;
        }
        debug!("🔁 Rebound {} connection(s) from room {} to {}", moved, old, new);
        moved
    }

    /// Number of connections currently bound to a room.
    pub async fn bound_count(&self, room_id: &RoomId) -> usize {
        let connections = self.connections.read().await;
        connections.values().filter(|c| c.is_bound_to(room_id)).count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Queues an event for a single connection.
    ///
    /// Returns true if the event was queued.
    pub async fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: &ServerMessage,
    ) -> bool {
        let Some(frame) = encode(message) else {
            return false;
        };
        let connections = self.connections.read().await;
        match connections.get(&connection_id) {
            Some(connection) => deliver(connection_id, connection, frame),
            None => {
                trace!("Connection {} is gone, dropping event", connection_id);
                false
            }
        }
    }

    /// Queues an event for every connection bound to `room_id`.
    ///
    /// A room with nobody bound is a no-op. Returns the number of connections
    /// the event was queued for.
    pub async fn broadcast(&self, room_id: &RoomId, message: &ServerMessage) -> usize {
        let Some(frame) = encode(message) else {
            return 0;
        };
        let connections = self.connections.read().await;
        let delivered = connections
            .iter()
            .filter(|(_, c)| c.is_bound_to(room_id))
            .filter(|(id, c)| deliver(**id, c, frame.clone()))
            .count();
        debug!("📡 Broadcasted to {} connection(s) in room {}", delivered, room_id);
        delivered
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match message.to_json() {
        Ok(text) => Some(Message::text(text)),
        Err(e) => {
            error!("Failed to serialize outbound event: {}", e);
            None
        }
    }
}

fn deliver(connection_id: ConnectionId, connection: &ClientConnection, frame: Message) -> bool {
    match connection.sender.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!("🐢 Outbound queue full for connection {}, skipping", connection_id);
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Connection {} writer closed, skipping", connection_id);
            false
        }
    }
}
