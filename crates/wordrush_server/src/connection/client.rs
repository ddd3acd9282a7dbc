//! Client connection representation.
//!
//! Each live socket is tracked as a [`ClientConnection`] holding its
//! [`Binding`] and the sending half of its outbound queue.

use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use wordrush_game::{PlayerId, RoomId};

/// The (room, player) pair a connection acts for.
///
/// Set by create and join, rewritten by restart, dropped on disconnect.
/// A connection can be bound to a room without holding a slot, which is
/// the case right after the room it was in has been restarted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    pub room_id: Option<RoomId>,
    pub player_id: Option<PlayerId>,
}

impl Binding {
    pub fn is_seated(&self) -> bool {
        self.player_id.is_some()
    }
}

/// Represents an individual client connection to the server.
#[derive(Debug)]
pub struct ClientConnection {
    /// Room and slot this connection currently acts for
    pub binding: Binding,

    /// The remote network address of the client
    pub remote_addr: SocketAddr,

    /// When this connection was established
    pub connected_at: Instant,

    /// Outbound queue drained by the connection's writer task
    pub sender: mpsc::Sender<Message>,
}

impl ClientConnection {
    pub fn new(remote_addr: SocketAddr, sender: mpsc::Sender<Message>) -> Self {
        Self {
            binding: Binding::default(),
            remote_addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    pub fn is_bound_to(&self, room_id: &RoomId) -> bool {
        self.binding.room_id.as_ref() == Some(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_connections_start_unbound() {
        let (tx, _rx) = mpsc::channel(1);
        let before = Instant::now();
        let connection = ClientConnection::new(SocketAddr::from(([127, 0, 0, 1], 4000)), tx);

        assert_eq!(connection.binding, Binding::default());
        assert!(!connection.binding.is_seated());
        assert!(connection.connected_at >= before);
        assert!(!connection.is_bound_to(&RoomId::new()));
    }
}
