//! Connection management for client connections.
//!
//! This module tracks live connections, their room bindings, and fans
//! outbound events out to every connection bound to a room.

pub mod client;
pub mod manager;

pub use client::{Binding, ClientConnection};
pub use manager::ConnectionManager;
pub use wordrush_game::ConnectionId;
