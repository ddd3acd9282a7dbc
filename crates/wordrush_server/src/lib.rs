//! # Wordrush Server - Session Runtime
//!
//! Networking and concurrency around the pure [`wordrush_game`] domain.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Room Registry** - Sharded map from room id to a per-room lock
//! * **Connection Manager** - Connection bindings and the broadcast hub
//! * **Game Session** - Applies client intents to rooms and fans out events
//! * **Game Server** - Accept loop, per-connection tasks and the game clock
//!
//! ### Message Flow
//!
//! 1. Client sends a WebSocket text frame `{ "type": ..., ... }`
//! 2. The router parses it into a [`wordrush_game::ClientMessage`]
//! 3. The session resolves the connection's binding and locks the room
//! 4. One room transition is applied
//! 5. The resulting event is queued for every connection bound to the room
//!
//! ## Error Handling
//!
//! [`ServerError`] separates infrastructure failures from rejected intents.
//! Rejected intents carry a [`wordrush_game::Disposition`] that decides
//! whether the offending connection is closed.
//!
//! ## Thread Safety
//!
//! * Each room sits behind its own `tokio::sync::Mutex`; unrelated rooms
//!   never contend
//! * Connection bindings live in an `Arc<RwLock<HashMap>>`
//! * Outbound delivery uses bounded queues with `try_send`, so a slow client
//!   cannot stall a room

pub use config::{PuzzleSource, ServerConfig};
pub use error::ServerError;
pub use registry::RoomRegistry;
pub use server::GameServer;
pub use session::GameSession;
pub use shutdown::ShutdownState;
pub use utils::{create_server, create_server_with_config};

pub mod config;
pub mod connection;
pub mod error;
pub mod messaging;
pub mod registry;
pub mod server;
pub mod session;
pub mod shutdown;
pub mod utils;
