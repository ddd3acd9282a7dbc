//! Factory functions for creating server instances.

use crate::{config::ServerConfig, server::GameServer};

/// Creates a new game server with default configuration.
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use wordrush_server::create_server;
///
/// let server = create_server();
/// # }
/// ```
pub fn create_server() -> GameServer {
    GameServer::new(ServerConfig::default())
}

/// Creates a new game server with custom configuration.
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use wordrush_server::{create_server_with_config, ServerConfig};
/// use std::net::SocketAddr;
///
/// let config = ServerConfig {
///     bind_address: SocketAddr::from(([0, 0, 0, 0], 9000)),
///     max_connections: 5000,
///     ..Default::default()
/// };
///
/// let server = create_server_with_config(config);
/// # }
/// ```
pub fn create_server_with_config(config: ServerConfig) -> GameServer {
    GameServer::new(config)
}
