//! Core game server implementation.
//!
//! This module contains the `GameServer` struct, which owns the room
//! registry, the connection manager and the game clock, and runs the
//! accept loop.

use crate::{
    config::ServerConfig,
    connection::ConnectionManager,
    error::ServerError,
    registry::RoomRegistry,
    server::handlers::{handle_connection, ConnectionLimits},
    session::GameSession,
    shutdown::ShutdownState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

/// How often the accept loop re-checks the shutdown flag while idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

/// The core game server structure.
///
/// `GameServer` wires the [`GameSession`] to the network: it accepts
/// WebSocket connections, hands each one to its own task, and drives the
/// per-room game clock.
pub struct GameServer {
    /// Server configuration settings
    config: ServerConfig,

    /// Room registry, connection manager and puzzle provider
    session: Arc<GameSession>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl GameServer {
    /// Creates a new game server with the specified configuration.
    ///
    /// The puzzle provider is built once from `config.puzzles` and shared by
    /// every room.
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let connection_manager = Arc::new(ConnectionManager::new());
        let provider = config.puzzles.build();
        let session = Arc::new(GameSession::new(
            registry,
            connection_manager,
            provider,
            config.rules.clone(),
        ));
        let (shutdown_sender, _) = broadcast::channel(1);

        Self {
            config,
            session,
            shutdown_sender,
        }
    }

    /// Starts the server and runs until `shutdown_state` is initiated.
    pub async fn start_with_shutdown_state(&self, shutdown_state: ShutdownState) -> Result<(), ServerError> {
        self.start_internal(Some(shutdown_state)).await
    }

    /// Starts the server and runs until [`GameServer::shutdown`] is called.
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_internal(None).await
    }

    async fn start_internal(&self, shutdown_state: Option<ShutdownState>) -> Result<(), ServerError> {
        info!("🚀 Starting game server on {}", self.config.bind_address);

        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| ServerError::Network(format!("Failed to bind {}: {e}", self.config.bind_address)))?;

        if self.config.tick_interval_ms > 0 {
            self.start_game_clock_with_shutdown(shutdown_state.clone()).await;
            info!("🕒 Game clock started with interval: {}ms", self.config.tick_interval_ms);
        } else {
            info!("⏸️ Game clock disabled (interval: 0ms)");
        }

        let limits = ConnectionLimits {
            max_message_size: self.config.max_message_size,
            outbound_queue_size: self.config.outbound_queue_size,
        };
        let connection_manager = self.session.connections();
        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        loop {
            if let Some(ref shutdown_state) = shutdown_state {
                if shutdown_state.is_shutdown_initiated() {
                    info!("🛑 Accept loop stopping - shutdown initiated");
                    break;
                }
            }

            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        if connection_manager.connection_count().await >= self.config.max_connections {
                            warn!("🚫 Connection limit reached, refusing {}", addr);
                            drop(stream);
                            continue;
                        }

                        let session = self.session.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, session, limits).await {
                                error!("Connection error: {:?}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
                _ = shutdown_receiver.recv() => {
                    info!("Internal shutdown signal received");
                    break;
                }
                _ = tokio::time::sleep(SHUTDOWN_POLL) => {}
            }
        }

        info!("🧹 Server stopped accepting connections");
        Ok(())
    }

    /// Starts the game clock with shutdown support.
    ///
    /// Each tick converts elapsed interval time into whole seconds for the
    /// rooms' `timeLeft` counters, carrying the remainder to the next tick.
    /// Idle rooms are reaped on the same cadence when a TTL is configured.
    async fn start_game_clock_with_shutdown(&self, shutdown_state: Option<ShutdownState>) {
        if self.config.tick_interval_ms == 0 {
            return;
        }

        let session = self.session.clone();
        let tick_ms = self.config.tick_interval_ms;
        let idle_ttl = (self.config.idle_room_ttl_secs > 0)
            .then(|| Duration::from_secs(self.config.idle_room_ttl_secs));

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_millis(tick_ms));
            // the first tick completes immediately
            ticker.tick().await;
            let mut carry_ms: u64 = 0;

            loop {
                ticker.tick().await;

                if let Some(ref shutdown_state) = shutdown_state {
                    if shutdown_state.is_shutdown_initiated() {
                        info!("🕒 Game clock stopping - shutdown initiated");
                        break;
                    }
                }

                let elapsed_secs = whole_seconds(&mut carry_ms, tick_ms);
                if elapsed_secs > 0 {
                    session.tick(elapsed_secs).await;
                }

                if let Some(ttl) = idle_ttl {
                    session.reap_idle(ttl).await;
                }
            }

            info!("✅ Game clock loop completed gracefully");
        });
    }

    /// Signals the accept loop to stop.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn get_registry(&self) -> Arc<RoomRegistry> {
        self.session.registry()
    }

    pub fn get_connection_manager(&self) -> Arc<ConnectionManager> {
        self.session.connections()
    }
}

/// Adds one tick to `carry_ms` and takes out the whole seconds it now holds.
fn whole_seconds(carry_ms: &mut u64, tick_ms: u64) -> u32 {
    *carry_ms += tick_ms;
    let secs = *carry_ms / 1000;
    *carry_ms %= 1000;
    u32::try_from(secs).unwrap_or(u32::MAX)
}
