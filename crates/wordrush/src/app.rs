//! Main application logic and lifecycle management.
//!
//! This module contains the `Application` struct that orchestrates server
//! startup, periodic health reporting, and shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{setup_signal_handlers, setup_signal_handlers_silent},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use wordrush_server::{connection::ConnectionManager, GameServer, RoomRegistry, ShutdownState};

/// How long the accept loop and the clock get to notice the shutdown flag.
const SERVER_STOP_TIMEOUT_SECS: u64 = 8;

/// Main application struct.
///
/// Owns the merged configuration and the game server until [`Application::run`]
/// hands the server to its own task.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Game server instance
    server: GameServer,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Initialize game server with configuration
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        display_banner();

        let server_config = config.to_server_config()?;
        let server = GameServer::new(server_config);

        info!("📂 Config: {}", args.config_path.display());

        Ok(Self { config, server })
    }

    /// Runs the server until a termination signal arrives, then shuts down
    /// in phases. A second signal during shutdown exits immediately.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting WordRush Server Application");

        self.log_configuration_summary();

        let registry = self.server.get_registry();
        let connections = self.server.get_connection_manager();
        let config = self.config.clone();

        let shutdown_state = ShutdownState::new();
        let shutdown_state_for_server = shutdown_state.clone();

        let mut server_handle = {
            let server = self.server;
            tokio::spawn(async move {
                match server.start_with_shutdown_state(shutdown_state_for_server).await {
                    Ok(()) => {
                        info!("✅ Server completed successfully");
                    }
                    Err(e) => {
                        error!("❌ Server error: {:?}", e);
                        std::process::exit(1);
                    }
                }
            })
        };

        let monitoring_handle = {
            let registry = registry.clone();
            let connections = connections.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
                interval.tick().await;

                loop {
                    interval.tick().await;
                    info!(
                        "📊 System Health - {} room(s) | {} connection(s)",
                        registry.len(),
                        connections.connection_count().await
                    );
                }
            })
        };

        info!("✅ WordRush Server is now running!");
        info!(
            "🎮 Ready to accept connections on {}",
            config.server.bind_address
        );
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        let signal_shutdown_state = setup_signal_handlers().await?;

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = setup_signal_handlers_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        if signal_shutdown_state.is_shutdown_initiated() {
            shutdown_state.initiate_shutdown();
        }

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");

        info!("📡 Phase 1: Stopping health monitoring...");
        monitoring_handle.abort();

        info!("🧹 Phase 2: Stopping the accept loop and game clock...");
        match tokio::time::timeout(
            tokio::time::Duration::from_secs(SERVER_STOP_TIMEOUT_SECS),
            &mut server_handle,
        )
        .await
        {
            Ok(_) => info!("✅ Server task completed gracefully"),
            Err(_) => {
                warn!("⏰ Server task did not stop within {}s, aborting it", SERVER_STOP_TIMEOUT_SECS);
                server_handle.abort();
            }
        }

        info!("⏳ Phase 3: Waiting for connections to close...");
        tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
        shutdown_state.complete_shutdown();

        log_final_statistics(&registry, &connections).await;

        info!("✅ WordRush Server shutdown complete");
        Ok(())
    }

    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!(
            "  🧩 Puzzles: {} | {} level(s) | {}s per game",
            self.config.game.puzzle_source,
            self.config.game.max_level,
            self.config.game.time_limit_secs
        );
        info!(
            "  🪑 Roster: {:?} (max {}) | start: {:?} | next level: {:?}",
            self.config.game.roster,
            self.config.game.max_players,
            self.config.game.start_policy,
            self.config.game.next_level_policy
        );
        if self.config.game.idle_room_ttl_secs > 0 {
            info!("  🧹 Idle rooms reaped after {}s", self.config.game.idle_room_ttl_secs);
        }
    }
}

async fn log_final_statistics(registry: &Arc<RoomRegistry>, connections: &Arc<ConnectionManager>) {
    info!("📊 Final Statistics:");
    info!("  - Rooms still open: {}", registry.len());
    info!("  - Connections still open: {}", connections.connection_count().await);
}
