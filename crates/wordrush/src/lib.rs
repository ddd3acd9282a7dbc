//! # WordRush Server - Main Entry Point
//!
//! Room-based cooperative word puzzle server. This entry point handles CLI
//! parsing, configuration loading, and application lifecycle management.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! wordrush
//!
//! # Specify custom configuration
//! wordrush --config production.toml
//!
//! # Override specific settings
//! wordrush --bind 0.0.0.0:8080 --log-level debug
//!
//! # JSON logging for production
//! wordrush --json-logs
//! ```
//!
//! ## Configuration
//!
//! The server loads configuration from a TOML file (default: `config.toml`).
//! If the file doesn't exist, a default configuration will be created.
//!
//! ## Signal Handling
//!
//! The server handles graceful shutdown on:
//! - SIGINT (Ctrl+C)
//! - SIGTERM (Unix systems)

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Runs the server from the process arguments until shutdown.
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();

    let mut logging = config.logging.clone();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }
    if let Err(e) = logging::setup_logging(&logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use config::{GameSettings, LoggingSettings, ServerSettings};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let server_config = config
            .to_server_config()
            .expect("Default config should convert to ServerConfig");
        assert_eq!(server_config.max_connections, 1000);
        assert_eq!(server_config.tick_interval_ms, 1000);
        assert_eq!(server_config.rules.time_limit_secs, 300);
    }

    #[tokio::test]
    async fn test_application_applies_cli_overrides() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = CliArgs {
            config_path: dir.path().join("wordrush.toml"),
            bind_address: Some("127.0.0.1:0".to_string()),
            log_level: Some("debug".to_string()),
            json_logs: true,
        };

        let app = Application::new(args.clone()).await;
        assert!(app.is_ok());
        assert!(args.config_path.exists());
    }

    #[tokio::test]
    async fn test_application_rejects_invalid_overrides() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = CliArgs {
            config_path: dir.path().join("wordrush.toml"),
            bind_address: Some("not an address".to_string()),
            log_level: None,
            json_logs: false,
        };

        assert!(Application::new(args).await.is_err());
    }

    #[test]
    fn test_cli_args_structure() {
        let args = CliArgs {
            config_path: PathBuf::from("test.toml"),
            bind_address: Some("127.0.0.1:9000".to_string()),
            log_level: Some("debug".to_string()),
            json_logs: true,
        };

        assert_eq!(args.config_path, PathBuf::from("test.toml"));
        assert_eq!(args.bind_address, Some("127.0.0.1:9000".to_string()));
        assert!(args.json_logs);
    }
}
