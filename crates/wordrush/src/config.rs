//! Configuration management for the WordRush server.
//!
//! This module handles loading, validation, and conversion of server
//! configuration from TOML files and command-line arguments.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use wordrush_game::{NextLevelPolicy, RoomRules, RosterPolicy, StartPolicy};
use wordrush_server::{PuzzleSource, ServerConfig};

const PUZZLE_SOURCES: [&str; 2] = ["classic", "word_bank"];

fn default_max_connections() -> usize {
    1000
}

fn default_max_message_size() -> usize {
    64 * 1024
}

fn default_outbound_queue_size() -> usize {
    256
}

fn default_max_level() -> u32 {
    3
}

fn default_time_limit_secs() -> u32 {
    300
}

/// Default tick interval for serde deserialization
fn default_tick_interval() -> u64 {
    1000 // one clock second per tick
}

fn default_roster() -> RosterPolicy {
    RosterPolicy::Fixed
}

fn default_max_players() -> usize {
    8
}

fn default_start_policy() -> StartPolicy {
    StartPolicy::Creator
}

fn default_next_level_policy() -> NextLevelPolicy {
    NextLevelPolicy::LevelComplete
}

fn default_puzzle_source() -> String {
    "classic".to_string()
}

fn default_words_per_puzzle() -> usize {
    2
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration settings
    pub server: ServerSettings,
    /// Game rule settings
    #[serde(default)]
    pub game: GameSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Server-specific configuration settings.
///
/// Controls network binding, connection limits and per-connection queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the server to (e.g., "127.0.0.1:8080")
    pub bind_address: String,
    /// Maximum number of concurrent client connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Messages larger than this many bytes close the connection
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Outbound messages buffered per connection before new ones are skipped
    #[serde(default = "default_outbound_queue_size")]
    pub outbound_queue_size: usize,
}

/// Rules every room is created with, plus the game clock and puzzle source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    /// Number of levels in a game
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Seconds on the clock when a game starts
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u32,
    /// Game clock tick interval in milliseconds (0 to disable)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// `fixed` keeps the roster as created, `open` lets joins add slots
    #[serde(default = "default_roster")]
    pub roster: RosterPolicy,
    /// Roster cap for `open` rooms
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Mark every slot online when a room is created. Requires an `open`
    /// roster, since a fixed room seated this way has no slot left to join.
    #[serde(default)]
    pub seat_all_on_create: bool,
    /// `creator` or `anyone`
    #[serde(default = "default_start_policy")]
    pub start_policy: StartPolicy,
    /// `level_complete` or `anytime`
    #[serde(default = "default_next_level_policy")]
    pub next_level_policy: NextLevelPolicy,
    /// `classic` or `word_bank`
    #[serde(default = "default_puzzle_source")]
    pub puzzle_source: String,
    /// Seed for reproducible `word_bank` draws
    #[serde(default)]
    pub puzzle_seed: Option<u64>,
    /// Words drawn per `word_bank` puzzle
    #[serde(default = "default_words_per_puzzle")]
    pub words_per_puzzle: usize,
    /// Delete rooms that have been empty this long (0 to disable)
    #[serde(default)]
    pub idle_room_ttl_secs: u64,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_level: default_max_level(),
            time_limit_secs: default_time_limit_secs(),
            tick_interval_ms: default_tick_interval(),
            roster: default_roster(),
            max_players: default_max_players(),
            seat_all_on_create: false,
            start_policy: default_start_policy(),
            next_level_policy: default_next_level_policy(),
            puzzle_source: default_puzzle_source(),
            puzzle_seed: None,
            words_per_puzzle: default_words_per_puzzle(),
            idle_room_ttl_secs: 0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: "127.0.0.1:8080".to_string(),
                max_connections: default_max_connections(),
                max_message_size: default_max_message_size(),
                outbound_queue_size: default_outbound_queue_size(),
            },
            game: GameSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// The rules handed to every new room.
    pub fn room_rules(&self) -> RoomRules {
        RoomRules {
            max_level: self.game.max_level,
            time_limit_secs: self.game.time_limit_secs,
            roster: self.game.roster,
            max_players: self.game.max_players,
            seat_all_on_create: self.game.seat_all_on_create,
            start_policy: self.game.start_policy,
            next_level_policy: self.game.next_level_policy,
        }
    }

    /// The configured puzzle source; unknown names fall back to `classic`.
    pub fn puzzle_source(&self) -> PuzzleSource {
        match self.game.puzzle_source.as_str() {
            "word_bank" => PuzzleSource::WordBank {
                seed: self.game.puzzle_seed,
                words_per_puzzle: self.game.words_per_puzzle,
            },
            _ => PuzzleSource::Classic,
        }
    }

    /// Converts the application configuration to a game server configuration.
    pub fn to_server_config(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse()?,
            max_connections: self.server.max_connections,
            max_message_size: self.server.max_message_size,
            outbound_queue_size: self.server.outbound_queue_size,
            tick_interval_ms: self.game.tick_interval_ms,
            idle_room_ttl_secs: self.game.idle_room_ttl_secs,
            rules: self.room_rules(),
            puzzles: self.puzzle_source(),
        })
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        if self.server.max_connections == 0 {
            return Err("server.max_connections must be greater than 0".to_string());
        }
        if self.server.max_message_size == 0 {
            return Err("server.max_message_size must be greater than 0".to_string());
        }
        if self.server.outbound_queue_size == 0 {
            return Err("server.outbound_queue_size must be greater than 0".to_string());
        }

        if self.game.max_level == 0 {
            return Err("game.max_level must be greater than 0".to_string());
        }
        if self.game.max_players == 0 {
            return Err("game.max_players must be greater than 0".to_string());
        }
        if self.game.seat_all_on_create && self.game.roster == RosterPolicy::Fixed {
            return Err(
                "game.seat_all_on_create requires roster = \"open\"; a fixed roster would have no free slot".to_string(),
            );
        }
        if !PUZZLE_SOURCES.contains(&self.game.puzzle_source.as_str()) {
            return Err(format!(
                "Invalid puzzle source: {}. Must be one of: {PUZZLE_SOURCES:?}",
                &self.game.puzzle_source
            ));
        }
        if self.game.puzzle_source == "word_bank" && self.game.words_per_puzzle == 0 {
            return Err("game.words_per_puzzle must be greater than 0".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use tokio::fs;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(config.server.max_message_size, 65536);
        assert_eq!(config.game.max_level, 3);
        assert_eq!(config.game.time_limit_secs, 300);
        assert_eq!(config.game.tick_interval_ms, 1000);
        assert_eq!(config.game.roster, RosterPolicy::Fixed);
        assert_eq!(config.game.puzzle_source, "classic");
        assert!(config.game.puzzle_seed.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert!(path.exists());

        // the written default must load back
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.game.max_level, config.game.max_level);
        assert_eq!(reloaded.game.start_policy, config.game.start_policy);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[server]
bind_address = "0.0.0.0:3000"
max_connections = 50
max_message_size = 4096

[game]
max_level = 5
time_limit_secs = 120
roster = "open"
max_players = 4
start_policy = "anyone"
next_level_policy = "anytime"
puzzle_source = "word_bank"
puzzle_seed = 42
words_per_puzzle = 3
idle_room_ttl_secs = 600

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&temp_file.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:3000");
        assert_eq!(config.server.max_connections, 50);
        assert_eq!(config.server.outbound_queue_size, 256);
        assert_eq!(config.game.max_level, 5);
        assert_eq!(config.game.roster, RosterPolicy::Open);
        assert_eq!(config.game.start_policy, StartPolicy::Anyone);
        assert_eq!(config.game.next_level_policy, NextLevelPolicy::Anytime);
        assert_eq!(config.game.puzzle_seed, Some(42));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert!(config.validate().is_ok());

        let server_config = config.to_server_config().unwrap();
        assert_eq!(server_config.bind_address.port(), 3000);
        assert_eq!(server_config.idle_room_ttl_secs, 600);
        assert_eq!(server_config.rules.max_players, 4);
        assert_eq!(
            server_config.puzzles,
            PuzzleSource::WordBank { seed: Some(42), words_per_puzzle: 3 }
        );
    }

    #[test]
    fn test_serde_deserialization_with_defaults() {
        let toml_content = r#"
[server]
bind_address = "127.0.0.1:8080"

[logging]
level = "info"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(config.game.tick_interval_ms, default_tick_interval());
        assert_eq!(config.game.words_per_puzzle, 2);
        assert_eq!(config.room_rules(), RoomRules::default());
        assert_eq!(config.puzzle_source(), PuzzleSource::Classic);
    }

    #[test]
    fn test_unknown_policy_fails_to_parse() {
        let toml_content = r#"
[server]
bind_address = "127.0.0.1:8080"

[game]
start_policy = "whoever"

[logging]
level = "info"
"#;
        assert!(toml::from_str::<AppConfig>(toml_content).is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_bind_address() {
        let mut config = AppConfig::default();
        config.server.bind_address = "invalid".to_string();
        assert!(config.validate().is_err());
        assert!(config.to_server_config().is_err());
    }

    #[test]
    fn test_validation_zero_limits() {
        let mut config = AppConfig::default();
        config.server.max_message_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.outbound_queue_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.game.max_level = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.game.puzzle_source = "word_bank".to_string();
        config.game.words_per_puzzle = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_seat_all_needs_an_open_roster() {
        let mut config = AppConfig::default();
        config.game.seat_all_on_create = true;
        assert!(config.validate().is_err());

        config.game.roster = RosterPolicy::Open;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_puzzle_source() {
        let mut config = AppConfig::default();
        config.game.puzzle_source = "crossword".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let mut config = AppConfig::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Level '{}' should be valid", level);
        }

        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_tick_interval_disables_the_clock() {
        let mut config = AppConfig::default();
        config.game.tick_interval_ms = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.to_server_config().unwrap().tick_interval_ms, 0);
    }
}
