//! Command-line interface handling for the WordRush server.
//!
//! This module provides command-line argument parsing using the `clap`
//! builder API.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// Every option except the config path overrides a value from the
/// configuration file.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for bind address
    pub bind_address: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    /// Parses command line arguments using clap.
    ///
    /// All arguments have defaults or are optional, so parsing only fails
    /// (and exits) on unknown flags or `--help`/`--version`.
    pub fn parse() -> Self {
        let matches = Self::command().get_matches();

        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            bind_address: matches.get_one::<String>("bind").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }

    fn command() -> Command {
        Command::new("WordRush Server")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Room-based cooperative word puzzle server")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("config.toml"),
            )
            .arg(
                Arg::new("bind")
                    .short('b')
                    .long("bind")
                    .value_name("ADDRESS")
                    .help("Bind address (e.g., 127.0.0.1:8080)"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_config_toml() {
        let matches = CliArgs::command()
            .try_get_matches_from(["wordrush"])
            .expect("no arguments are required");
        assert_eq!(
            matches.get_one::<String>("config").map(String::as_str),
            Some("config.toml")
        );
        assert!(!matches.get_flag("json-logs"));
        assert!(matches.get_one::<String>("bind").is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let matches = CliArgs::command()
            .try_get_matches_from([
                "wordrush",
                "-c",
                "prod.toml",
                "--bind",
                "0.0.0.0:9000",
                "-l",
                "debug",
                "--json-logs",
            ])
            .expect("valid arguments");
        assert_eq!(matches.get_one::<String>("config").map(String::as_str), Some("prod.toml"));
        assert_eq!(matches.get_one::<String>("bind").map(String::as_str), Some("0.0.0.0:9000"));
        assert_eq!(matches.get_one::<String>("log-level").map(String::as_str), Some("debug"));
        assert!(matches.get_flag("json-logs"));
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(CliArgs::command()
            .try_get_matches_from(["wordrush", "--turbo"])
            .is_err());
    }
}
