//! Server configuration types and defaults.
//!
//! This module contains the runtime configuration handed to [`GameServer`]
//! together with the puzzle source selection.
//!
//! [`GameServer`]: crate::server::GameServer

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use wordrush_game::{ClassicPuzzles, PuzzleProvider, RoomRules, WordBankPuzzles};

/// Configuration structure for the game server.
///
/// Network limits, the clock cadence and the rules every room is created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,

    /// Messages larger than this many bytes close the connection
    pub max_message_size: usize,

    /// Depth of each connection's outbound queue
    pub outbound_queue_size: usize,

    /// Game clock tick interval in milliseconds (0 to disable)
    pub tick_interval_ms: u64,

    /// Rooms with nobody online for this long are deleted (0 to disable)
    pub idle_room_ttl_secs: u64,

    /// Rules applied to every new room
    pub rules: RoomRules,

    /// Where level puzzles come from
    pub puzzles: PuzzleSource,
}

/// Selects the [`PuzzleProvider`] used by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuzzleSource {
    /// The fixed three-level table
    Classic,
    /// Random draws from the tiered word bank
    WordBank {
        seed: Option<u64>,
        words_per_puzzle: usize,
    },
}

impl PuzzleSource {
    /// Builds the provider shared by all rooms.
    pub fn build(&self) -> Arc<dyn PuzzleProvider> {
        match self {
            PuzzleSource::Classic => Arc::new(ClassicPuzzles::new()),
            PuzzleSource::WordBank { seed: Some(seed), words_per_puzzle } => {
                Arc::new(WordBankPuzzles::seeded(*seed, *words_per_puzzle))
            }
            PuzzleSource::WordBank { seed: None, words_per_puzzle } => {
                Arc::new(WordBankPuzzles::new(*words_per_puzzle))
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_connections: 1000,
            max_message_size: 64 * 1024, // 64KB
            outbound_queue_size: 256,
            tick_interval_ms: 1000,
            idle_room_ttl_secs: 0,
            rules: RoomRules::default(),
            puzzles: PuzzleSource::Classic,
        }
    }
}
