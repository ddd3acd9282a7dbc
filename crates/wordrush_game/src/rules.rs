//! Policy knobs that shape how a room behaves.
//!
//! The defaults reproduce the classic game: three levels, a fixed roster
//! with only the creator seated, creator-only start, and level advance once
//! every word is found.

use serde::{Deserialize, Serialize};

/// Whether the roster may grow past its initial size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterPolicy {
    /// Only the slots created with the room exist
    Fixed,
    /// New slots are appended until `max_players`
    Open,
}

/// Who may start the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Only the connection that created (or restarted) the room
    Creator,
    /// Any connection bound to the room
    Anyone,
}

/// When `nextLevel` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextLevelPolicy {
    /// Only after every word of the level was found
    LevelComplete,
    /// Also while the level is still being played
    Anytime,
}

/// Rules applied to every room created by a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRules {
    pub max_level: u32,
    pub time_limit_secs: u32,
    pub roster: RosterPolicy,
    pub max_players: usize,
    /// Only workable with an open roster; fixed rooms would have no slot to join
    pub seat_all_on_create: bool,
    pub start_policy: StartPolicy,
    pub next_level_policy: NextLevelPolicy,
}

impl Default for RoomRules {
    fn default() -> Self {
        Self {
            max_level: 3,
            time_limit_secs: 300,
            roster: RosterPolicy::Fixed,
            max_players: 8,
            seat_all_on_create: false,
            start_policy: StartPolicy::Creator,
            next_level_policy: NextLevelPolicy::LevelComplete,
        }
    }
}
