//! Roster entries.

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// A roster slot in a room.
///
/// Slots are never removed. A player that disconnects is only marked
/// offline, and the next joining connection may take the slot over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier for the lifetime of the room
    pub id: PlayerId,
    /// Name shown to the other participants
    pub display_name: String,
    /// Whether a live connection currently occupies this slot
    pub online: bool,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>, online: bool) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            online,
        }
    }
}

/// Resolves the display name for the slot at 1-based `position`.
///
/// Blank names fall back to `Player N`.
pub(crate) fn display_name_for(requested: Option<&str>, position: usize) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Player {position}"),
    }
}
