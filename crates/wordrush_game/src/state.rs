//! Shared game state broadcast to every participant of a room.

use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a room in its lifecycle.
///
/// `Lobby -> Active -> LevelComplete -> Active (next level) ... -> GameOver`.
/// A restarted room starts over in `Lobby` under a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Lobby,
    Active,
    LevelComplete,
    GameOver,
}

/// A word a player is currently pointing at on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub word: String,
    pub color: String,
}

/// The authoritative per-room game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Current level, starting at 1
    pub level: u32,
    /// Score per roster slot
    pub scores: BTreeMap<PlayerId, u32>,
    /// Words of the current puzzle solved so far, in completion order
    pub completed_words: Vec<String>,
    /// Seconds remaining on the game clock
    pub time_left: u32,
    /// Latest highlight per player
    pub highlights: BTreeMap<PlayerId, Highlight>,
}

impl GameState {
    /// Fresh level-1 state with a zero score for every given player.
    pub fn new<'a>(players: impl IntoIterator<Item = &'a PlayerId>, time_left: u32) -> Self {
        Self {
            level: 1,
            scores: players.into_iter().map(|id| (id.clone(), 0)).collect(),
            completed_words: Vec::new(),
            time_left,
            highlights: BTreeMap::new(),
        }
    }

    pub fn is_completed(&self, word: &str) -> bool {
        self.completed_words.iter().any(|w| w == word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_zeroes_every_score() {
        let ids = [PlayerId::for_slot(1), PlayerId::for_slot(2)];
        let state = GameState::new(ids.iter(), 300);
        assert_eq!(state.level, 1);
        assert_eq!(state.time_left, 300);
        assert_eq!(state.scores.len(), 2);
        assert!(state.scores.values().all(|score| *score == 0));
        assert!(state.completed_words.is_empty());
    }

    #[test]
    fn game_state_wire_shape() {
        let ids = [PlayerId::for_slot(1)];
        let mut state = GameState::new(ids.iter(), 120);
        state.completed_words.push("CAT".to_string());
        state.highlights.insert(
            PlayerId::for_slot(1),
            Highlight { word: "HAT".to_string(), color: "#ff0000".to_string() },
        );

        let json = serde_json::to_value(&state).expect("serialize state");
        assert_eq!(json["level"], 1);
        assert_eq!(json["timeLeft"], 120);
        assert_eq!(json["scores"]["p1"], 0);
        assert_eq!(json["completedWords"][0], "CAT");
        assert_eq!(json["highlights"]["p1"]["color"], "#ff0000");
    }
}
