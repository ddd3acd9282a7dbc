//! JSON messages exchanged with clients.
//!
//! Both directions use one object per message, tagged by a `type` field with
//! camelCase payload fields. Unknown fields are ignored on input.

use crate::error::GameError;
use crate::player::Player;
use crate::puzzle::Puzzle;
use crate::state::GameState;
use crate::types::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};

/// Intents sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Create {
        names: Vec<String>,
    },
    Join {
        /// Kept as text so a malformed id resolves to "room not found"
        room_id: String,
        #[serde(default)]
        name: Option<String>,
    },
    Start,
    Answer {
        word: String,
    },
    Highlight {
        player_id: String,
        word: String,
        color: String,
    },
    NextLevel,
    Restart,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The wire name of this intent, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Create { .. } => "create",
            ClientMessage::Join { .. } => "join",
            ClientMessage::Start => "start",
            ClientMessage::Answer { .. } => "answer",
            ClientMessage::Highlight { .. } => "highlight",
            ClientMessage::NextLevel => "nextLevel",
            ClientMessage::Restart => "restart",
        }
    }
}

/// Authoritative events pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    RoomCreated {
        room_id: RoomId,
        players: Vec<Player>,
    },
    PlayerUpdate {
        players: Vec<Player>,
    },
    Start {
        game_state: GameState,
        puzzle: Puzzle,
    },
    Update {
        game_state: GameState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        puzzle: Option<Puzzle>,
    },
    LevelComplete {
        game_state: GameState,
    },
    GameOver {
        game_state: GameState,
    },
    Highlight {
        player_id: PlayerId,
        word: String,
        color: String,
    },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{ClassicPuzzles, PuzzleProvider};
    use serde_json::{json, Value};

    #[test]
    fn parses_every_client_intent() {
        let cases = [
            (r#"{"type":"create","names":["A","B"]}"#, "create"),
            (r#"{"type":"join","roomId":"abc"}"#, "join"),
            (r#"{"type":"start"}"#, "start"),
            (r#"{"type":"answer","word":"cat"}"#, "answer"),
            (r#"{"type":"highlight","playerId":"p1","word":"CAT","color":"red"}"#, "highlight"),
            (r#"{"type":"nextLevel"}"#, "nextLevel"),
            (r#"{"type":"restart"}"#, "restart"),
        ];
        for (text, kind) in cases {
            let message = ClientMessage::parse(text).expect(text);
            assert_eq!(message.kind(), kind);
        }
    }

    #[test]
    fn join_name_is_optional_and_extra_fields_are_ignored() {
        let message = ClientMessage::parse(r#"{"type":"join","roomId":"r","name":"Zed","extra":1}"#)
            .expect("join with name");
        assert_eq!(
            message,
            ClientMessage::Join { room_id: "r".into(), name: Some("Zed".into()) }
        );
    }

    #[test]
    fn unknown_type_and_missing_fields_are_malformed() {
        for text in [
            r#"{"type":"teleport"}"#,
            r#"{"type":"answer"}"#,
            r#"{"names":["A"]}"#,
            "not json",
        ] {
            assert!(matches!(ClientMessage::parse(text), Err(GameError::MalformedMessage(_))));
        }
    }

    #[test]
    fn room_created_wire_shape() {
        let id = RoomId::new();
        let message = ServerMessage::RoomCreated {
            room_id: id,
            players: vec![Player::new(PlayerId::for_slot(1), "A", true)],
        };
        let value: Value = serde_json::from_str(&message.to_json().expect("json")).expect("value");
        assert_eq!(
            value,
            json!({
                "type": "roomCreated",
                "roomId": id.to_string(),
                "players": [{"id": "p1", "displayName": "A", "online": true}],
            })
        );
    }

    #[test]
    fn update_omits_puzzle_unless_level_changed() {
        let state = GameState::new([PlayerId::for_slot(1)].iter(), 300);
        let plain = serde_json::to_value(ServerMessage::Update { game_state: state.clone(), puzzle: None })
            .expect("update");
        assert_eq!(plain["type"], "update");
        assert!(plain.get("puzzle").is_none());
        assert_eq!(plain["gameState"]["timeLeft"], 300);

        let with_puzzle = serde_json::to_value(ServerMessage::Update {
            game_state: state,
            puzzle: Some(ClassicPuzzles::new().puzzle(2)),
        })
        .expect("update");
        assert_eq!(with_puzzle["puzzle"]["size"], 4);
    }

    #[test]
    fn other_events_use_camel_case_tags() {
        let state = GameState::new([PlayerId::for_slot(1)].iter(), 1);
        let complete = serde_json::to_value(ServerMessage::LevelComplete { game_state: state.clone() })
            .expect("levelComplete");
        assert_eq!(complete["type"], "levelComplete");
        let over = serde_json::to_value(ServerMessage::GameOver { game_state: state }).expect("gameOver");
        assert_eq!(over["type"], "gameOver");
        let highlight = serde_json::to_value(ServerMessage::Highlight {
            player_id: PlayerId::for_slot(2),
            word: "HAT".into(),
            color: "blue".into(),
        })
        .expect("highlight");
        assert_eq!(highlight, json!({"type": "highlight", "playerId": "p2", "word": "HAT", "color": "blue"}));
    }
}
