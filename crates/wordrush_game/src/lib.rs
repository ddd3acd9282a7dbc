//! # Wordrush Game
//!
//! Pure game domain for cooperative word-puzzle rooms: identifiers, the
//! roster, the shared [`GameState`], the [`Room`] state machine, puzzle
//! providers and the JSON wire messages.
//!
//! Nothing in this crate performs I/O or holds locks across rooms. The
//! server crate owns sockets, the room registry and broadcast fan-out.

pub mod error;
pub mod player;
pub mod protocol;
pub mod puzzle;
pub mod room;
pub mod rules;
pub mod state;
pub mod types;

pub use error::{Disposition, GameError};
pub use player::Player;
pub use protocol::{ClientMessage, ServerMessage};
pub use puzzle::{ClassicPuzzles, Direction, Puzzle, PuzzleProvider, PuzzleWord, WordBankPuzzles};
pub use room::{AnswerOutcome, LevelOutcome, Room};
pub use rules::{NextLevelPolicy, RoomRules, RosterPolicy, StartPolicy};
pub use state::{GameState, Highlight, Phase};
pub use types::{ConnectionId, PlayerId, RoomId};
