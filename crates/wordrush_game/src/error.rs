//! Error types for session intents.
//!
//! Every rejected intent maps to a [`Disposition`] that tells the connection
//! handler whether to close the socket or simply drop the message. No variant
//! is ever retried.

use crate::state::Phase;

/// What the connection handler does after an intent fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Close the offending connection
    Close,
    /// Drop the message and keep the connection
    Drop,
    /// Expected steady-state traffic, nothing to report
    Ignore,
}

/// Reasons a session intent can be rejected.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The referenced room does not exist
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// The room was restarted while the intent waited; the connection
    /// already follows the replacement
    #[error("Room {0} was replaced by a restart")]
    RoomReplaced(String),

    /// Every roster slot is taken and the roster cannot grow
    #[error("Room is full")]
    RoomFull,

    /// The caller is not allowed to perform this action
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// The answer is not a word of the current puzzle
    #[error("Not a word of the current puzzle: {0}")]
    InvalidWord(String),

    /// The answer was already counted
    #[error("Word already completed: {0}")]
    AlreadyCompleted(String),

    /// The room is not in a phase that accepts this intent
    #[error("Action not allowed while room is {0:?}")]
    WrongPhase(Phase),

    /// The referenced player is not on the roster
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    /// The connection has not created or joined a room
    #[error("Connection is not bound to a room")]
    NotBound,

    /// The connection already occupies a roster slot
    #[error("Connection already occupies a player slot")]
    AlreadyBound,

    /// A room cannot be created without players
    #[error("Room needs at least one player name")]
    EmptyRoster,

    /// The inbound payload could not be parsed
    #[error("Malformed message: {0}")]
    MalformedMessage(String),
}

impl GameError {
    /// How the connection handler should react to this error.
    pub fn disposition(&self) -> Disposition {
        match self {
            GameError::RoomNotFound(_) | GameError::RoomFull => Disposition::Close,
            GameError::InvalidWord(_) | GameError::AlreadyCompleted(_) => Disposition::Ignore,
            GameError::Unauthorized(_)
            | GameError::WrongPhase(_)
            | GameError::UnknownPlayer(_)
            | GameError::RoomReplaced(_)
            | GameError::NotBound
            | GameError::AlreadyBound
            | GameError::EmptyRoster
            | GameError::MalformedMessage(_) => Disposition::Drop,
        }
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::MalformedMessage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_failures_close_the_connection() {
        assert_eq!(GameError::RoomNotFound("x".into()).disposition(), Disposition::Close);
        assert_eq!(GameError::RoomFull.disposition(), Disposition::Close);
    }

    #[test]
    fn wrong_answers_are_ignored() {
        assert_eq!(GameError::InvalidWord("DOG".into()).disposition(), Disposition::Ignore);
        assert_eq!(GameError::AlreadyCompleted("CAT".into()).disposition(), Disposition::Ignore);
    }

    #[test]
    fn unauthorized_start_is_dropped_not_closed() {
        assert_eq!(GameError::Unauthorized("start").disposition(), Disposition::Drop);
        assert_eq!(GameError::MalformedMessage("eof".into()).disposition(), Disposition::Drop);
    }

    #[test]
    fn intents_overtaken_by_a_restart_are_dropped() {
        assert_eq!(GameError::RoomReplaced("x".into()).disposition(), Disposition::Drop);
    }
}
