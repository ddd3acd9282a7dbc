//! Error types and handling for the game server.
//!
//! Infrastructure failures are kept apart from rejected game intents so the
//! connection handler can decide whether a socket survives an error.

use wordrush_game::{Disposition, GameError};

/// Enumeration of possible server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Network-related errors such as binding failures or connection issues
    #[error("Network error: {0}")]
    Network(String),

    /// Internal server errors such as serialization failures
    #[error("Internal error: {0}")]
    Internal(String),

    /// A client intent was rejected by the game rules
    #[error(transparent)]
    Game(#[from] GameError),
}

impl ServerError {
    /// How the connection that caused this error should be treated.
    pub fn disposition(&self) -> Disposition {
        match self {
            ServerError::Game(err) => err.disposition(),
            ServerError::Network(_) | ServerError::Internal(_) => Disposition::Drop,
        }
    }
}
