//! Identifier types shared by the domain and the server.
//!
//! Rooms are keyed by an opaque, unguessable [`RoomId`]; players by a short
//! [`PlayerId`] that is stable for the lifetime of their room; transport
//! connections by a process-unique [`ConnectionId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a live transport connection.
///
/// Assigned by the server from an atomic counter when a socket is accepted.
pub type ConnectionId = usize;

/// Unique identifier for a room.
///
/// Backed by a UUID v4 so room codes cannot be enumerated; collisions are
/// still checked by the registry when a new id is minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub Uuid);

impl RoomId {
    /// Creates a new random room ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts any textual UUID representation understood by `uuid`.
impl FromStr for RoomId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Identifier of a roster slot within a room (`p1`, `p2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Builds the id for the slot at 1-based roster position `position`.
    pub fn for_slot(position: usize) -> Self {
        Self(format!("p{position}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
