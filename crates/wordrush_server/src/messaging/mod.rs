//! Inbound message handling.
//!
//! Text frames are parsed into [`ClientMessage`]s and dispatched to the
//! [`GameSession`](crate::session::GameSession).

pub mod router;

pub use router::route_client_message;
pub use wordrush_game::ClientMessage;
