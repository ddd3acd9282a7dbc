//! Message routing logic for dispatching client messages to the session.

use crate::{connection::ConnectionId, error::ServerError, session::GameSession};
use tracing::debug;
use wordrush_game::ClientMessage;

/// Parses a raw text frame and applies it on behalf of `connection_id`.
///
/// # Returns
///
/// `Ok(())` if the intent was applied. Parse failures and rejected intents
/// come back as [`ServerError::Game`]; the caller decides from the error's
/// disposition whether the connection survives.
///
/// # Example Message Format
///
/// ```json
/// { "type": "answer", "word": "cat" }
/// ```
pub async fn route_client_message(
    text: &str,
    connection_id: ConnectionId,
    session: &GameSession,
) -> Result<(), ServerError> {
    let message = ClientMessage::parse(text)?;

    debug!(
        "📨 Routing '{}' from connection {}",
        message.kind(),
        connection_id
    );

    session.handle(connection_id, message).await?;
    Ok(())
}
