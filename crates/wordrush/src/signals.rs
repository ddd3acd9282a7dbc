//! Signal handling for graceful server shutdown.
//!
//! Cross-platform termination signals flip a [`ShutdownState`] that the
//! accept loop and the game clock poll.

use tokio::signal;
use tracing::info;
use wordrush_server::ShutdownState;

/// Waits for a termination signal (SIGINT or SIGTERM on Unix, Ctrl+C on
/// Windows) and returns a shutdown state that is already initiated.
///
/// # Example
///
/// ```rust,no_run
/// use lib_wordrush::signals::setup_signal_handlers;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Start your server...
///
///     let shutdown_state = setup_signal_handlers().await?;
///     assert!(shutdown_state.is_shutdown_initiated());
///     Ok(())
/// }
/// ```
pub async fn setup_signal_handlers() -> Result<ShutdownState, Box<dyn std::error::Error>> {
    let shutdown_state = setup_signal_handlers_silent().await?;
    info!("📡 Received shutdown signal - initiating graceful shutdown");
    Ok(shutdown_state)
}

pub async fn setup_signal_handlers_silent() -> Result<ShutdownState, Box<dyn std::error::Error>> {
    let shutdown_state = ShutdownState::new();

    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    shutdown_state.initiate_shutdown();
    Ok(shutdown_state)
}
