//! Signal-driven shutdown wiring.
//!
//! SIGINT, SIGTERM and SIGQUIT all cancel the shared token. Cancelling an
//! already-cancelled token is a no-op, so repeated or concurrent signals
//! are harmless.

use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Register handlers for the three termination signals. The first signal
/// received logs intent and cancels `shutdown`.
pub fn install_signal_handlers(shutdown: &CancellationToken) -> std::io::Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
            _ = quit.recv() => {}
        }
        info!("Stopping");
        shutdown.cancel();
    });
    Ok(())
}
