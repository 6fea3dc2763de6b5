//! Forwarding of OS termination signals into the session's shutdown channel.

use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ShutdownSignal;

/// Wait for SIGINT or SIGTERM and send it once on `tx`.
///
/// The returned task should be aborted once the session has finished.
#[must_use]
pub fn forward_os_signals(tx: oneshot::Sender<ShutdownSignal>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let received = match wait_for_signal().await {
            Ok(received) => received,
            Err(err) => {
                warn!(error = %err, "failed to install signal handlers");
                return;
            }
        };
        if let Err(unsent) = tx.send(received) {
            debug!(signal = ?unsent, "session already finished; ignoring signal");
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<ShutdownSignal> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = signal::ctrl_c() => result.map(|()| ShutdownSignal::Interrupt),
        _ = terminate.recv() => Ok(ShutdownSignal::Terminate),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<ShutdownSignal> {
    signal::ctrl_c().await.map(|()| ShutdownSignal::Interrupt)
}
