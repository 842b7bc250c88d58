//! Shutdown signal handling (SIGTERM/SIGINT).

use tokio::sync::watch;

/// Listens for OS signals and flips a watch channel to `true` on shutdown.
pub struct SignalHandler {
    shutdown_tx: watch::Sender<bool>,
}

impl SignalHandler {
    /// Create a new signal handler and a receiver that becomes `true` on shutdown.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { shutdown_tx: tx }, rx)
    }

    /// Wait for SIGINT or SIGTERM (Ctrl+C elsewhere), then signal shutdown.
    pub async fn run(self) {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            tracing::info!("Received SIGINT, initiating shutdown...");
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating shutdown...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {e}, using Ctrl+C only");
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received SIGINT, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        self.trigger();
    }

    fn trigger(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_handler_construction() {
        let (handler, rx) = SignalHandler::new();
        assert!(!*rx.borrow());
        handler.trigger();
        assert!(*rx.borrow());
    }
}
