//! Process lifecycle: readiness notification, signal handling, and logging.

pub mod logging;
pub mod signal;

/// Trait for lifecycle event notification (foreground vs systemd).
pub trait Lifecycle: Send + Sync {
    /// Called when the server is ready to accept connections.
    fn on_ready(&self);
    /// Called when the server is about to stop.
    fn on_stopping(&self);
}

/// Foreground lifecycle — logs events only.
pub struct ForegroundLifecycle;

impl Lifecycle for ForegroundLifecycle {
    fn on_ready(&self) {
        tracing::info!("Gateway ready");
    }

    fn on_stopping(&self) {
        tracing::info!("Gateway stopping...");
    }
}

/// Systemd lifecycle — sends sd-notify messages and logs.
pub struct SystemdLifecycle;

impl Lifecycle for SystemdLifecycle {
    fn on_ready(&self) {
        sd_notify_state(sd_notify::NotifyState::Ready);
        tracing::info!("Gateway ready (notified systemd)");
    }

    fn on_stopping(&self) {
        sd_notify_state(sd_notify::NotifyState::Stopping);
        tracing::info!("Gateway stopping (notified systemd)...");
    }
}

/// Send one state to systemd. Without `NOTIFY_SOCKET` this is a no-op.
fn sd_notify_state(state: sd_notify::NotifyState) {
    if let Err(e) = sd_notify::notify(false, &[state]) {
        tracing::debug!("sd_notify failed: {e}");
    }
}

/// Returns `SystemdLifecycle` if `NOTIFY_SOCKET` is set, else `ForegroundLifecycle`.
pub fn detect_lifecycle() -> Box<dyn Lifecycle> {
    if std::env::var("NOTIFY_SOCKET").is_ok() {
        Box::new(SystemdLifecycle)
    } else {
        Box::new(ForegroundLifecycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycles_no_panic() {
        // sd-notify calls silently fail when NOTIFY_SOCKET is not set
        let lifecycles: [Box<dyn Lifecycle>; 2] =
            [Box::new(ForegroundLifecycle), Box::new(SystemdLifecycle)];
        for lc in lifecycles {
            lc.on_ready();
            lc.on_stopping();
        }
    }
}
