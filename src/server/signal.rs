// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGHUP:  Logged only; configuration is read once at startup

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Notified once when shutdown is requested
    pub shutdown: Arc<Notify>,
    /// Whether shutdown has been requested
    pub shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Record the request and wake the accept loop.
    ///
    /// `notify_one` stores a permit, so a loop that is between two
    /// `notified()` calls still sees it.
    pub fn request_shutdown(&self, reason: &str) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            logger::log_info(&format!("{reason} received, shutting down"));
            self.shutdown.notify_one();
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix)
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let registered = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        );
        let (mut sigterm, mut sigint, mut sighup) = match registered {
            (Ok(term), Ok(int), Ok(hup)) => (term, int, hup),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    handler.request_shutdown("SIGTERM");
                    break;
                }
                _ = sigint.recv() => {
                    handler.request_shutdown("SIGINT");
                    break;
                }
                _ = sighup.recv() => {
                    logger::log_warning("SIGHUP received: configuration is only read at startup, restart the process to apply changes");
                }
            }
        }
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            handler.request_shutdown("Ctrl+C");
        }
    });
}
