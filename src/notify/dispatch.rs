//! Fire-and-forget notification dispatch
//!
//! The request handler hands the stored message over and responds right
//! away. Nothing reports back: no join handle is kept and no result
//! channel exists.

use super::WebhookNotifier;
use crate::contact::ContactMessage;

/// Seam between the HTTP service and the notifier
pub trait NotificationDispatch: Send + Sync {
    /// Start notifying about `message` without waiting for the outcome
    fn dispatch(&self, message: ContactMessage);
}

/// Runs each delivery as a detached task on the tokio runtime
#[derive(Debug, Clone)]
pub struct SpawnDispatcher {
    notifier: WebhookNotifier,
}

impl SpawnDispatcher {
    pub const fn new(notifier: WebhookNotifier) -> Self {
        Self { notifier }
    }
}

impl NotificationDispatch for SpawnDispatcher {
    fn dispatch(&self, message: ContactMessage) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            notifier.deliver(message).await;
        });
    }
}
