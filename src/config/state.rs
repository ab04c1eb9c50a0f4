// Application state module
// Everything a request handler needs, built once at startup

use std::sync::Arc;

use super::types::Config;
use crate::contact::MessageStore;
use crate::notify::{NotificationDispatch, NotifyError, SpawnDispatcher, WebhookNotifier};

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: MessageStore,
    pub dispatcher: Arc<dyn NotificationDispatch>,
}

impl AppState {
    /// Create `AppState` with an explicit notification dispatcher
    pub fn new(config: Config, dispatcher: Arc<dyn NotificationDispatch>) -> Self {
        let store = MessageStore::new(&config.storage.messages_file);
        Self {
            config,
            store,
            dispatcher,
        }
    }

    /// Create `AppState` that relays notifications to the configured webhook
    /// from detached background tasks
    pub fn from_config(config: Config) -> Result<Self, NotifyError> {
        let notifier = WebhookNotifier::new(&config.notifier)?;
        Ok(Self::new(config, Arc::new(SpawnDispatcher::new(notifier))))
    }
}
