//! Webhook notifier
//!
//! Formats a stored contact message as a Discord-style embed and posts it
//! to the configured webhook. Outcomes are only ever logged.

mod dispatch;

pub use dispatch::{NotificationDispatch, SpawnDispatcher};

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::NotifierConfig;
use crate::contact::ContactMessage;
use crate::logger;

const USER_AGENT: &str = concat!("contact-relay/", env!("CARGO_PKG_VERSION"));

/// Webhook request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl WebhookPayload {
    /// Build the single-embed payload announcing `message`
    pub fn for_message(message: &ContactMessage, title: &str, color: u32) -> Self {
        let embed = Embed {
            title: title.to_string(),
            description: format!(
                "**Name:** {}\n**Email:** {}\n**Message:**\n{}",
                message.name, message.email, message.message
            ),
            color,
            footer: EmbedFooter {
                text: format!(
                    "From {} | IP: {}",
                    message.ts,
                    message.ip.as_deref().unwrap_or_default()
                ),
            },
        };
        Self {
            embeds: vec![embed],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Posts contact notifications to one fixed webhook URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    title: String,
    color: u32,
}

impl WebhookNotifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            url: config.webhook_url.clone(),
            title: config.title.clone(),
            color: config.color,
        })
    }

    pub fn payload(&self, message: &ContactMessage) -> WebhookPayload {
        WebhookPayload::for_message(message, &self.title, self.color)
    }

    /// Post the notification and report the remote status
    pub async fn send(&self, message: &ContactMessage) -> Result<StatusCode, NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(message))
            .send()
            .await?;
        Ok(response.status())
    }

    /// Post the notification, logging and discarding any failure
    pub async fn deliver(&self, message: ContactMessage) {
        match self.send(&message).await {
            Ok(status) if status.as_u16() >= 300 => {
                logger::log_notify(&format!("Webhook returned status {status}"));
            }
            Ok(_) => {}
            Err(e) => {
                logger::log_notify(&format!("Error sending webhook notification: {e}"));
            }
        }
    }
}
