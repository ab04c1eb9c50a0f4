// Configuration module entry point
// Loads the immutable process configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, NotifierConfig, StaticConfig};

/// Environment variable holding the outbound webhook URL
pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK";

/// Default config file name (without extension)
const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration using the first CLI argument as config path and
    /// the webhook URL from `DISCORD_WEBHOOK`
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let webhook = std::env::var(WEBHOOK_ENV).ok();
        Self::load_from(&path, webhook)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. `CONTACT__SECTION__KEY` environment variables
    /// override file values. `webhook` is mandatory and is the only source
    /// of `notifier.webhook_url`.
    pub fn load_from(
        config_path: &str,
        webhook: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let webhook = webhook
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                config::ConfigError::Message(format!(
                    "{WEBHOOK_ENV} environment variable is not set"
                ))
            })?;

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CONTACT")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9080)?
            .set_default("storage.messages_file", "contact_messages.jsonl")?
            .set_default("static.root", "./static")?
            .set_default("static.index_file", "index.html")?
            .set_default("static.assets_prefix", "/assets")?
            .set_default("static.assets_dir", "assets")?
            .set_default("notifier.title", "📬 New Contact Form Submission")?
            .set_default("notifier.color", 3_447_003)? // blue
            .set_default("notifier.timeout_secs", 10)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("http.max_body_size", 65_536)? // 64KB
            .set_default("http.server_name", "contact-relay")?
            .set_default("http.trust_forwarded_headers", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout_secs", 30)?
            .set_override("notifier.webhook_url", webhook)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_FILE: &str = "this-config-file-does-not-exist";

    #[test]
    fn test_missing_webhook_is_fatal() {
        let err = Config::load_from(MISSING_FILE, None).unwrap_err();
        assert!(err.to_string().contains("DISCORD_WEBHOOK"));
    }

    #[test]
    fn test_blank_webhook_is_fatal() {
        assert!(Config::load_from(MISSING_FILE, Some("   ".to_string())).is_err());
    }

    #[test]
    fn test_webhook_only_comes_from_environment() {
        let dir = crate::testing::temp_dir("config-webhook");
        let path = dir.join("contact.toml");
        std::fs::write(
            &path,
            "[notifier]\nwebhook_url = \"https://hooks.example.com/from-file\"\n\n[server]\nport = 9191\n",
        )
        .unwrap();
        let path = path.display().to_string();

        let err = Config::load_from(&path, None).unwrap_err();
        assert!(err.to_string().contains("DISCORD_WEBHOOK"));

        let config =
            Config::load_from(&path, Some("https://hooks.example.com/env".to_string())).unwrap();
        assert_eq!(config.notifier.webhook_url, "https://hooks.example.com/env");
        assert_eq!(config.server.port, 9191);
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::load_from(MISSING_FILE, Some("https://hooks.example.com/x".to_string()))
                .unwrap();
        assert_eq!(config.notifier.webhook_url, "https://hooks.example.com/x");
        assert_eq!(config.server.port, 9080);
        assert_eq!(config.storage.messages_file, "contact_messages.jsonl");
        assert_eq!(config.static_files.root, "./static");
        assert_eq!(config.static_files.assets_prefix, "/assets");
        assert_eq!(config.notifier.color, 3_447_003);
        assert!(config.http.trust_forwarded_headers);
        assert_eq!(
            config.get_socket_addr().unwrap(),
            "0.0.0.0:9080".parse::<SocketAddr>().unwrap()
        );
    }
}
