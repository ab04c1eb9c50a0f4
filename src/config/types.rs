// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(rename = "static")]
    pub static_files: StaticConfig,
    pub notifier: NotifierConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Append log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON Lines file every accepted submission is appended to
    pub messages_file: String,
}

/// Static file serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    /// Root directory of the single-page application build
    pub root: String,
    /// Document served for every unmatched route
    pub index_file: String,
    /// URL prefix mapped straight onto `assets_dir`
    pub assets_prefix: String,
    /// Assets directory, relative to `root`
    pub assets_dir: String,
}

/// Webhook notifier configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    /// Always taken from `DISCORD_WEBHOOK`
    #[serde(default)]
    pub webhook_url: String,
    pub title: String,
    pub color: u32,
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub max_body_size: u64,
    pub server_name: String,
    /// Resolve the client address from `X-Forwarded-For` / `X-Real-IP`
    pub trust_forwarded_headers: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub connection_timeout_secs: u64,
}
