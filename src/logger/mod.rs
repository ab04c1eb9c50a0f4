//! Logger module
//!
//! Bracket-tagged operational lines plus an access log. Info, contact and
//! notifier lines go to the access target (stdout by default); errors and
//! warnings go to the error target (stderr by default).

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use crate::contact::ContactMessage;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Until then every line
/// falls back to stdout/stderr.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(&format!("Server running: http://{addr}/"));
    write_info(&format!("Static root: {}", config.static_files.root));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

/// One line per accepted submission
pub fn log_contact(message: &ContactMessage) {
    write_info(&format!(
        "[CONTACT] {} from {} - {}",
        message.ts, message.email, message.name
    ));
}

/// Webhook delivery problems; reported on the info target, never raised
pub fn log_notify(message: &str) {
    write_info(&format!("[NOTIFY] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    write_info(&entry.format(format));
}
