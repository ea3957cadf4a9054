//! Logger module
//!
//! Logging utilities for the development server:
//! - server lifecycle logging
//! - access logging with multiple formats
//! - error and warning logging
//! - relay of client-posted messages into the server log
//! - optional file targets for both streams

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AppState, Config};
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to the info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to the error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    write_info("======================================");
    write_info("Development server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", state.config.logging.level));
    write_info(&format!("Static root: {}", state.static_root.display()));
    if state.write_enabled {
        write_info(&format!("Write directory: {}", state.write_dir.display()));
    } else {
        write_info(&format!(
            "Writes disabled (create {} to enable)",
            state.write_dir.display()
        ));
    }
    if let Some(workers) = state.config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = state.config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = state.config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
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

/// Log a formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

/// Record a file persisted by the write endpoint
pub fn log_file_written(path: &Path) {
    write_info(&format!("[INFO] wrote {}", path.display()));
}

/// Relay a message posted by the client into the server log
pub fn log_client_message(msg: &str) {
    write_info(&format!("[INFO] client: {msg}"));
}

pub fn log_shutdown_requested() {
    write_info("\n[Signal] Shutdown requested, stopping accept loop");
}

pub fn log_server_stopped() {
    write_info("[Signal] Server stopped");
}
