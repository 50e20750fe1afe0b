//! Logger module
//!
//! Plain stdout/stderr logging helpers for server lifecycle events, access
//! lines, and errors.

use crate::config::Config;
use chrono::Local;
use hyper::{Method, StatusCode, Uri, Version};
use std::net::SocketAddr;
use std::path::Path;

pub fn log_server_start(addr: &SocketAddr, config: &Config, root: &Path) {
    println!("======================================");
    println!("File server started successfully");
    println!("Listening on: http://{addr}");
    println!("Root directory: {}", root.display());
    println!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("Using Tokio runtime for concurrency");
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

/// Access log line with a local timestamp, common log format flavor
pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    println!(
        "[{}] \"{method} {uri} {version:?}\"",
        Local::now().format("%d/%b/%Y:%H:%M:%S %z")
    );
}

pub fn log_response(method: &Method, path: &str, status: StatusCode) {
    println!("[Response] {method} {path} -> {status}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}
