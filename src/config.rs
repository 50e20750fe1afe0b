//! Configuration module
//!
//! Loads settings from an optional config file with SERVER_* environment
//! overrides, and holds the shared application state.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    /// Root directory all file operations are confined to (env: `SERVER_ROOT_DIR`)
    pub root_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

impl Config {
    /// Load configuration from config.toml (optional) and SERVER_* environment variables
    ///
    /// `root_dir` has no default: loading fails unless the config file or the
    /// `SERVER_ROOT_DIR` environment variable provides it.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "Tokio-Fileserver/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Shared application state passed to every request
pub struct AppState {
    pub config: Config,
    /// Canonicalized root directory, fixed for the process lifetime
    pub root: PathBuf,
    /// Cached access-log flag for lock-free per-request reads
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Validate the configured root directory and build the shared state
    ///
    /// Fails when the root directory is missing or not a directory, so the
    /// process exits before accepting any request.
    pub fn new(config: Config) -> Result<Self, String> {
        let root = PathBuf::from(&config.root_dir);
        if !root.exists() {
            return Err(format!(
                "Root directory does not exist: {}",
                root.display()
            ));
        }
        if !root.is_dir() {
            return Err(format!(
                "Root path is not a directory: {}",
                root.display()
            ));
        }
        let root = root.canonicalize().map_err(|e| {
            format!("Failed to resolve root directory {}: {e}", root.display())
        })?;

        let access_log = config.logging.access_log;
        Ok(Self {
            config,
            root,
            cached_access_log: AtomicBool::new(access_log),
        })
    }
}
