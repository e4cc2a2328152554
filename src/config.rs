use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MAX_WORKERS: usize = 50;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub const USAGE: &str = "usage: webroot <root-directory> [port]";

/// Immutable server settings, fixed at startup and shared by every connection.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory beyond which nothing is served
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    /// Upper bound on connections handled concurrently
    pub max_workers: usize,
    /// How long a client may take to send its request line
    pub read_timeout: Duration,
    /// How long sending the response may stall before the connection is dropped
    pub write_timeout: Duration,
    /// How long shutdown waits for in-flight connections before aborting them
    pub shutdown_grace: Duration,
}

/// Optional tuning file, pointed to by `WEBROOT_CONFIG`.
///
/// ```yaml
/// host: 127.0.0.1
/// max_workers: 16
/// read_timeout_secs: 10
/// write_timeout_secs: 10
/// shutdown_grace_secs: 2
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_workers: Option<usize>,
    pub read_timeout_secs: Option<u64>,
    pub write_timeout_secs: Option<u64>,
    pub shutdown_grace_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, ServerError> {
        serde_yaml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_workers: DEFAULT_MAX_WORKERS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_READ_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Builds the configuration from the process arguments (without the
    /// program name) and environment.
    pub fn load(args: &[String]) -> Result<Self, ServerError> {
        Self::from_sources(args, |key| std::env::var(key).ok())
    }

    /// Layering, lowest to highest priority: defaults, the YAML file named by
    /// `WEBROOT_CONFIG`, `WEBROOT_*` variables, positional arguments.
    pub fn from_sources<F>(args: &[String], env: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = args
            .first()
            .ok_or_else(|| ServerError::Config(USAGE.to_string()))?;

        let mut cfg = Self::new(root);

        if let Some(path) = env("WEBROOT_CONFIG") {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ServerError::Config(format!("cannot read {path}: {e}")))?;
            cfg.merge(FileConfig::parse(&text)?);
        }

        if let Some(host) = env("WEBROOT_HOST") {
            cfg.host = host;
        }
        if let Some(workers) = env("WEBROOT_MAX_WORKERS") {
            match workers.parse() {
                Ok(n) => cfg.max_workers = n,
                Err(_) => tracing::warn!(value = %workers, "Ignoring invalid WEBROOT_MAX_WORKERS"),
            }
        }

        if let Some(port) = args.get(1) {
            cfg.port = parse_port(port);
        }

        if cfg.max_workers == 0 {
            return Err(ServerError::Config("max_workers must be at least 1".to_string()));
        }

        Ok(cfg)
    }

    /// Overlays the file's settings. The write timeout follows the read
    /// timeout unless the file sets it explicitly.
    pub fn merge(&mut self, file: FileConfig) {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(n) = file.max_workers {
            self.max_workers = n;
        }
        if let Some(secs) = file.read_timeout_secs {
            self.read_timeout = Duration::from_secs(secs);
            self.write_timeout = self.read_timeout;
        }
        if let Some(secs) = file.write_timeout_secs {
            self.write_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.shutdown_grace_secs {
            self.shutdown_grace = Duration::from_secs(secs);
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses a port argument, falling back to [`DEFAULT_PORT`] with a warning
/// when it is not a number in 1..=65535.
pub fn parse_port(arg: &str) -> u16 {
    match arg.trim().parse::<u32>() {
        Ok(port) if (1..=u32::from(u16::MAX)).contains(&port) => port as u16,
        Ok(port) => {
            tracing::warn!(port, default = DEFAULT_PORT, "Port not in range (1-65535), using default");
            DEFAULT_PORT
        }
        Err(_) => {
            tracing::warn!(value = %arg, default = DEFAULT_PORT, "Port not a number, using default");
            DEFAULT_PORT
        }
    }
}
