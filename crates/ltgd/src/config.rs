//! Daemon configuration.
//!
//! Settings are assembled in three layers, last wins: built-in defaults,
//! an optional TOML config file, then CLI overrides applied by the binary.
//! The assembled config is validated once and never changes while the
//! daemon runs.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default TCP port the daemon listens on.
pub const DEFAULT_PORT: u16 = 5000;

/// Lowest port accepted from configuration; the daemon never binds
/// privileged ports.
pub const MIN_PORT: u16 = 1024;

/// Default unprivileged user the daemon drops to.
pub const DEFAULT_USER: &str = "nobody";

/// Default unprivileged group the daemon drops to.
pub const DEFAULT_GROUP: &str = "nogroup";

/// Immutable daemon settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Address the listener binds to.
    pub bind_addr: IpAddr,

    /// Port the listener binds to (1024-65535).
    pub port: u16,

    /// User the daemon drops to when started with elevated rights.
    pub user: String,

    /// Group the daemon drops to when started with elevated rights.
    pub group: String,

    /// Path of the exclusively-locked PID file.
    pub pid_file: PathBuf,

    /// File stdout/stderr are redirected to when daemonized.
    pub log_file: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let state_dir = default_state_dir();
        Self {
            bind_addr: IpAddr::V6(Ipv6Addr::LOCALHOST),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            group: DEFAULT_GROUP.to_string(),
            pid_file: state_dir.join("ltgd.pid"),
            log_file: state_dir.join("ltgd.log"),
        }
    }
}

impl DaemonConfig {
    /// Builds the config from defaults plus an optional TOML file.
    ///
    /// CLI overrides are applied by the caller after loading.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = path {
            let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            })?;
            let overlay = Self::parse_toml(&text).map_err(|reason| ConfigError::Invalid {
                path: path.to_path_buf(),
                reason,
            })?;
            config.apply(overlay);
        }
        Ok(config)
    }

    /// Rejects settings no daemon run should proceed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port < MIN_PORT {
            return Err(ConfigError::PortOutOfRange { port: self.port });
        }
        if self.user.trim().is_empty() {
            return Err(ConfigError::EmptyIdentity { field: "user" });
        }
        if self.group.trim().is_empty() {
            return Err(ConfigError::EmptyIdentity { field: "group" });
        }
        Ok(())
    }

    /// The full socket address the listener binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    fn parse_toml(text: &str) -> Result<ConfigFile, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    fn apply(&mut self, overlay: ConfigFile) {
        if let Some(bind_addr) = overlay.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = overlay.port {
            self.port = port;
        }
        if let Some(user) = overlay.user {
            self.user = user;
        }
        if let Some(group) = overlay.group {
            self.group = group;
        }
        if let Some(pid_file) = overlay.pid_file {
            self.pid_file = pid_file;
        }
        if let Some(log_file) = overlay.log_file {
            self.log_file = log_file;
        }
    }
}

impl fmt::Display for DaemonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} as {}:{} (pid file {})",
            self.socket_addr(),
            self.user,
            self.group,
            self.pid_file.display()
        )
    }
}

/// TOML file shape; every field optional so the file can override any
/// subset of the defaults. Unknown keys are rejected to catch typos.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bind_addr: Option<IpAddr>,
    port: Option<u16>,
    user: Option<String>,
    group: Option<String>,
    pid_file: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

/// Directory for the default PID and log files.
pub fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ltg")
}

/// Errors in configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {}", .path.display(), .source)]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {}", .path.display(), .reason)]
    Invalid { path: PathBuf, reason: String },

    #[error("Port {port} out of range (valid: 1024-65535)")]
    PortOutOfRange { port: u16 },

    #[error("Config field '{field}' must not be empty")]
    EmptyIdentity { field: &'static str },
}
