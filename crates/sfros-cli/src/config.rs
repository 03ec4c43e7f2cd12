//! Simulator configuration – reads/writes `~/.sfros/config.toml`.
//!
//! The file is created with defaults on first run.
//!
//! ```toml
//! node_name = "sim_left"
//! tick_period_us = 16667
//! bridge_addr = "127.0.0.1:9090"
//!
//! [helpers]
//! show_sensors = true
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sfros_types::{HelperSettings, SimError};
use tracing::{info, warn};

/// Persisted simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Node name; each binary falls back to its own name when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    /// Period of the tick timer in microseconds.
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u64,

    /// Listen address of the WebSocket service bridge.  Empty disables it.
    #[serde(default = "default_bridge_addr")]
    pub bridge_addr: String,

    /// Engine debug helpers shown in the windowed simulator.
    #[serde(default)]
    pub helpers: HelperSettings,
}

fn default_tick_period_us() -> u64 {
    16_667
}

fn default_bridge_addr() -> String {
    "127.0.0.1:9090".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_name: None,
            tick_period_us: default_tick_period_us(),
            bridge_addr: default_bridge_addr(),
            helpers: HelperSettings::default(),
        }
    }
}

impl Config {
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(self.tick_period_us)
    }

    /// Parsed bridge address, `None` when the bridge is disabled.
    pub fn bridge_addr(&self) -> Result<Option<SocketAddr>, SimError> {
        let raw = self.bridge_addr.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|e| SimError::Config(format!("Invalid bridge_addr '{raw}': {e}")))
    }

    /// Configured node name, or `fallback`.
    pub fn node_name_or(&self, fallback: &str) -> String {
        self.node_name.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Return the path to `~/.sfros/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".sfros").join("config.toml")
}

/// Resolve the configuration for a run.
///
/// An explicit path must exist.  Without one, `~/.sfros/config.toml` is read
/// when present and written with defaults otherwise.  Environment overrides
/// are applied last in both cases.
pub fn load(explicit: Option<&Path>) -> Result<Config, SimError> {
    let mut cfg = match explicit {
        Some(path) => load_from(path)?.ok_or_else(|| {
            SimError::Config(format!("No config file at {}", path.display()))
        })?,
        None => load_or_init(&config_path())?,
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Read `path`, or write the defaults there when it does not exist.  A
/// failed write is logged and the defaults are still used.
pub fn load_or_init(path: &Path) -> Result<Config, SimError> {
    if let Some(cfg) = load_from(path)? {
        return Ok(cfg);
    }
    let cfg = Config::default();
    match save_to(&cfg, path) {
        Ok(()) => info!(path = %path.display(), "wrote default config"),
        Err(e) => warn!(error = %e, "could not write default config"),
    }
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does not
/// exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, SimError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        SimError::Config(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| SimError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(Some(cfg))
}

/// Apply `SFROS_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SFROS_NODE_NAME` | `node_name` |
/// | `SFROS_TICK_PERIOD_US` | `tick_period_us` (ignored unless a positive integer) |
/// | `SFROS_BRIDGE_ADDR` | `bridge_addr` (empty disables the bridge) |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SFROS_NODE_NAME")
        && !v.is_empty()
    {
        cfg.node_name = Some(v);
    }
    if let Some(v) = lookup("SFROS_TICK_PERIOD_US")
        && let Ok(us) = v.parse::<u64>()
        && us > 0
    {
        cfg.tick_period_us = us;
    }
    if let Some(v) = lookup("SFROS_BRIDGE_ADDR") {
        cfg.bridge_addr = v;
    }
}

/// Save the config to `path` with owner-only permissions, creating its
/// directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), SimError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SimError::Config(format!("Failed to create config directory: {}", e)))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                SimError::Config(format!("Failed to set config directory permissions: {}", e))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| SimError::Config(format!("Failed to serialize config: {}", e)))?;
    let write_err = |e: std::io::Error| {
        SimError::Config(format!("Failed to write config at {}: {}", path.display(), e))
    };
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;
    Ok(())
}
