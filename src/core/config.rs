//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.vista/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::retry::RetryPolicy;
use crate::core::upload::DEFAULT_MAX_UPLOAD_BYTES;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct VistaConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UploadConfig {
    pub max_bytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PollingConfig {
    pub interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub reveal_speed_ms: Option<u64>,
    pub show_sidebar: Option<bool>,
    pub show_thoughts: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_REVEAL_SPEED_MS: u64 = 30;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub max_upload_bytes: u64,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub reveal_speed: Duration,
    pub show_sidebar: bool,
    pub show_thoughts: bool,
}

impl ResolvedConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.poll_max_attempts, self.poll_interval)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.vista/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".vista").join("config.toml"))
}

/// Load config from `~/.vista/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `VistaConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<VistaConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(VistaConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<VistaConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(VistaConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: VistaConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# Vista Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:8000/api"   # Or set VISTA_API_URL

# [upload]
# max_bytes = 104857600                     # 100 MiB

# [polling]
# interval_ms = 1000                        # Or set VISTA_POLL_INTERVAL_MS
# max_attempts = 30                         # Or set VISTA_POLL_MAX_ATTEMPTS

# [ui]
# reveal_speed_ms = 30                      # Per character, 0 disables the effect
# show_sidebar = true
# show_thoughts = true
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &VistaConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    resolve_with_env(config, cli_base_url, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable env lookup.
pub fn resolve_with_env(
    config: &VistaConfig,
    cli_base_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| env("VISTA_API_URL"))
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let poll_interval_ms = env_number(&env, "VISTA_POLL_INTERVAL_MS")
        .or(config.polling.interval_ms)
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

    let poll_max_attempts = env_number(&env, "VISTA_POLL_MAX_ATTEMPTS")
        .or(config.polling.max_attempts)
        .unwrap_or(DEFAULT_POLL_MAX_ATTEMPTS);

    ResolvedConfig {
        base_url,
        max_upload_bytes: config.upload.max_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        poll_interval: Duration::from_millis(poll_interval_ms),
        poll_max_attempts,
        reveal_speed: Duration::from_millis(
            config.ui.reveal_speed_ms.unwrap_or(DEFAULT_REVEAL_SPEED_MS),
        ),
        show_sidebar: config.ui.show_sidebar.unwrap_or(true),
        show_thoughts: config.ui.show_thoughts.unwrap_or(true),
    }
}

fn env_number<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}
