//! Bootstrap configuration loading
//!
//! The TOML file holds deployment settings (listen address, upstream endpoints,
//! credentials, pipeline limits). Every field is optional: the service layer
//! merges it with command-line arguments and environment variables and fills
//! the remaining gaps with built-in defaults.
//!
//! Config file location priority:
//! 1. Explicit path (command-line argument)
//! 2. Environment variable
//! 3. `<config_dir>/cdl/<file_name>` when it exists
//! 4. None (built-in defaults only)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of concurrent external calls per batch
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Default timeout applied to each store write and gateway send
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// HTTP server bind address
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Supabase project URL (record store)
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Supabase service key
    #[serde(default)]
    pub supabase_key: Option<String>,

    /// Evolution API base URL (WhatsApp gateway)
    #[serde(default)]
    pub evolution_url: Option<String>,

    /// Evolution API instance name
    #[serde(default)]
    pub evolution_instance: Option<String>,

    /// Evolution API key
    #[serde(default)]
    pub evolution_api_key: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Batch pipeline limits (optional)
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Limits shared by the batch importer and the bulk dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PipelineSettings {
    /// Maximum external calls in flight for one batch
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Per-call timeout in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}

impl PipelineSettings {
    /// Effective worker count (a configured 0 still runs one worker)
    pub fn concurrency(&self) -> usize {
        self.max_in_flight.max(1)
    }

    /// Per-call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

/// Resolve the config file path
///
/// An explicit path (CLI or environment) is returned even if it does not exist,
/// so that [`load_toml_config`] can report it. The per-user default is only
/// returned when present.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    file_name: &str,
) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("cdl").join(file_name))
        .filter(|p| p.exists())
}

/// Load TOML configuration, or defaults when no file is configured
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        tracing::debug!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    tracing::info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Parse TOML configuration from a string
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}
