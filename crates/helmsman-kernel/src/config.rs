//! Engine configuration loading.
//!
//! Supports the same multi-format loading (YAML/TOML/JSON/INI/RON/JSON5) and `${VAR}`/`$VAR`
//! environment-variable substitution as the rest of this ecosystem's configuration loader, built
//! directly on the `config` crate's builder API.

use std::path::Path;
use std::time::Duration;

use ::config::{Config as Cfg, Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::ConfigError;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Whether the engine hard-exits on `reregistered`/`offerRescinded` (§6, §9 Open Question 1).
/// Both default to `true`, matching the documented behavior; an operator who knows their
/// deployment can tolerate re-registration or rescission may turn either off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPolicy {
    pub exit_on_reregistered: bool,
    pub exit_on_offer_rescinded: bool,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self { exit_on_reregistered: true, exit_on_offer_rescinded: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum interval between explicit reconciliation requests while tasks remain unconfirmed.
    pub reconciliation_backoff: Duration,
    /// How long a task may sit in an unhealthy state before recovery treats it as permanent.
    pub permanent_failure_timeout: Duration,
    /// Minimum delay between destructive (DESTROY/UNRESERVE) launches, per recovery manager.
    pub min_launch_interval: Duration,
    pub exit_policy: ExitPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconciliation_backoff: Duration::from_secs(10),
            permanent_failure_timeout: Duration::from_secs(20 * 60),
            min_launch_interval: Duration::from_secs(30),
            exit_policy: ExitPolicy::default(),
        }
    }
}

pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("no file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        "ini" => Ok(FileFormat::Ini),
        "ron" => Ok(FileFormat::Ron),
        "json5" => Ok(FileFormat::Json5),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

pub fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    let re_braced = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    result = re_braced
        .replace_all(&result, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string();

    let re_simple = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").unwrap();
    result = re_simple
        .replace_all(&result, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string();

    result
}

pub fn load_config<T: DeserializeOwned>(path: &str) -> ConfigResult<T> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let substituted = substitute_env_vars(&content);

    let config = Cfg::builder()
        .add_source(File::from_str(&substituted, format))
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    config.try_deserialize().map_err(|e| ConfigError::Deserialize(e.to_string()))
}

/// Loads an `EngineConfig` from a file, then layers environment-variable overrides prefixed
/// `HELMSMAN__`, using `__` to represent nesting (e.g. `HELMSMAN__EXIT_POLICY__EXIT_ON_REREGISTERED`).
pub fn load_engine_config(path: &str) -> ConfigResult<EngineConfig> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let substituted = substitute_env_vars(&content);

    let config = Cfg::builder()
        .add_source(File::from_str(&substituted, format))
        .add_source(Environment::with_prefix("HELMSMAN").separator("__"))
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    config.try_deserialize().map_err(|e| ConfigError::Deserialize(e.to_string()))
}
