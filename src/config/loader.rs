// src/config/loader.rs
//! Layered configuration loader
//!
//! Defaults are overlaid by each existing TOML file in order, then by
//! `EMG_<SECTION>_<KEY>` environment variables, and the result is validated.

use crate::config::{constants::paths, EnvelopeConfig};
use crate::error::EnvelopeError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicitly named file does not exist
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML syntax or type mismatch
    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Export failed to serialize
    #[error("Configuration serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Reading or writing a file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One message per failed consistency rule
    #[error("Configuration validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl From<ConfigError> for EnvelopeError {
    fn from(err: ConfigError) -> Self {
        EnvelopeError::configuration("loader", err.to_string())
    }
}

/// Configuration loader over an ordered list of TOML files
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create loader over the default search paths
    pub fn new() -> Self {
        Self {
            config_paths: vec![
                PathBuf::from(paths::DEFAULT_CONFIG_FILE),
                PathBuf::from(paths::LOCAL_CONFIG_FILE),
            ],
        }
    }

    /// Create loader with custom paths; later paths take precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
        }
    }

    /// Search paths in merge order
    pub fn paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load, merge, apply environment overrides and validate
    pub fn load(&self) -> Result<EnvelopeConfig, ConfigError> {
        self.load_with_env(std::env::vars())
    }

    /// Same as [`load`](Self::load) with an explicit set of variables
    pub fn load_with_env<I>(&self, vars: I) -> Result<EnvelopeConfig, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = toml::Value::try_from(EnvelopeConfig::default())?;

        for path in &self.config_paths {
            if !path.exists() {
                continue;
            }
            let overlay = Self::load_config_file(path)?;
            merge_toml_values(&mut merged, overlay);
            tracing::info!(path = %path.display(), "configuration file merged");
        }

        apply_environment_overrides(&mut merged, vars);

        let config: EnvelopeConfig = merged.try_into()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse and validate a standalone TOML document over the defaults
    pub fn load_str(content: &str) -> Result<EnvelopeConfig, ConfigError> {
        let config: EnvelopeConfig = toml::from_str(content)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate a configuration file without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content).map(|_| ())
    }

    /// Write a configuration as pretty TOML
    pub fn export_config<P: AsRef<Path>>(
        config: &EnvelopeConfig,
        path: P,
    ) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(config: &EnvelopeConfig) -> Result<(), ConfigError> {
        config
            .validate_consistency()
            .map_err(ConfigError::Validation)?;
        if !config.is_nominal_rate() {
            tracing::warn!(
                sampling_rate_hz = config.system.sampling_rate_hz,
                "window lengths assume 2000 Hz; output cadence will scale with the rate"
            );
        }
        Ok(())
    }

    fn load_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(base_value) => merge_toml_values(base_value, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// `EMG_SYSTEM_CHANNEL_COUNT=4` sets `system.channel_count`
///
/// Fields that already hold an array take a comma-separated list, so
/// `EMG_CALIBRATION_RMS=900` yields a one-entry table.
fn apply_environment_overrides<I>(config: &mut toml::Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(path) = key.strip_prefix(paths::ENV_PREFIX) else {
            continue;
        };
        let lowered = path.to_lowercase();
        let Some((section, field)) = lowered.split_once('_') else {
            continue;
        };

        let Some(table) = config.get_mut(section).and_then(toml::Value::as_table_mut) else {
            tracing::warn!(variable = %key, "ignoring override for unknown section");
            continue;
        };
        let parsed = match table.get(field) {
            Some(toml::Value::Array(_)) => parse_env_list(&value),
            _ => parse_env_value(&value),
        };
        tracing::debug!(section, field, "environment override");
        table.insert(field.to_string(), parsed);
    }
}

fn parse_env_value(value: &str) -> toml::Value {
    let value = value.trim();
    if let Ok(int_val) = value.parse::<i64>() {
        return toml::Value::Integer(int_val);
    }
    if let Ok(bool_val) = value.parse::<bool>() {
        return toml::Value::Boolean(bool_val);
    }
    toml::Value::String(value.to_string())
}

/// Comma-separated list; empty items are skipped and an empty string is `[]`
fn parse_env_list(value: &str) -> toml::Value {
    let items = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_env_value)
        .collect();
    toml::Value::Array(items)
}
