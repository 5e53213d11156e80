//! Configuration file loading with precedence handling.

use crate::cluster::ClusterOptions;
use crate::model::RenderSize;
use crate::view_state::pan::DEFAULT_PAN_FRACTION;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FIELDMATCH_CONFIG";

/// Environment variable overriding the log file path.
pub const LOG_FILE_ENV_VAR: &str = "FIELDMATCH_LOG_FILE";

/// Default render target handed to line lookups (US Letter at 100 px/in).
pub const DEFAULT_RENDER_WIDTH: f64 = 850.0;
/// Default render target height; see [`DEFAULT_RENDER_WIDTH`].
pub const DEFAULT_RENDER_HEIGHT: f64 = 1100.0;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A setting parsed but is out of range.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Config key at fault.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/fieldmatch/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Share of the container width a same-line sweep may pan.
    #[serde(default)]
    pub pan_fraction: Option<f64>,

    /// Field count above which a line is a table row without repetition.
    #[serde(default)]
    pub table_density_threshold: Option<usize>,

    /// Keep the previous highlight when a new batch resolves nothing.
    #[serde(default)]
    pub preserve_highlight_on_failure: Option<bool>,

    /// Width of the render target for line lookups.
    #[serde(default)]
    pub render_width: Option<f64>,

    /// Height of the render target for line lookups.
    #[serde(default)]
    pub render_height: Option<f64>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Pan fraction for same-line sweeps.
    pub pan_fraction: f64,
    /// Table density threshold.
    pub table_density_threshold: usize,
    /// Preserve highlight when a batch resolves nothing.
    pub preserve_highlight_on_failure: bool,
    /// Render target width.
    pub render_width: f64,
    /// Render target height.
    pub render_height: f64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            log_file_path: default_log_path(),
            pan_fraction: DEFAULT_PAN_FRACTION,
            table_density_threshold: ClusterOptions::default().density_threshold,
            preserve_highlight_on_failure: false,
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
        }
    }
}

impl ResolvedConfig {
    /// Clustering options derived from this config.
    pub fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            density_threshold: self.table_density_threshold,
        }
    }

    /// Render target for line lookups.
    pub fn render_size(&self) -> RenderSize {
        RenderSize::new(self.render_width, self.render_height)
    }

    /// Check value ranges that the types alone cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first setting out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.pan_fraction) {
            return Err(ConfigError::InvalidValue {
                key: "pan_fraction",
                reason: format!("{} is not within 0.0..=1.0", self.pan_fraction),
            });
        }
        if !self.render_size().is_usable() {
            return Err(ConfigError::InvalidValue {
                key: "render_width/render_height",
                reason: format!(
                    "{}x{} is not a positive size",
                    self.render_width, self.render_height
                ),
            });
        }
        Ok(())
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/fieldmatch/fieldmatch.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("fieldmatch").join("fieldmatch.log")
    } else {
        PathBuf::from("fieldmatch.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/fieldmatch/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fieldmatch").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `FIELDMATCH_CONFIG` environment variable
/// 3. Default path `~/.config/fieldmatch/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `FIELDMATCH_LOG_FILE`: Override log file path
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(path) = std::env::var_os(LOG_FILE_ENV_VAR) {
        if !path.is_empty() {
            config.log_file_path = PathBuf::from(path);
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        pan_fraction: config.pan_fraction.unwrap_or(defaults.pan_fraction),
        table_density_threshold: config
            .table_density_threshold
            .unwrap_or(defaults.table_density_threshold),
        preserve_highlight_on_failure: config
            .preserve_highlight_on_failure
            .unwrap_or(defaults.preserve_highlight_on_failure),
        render_width: config.render_width.unwrap_or(defaults.render_width),
        render_height: config.render_height.unwrap_or(defaults.render_height),
    }
}

/// Settings the command line may override. `None` means "flag not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// Overrides `table_density_threshold`.
    pub table_density_threshold: Option<usize>,
    /// Overrides `render_width`.
    pub render_width: Option<f64>,
    /// Overrides `render_height`.
    pub render_height: Option<f64>,
    /// Forces `preserve_highlight_on_failure` on.
    pub preserve_highlight_on_failure: Option<bool>,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(threshold) = overrides.table_density_threshold {
        config.table_density_threshold = threshold;
    }
    if let Some(width) = overrides.render_width {
        config.render_width = width;
    }
    if let Some(height) = overrides.render_height {
        config.render_height = height;
    }
    if let Some(preserve) = overrides.preserve_highlight_on_failure {
        config.preserve_highlight_on_failure = preserve;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
