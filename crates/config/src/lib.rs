//! Configuration loading and validation for Tubeknit.
//!
//! Loads configuration from `~/.tubeknit/config.toml` with environment
//! variable overrides. A missing file means defaults. Validated on load.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tubeknit_core::{Carrier, Header};

/// The root configuration structure.
///
/// Maps directly to `~/.tubeknit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnitConfig {
    /// Target machine and its feeders
    #[serde(default)]
    pub machine: MachineConfig,

    /// Stitch size presets
    #[serde(default)]
    pub stitch: StitchConfig,

    /// Width change and bind-off tuning
    #[serde(default)]
    pub shaping: ShapingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Machine name written to the knitout header.
    #[serde(default = "default_machine")]
    pub name: String,

    /// Carriers the machine has.
    #[serde(default = "default_carriers")]
    pub carriers: Vec<Carrier>,
}

fn default_machine() -> String {
    "SWGN2".into()
}
fn default_carriers() -> Vec<Carrier> {
    (1..=10).map(Carrier).collect()
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: default_machine(),
            carriers: default_carriers(),
        }
    }
}

/// `x-stitch-number` presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchConfig {
    #[serde(default = "default_cast_on")]
    pub cast_on: u32,

    #[serde(default = "default_body")]
    pub body: u32,

    #[serde(default = "default_bindoff")]
    pub bindoff: u32,

    #[serde(default = "default_tuck")]
    pub tuck: u32,
}

fn default_cast_on() -> u32 {
    102
}
fn default_body() -> u32 {
    101
}
fn default_bindoff() -> u32 {
    103
}
fn default_tuck() -> u32 {
    5
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            cast_on: default_cast_on(),
            body: default_body(),
            bindoff: default_bindoff(),
            tuck: default_tuck(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapingConfig {
    /// Stitches in from the edge that increases and decreases are made.
    #[serde(default = "default_width_change_stitches")]
    pub width_change_stitches: i32,

    /// Bind-off anchor tuck distance in stitches (0 is tight).
    #[serde(default)]
    pub bindoff_slack: i32,
}

fn default_width_change_stitches() -> i32 {
    2
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            width_change_stitches: default_width_change_stitches(),
            bindoff_slack: 0,
        }
    }
}

impl KnitConfig {
    /// Load configuration from the default path (~/.tubeknit/config.toml).
    ///
    /// `TUBEKNIT_MACHINE` overrides the machine name.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::load_from(&Self::config_path())?.with_env_overrides())
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_machine_override(std::env::var("TUBEKNIT_MACHINE").ok())
    }

    fn with_machine_override(mut self, machine: Option<String>) -> Self {
        if let Some(name) = machine.filter(|n| !n.trim().is_empty()) {
            self.machine.name = name;
        }
        self
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tubeknit")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.machine.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "machine.name must not be empty".into(),
            ));
        }

        if self.machine.carriers.is_empty() {
            return Err(ConfigError::ValidationError(
                "machine.carriers must list at least one carrier".into(),
            ));
        }

        if self.machine.carriers.contains(&Carrier(0)) {
            return Err(ConfigError::ValidationError(
                "machine.carriers are numbered from 1".into(),
            ));
        }

        let unique: HashSet<&Carrier> = self.machine.carriers.iter().collect();
        if unique.len() != self.machine.carriers.len() {
            return Err(ConfigError::ValidationError(
                "machine.carriers contains duplicates".into(),
            ));
        }

        if self.shaping.width_change_stitches < 1 {
            return Err(ConfigError::ValidationError(
                "shaping.width_change_stitches must be at least 1".into(),
            ));
        }

        if self.shaping.bindoff_slack < 0 {
            return Err(ConfigError::ValidationError(
                "shaping.bindoff_slack must not be negative".into(),
            ));
        }

        if self.shaping.bindoff_slack >= 3 {
            tracing::warn!(
                slack = self.shaping.bindoff_slack,
                "bind-off slack of 3 or more makes a very loose edge"
            );
        }

        Ok(())
    }

    /// Whether `carrier` exists on the configured machine.
    pub fn has_carrier(&self, carrier: Carrier) -> bool {
        self.machine.carriers.contains(&carrier)
    }

    /// The knitout header for the configured machine.
    pub fn header(&self) -> Header {
        Header {
            machine: self.machine.name.clone(),
            carriers: self.machine.carriers.clone(),
        }
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
