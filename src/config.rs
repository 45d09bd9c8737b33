// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Configuration file handling.
//!
//! The daemon reads a single TOML file at startup and never writes it back.
//! Default path: `/etc/amdgpu-tweaks/conf.toml`
//!
//! ```toml
//! PWMFile = "/sys/class/drm/card0/device/hwmon/hwmon0/pwm1"
//! FanModeFile = "/sys/class/drm/card0/device/hwmon/hwmon0/pwm1_enable"
//! TempFile = "/sys/class/drm/card0/device/hwmon/hwmon0/temp1_input"
//! PollFrequency = 1000
//! Hysteresis = 2.0
//!
//! [[Setpoint]]
//! Temp = 40.0
//! Fan = 50
//! ```

use crate::controller::Policy;
use crate::curve::{Curve, Setpoint};
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/amdgpu-tweaks/conf.toml";

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// `pwmN` file receiving duty values.
    #[serde(rename = "PWMFile")]
    pub pwm_file: PathBuf,

    /// `pwmN_enable` file switched to manual mode at startup. Older releases
    /// wrote the mode to `PWMFile`; this file is used instead.
    #[serde(rename = "FanModeFile")]
    pub fan_mode_file: PathBuf,

    /// `tempN_input` file, in millidegrees C.
    #[serde(rename = "TempFile")]
    pub temp_file: PathBuf,

    /// Sleep between sensor reads, in milliseconds.
    #[serde(rename = "PollFrequency")]
    pub poll_frequency_ms: u64,

    /// Minimum temperature change, in degrees, before a new duty is written.
    #[serde(rename = "Hysteresis")]
    pub hysteresis: f64,

    /// Fan curve vertices, in any order.
    #[serde(rename = "Setpoint", default)]
    pub setpoints: Vec<Setpoint>,

    /// Whether to hand the fan back to the driver on SIGINT/SIGTERM.
    #[serde(rename = "RestoreOnExit", default = "default_true")]
    pub restore_on_exit: bool,
}

impl Config {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.setpoints.is_empty() {
            return Err(ConfigError::EmptyCurve);
        }
        if let Some(index) = self.setpoints.iter().position(|p| !p.temp_c.is_finite()) {
            return Err(ConfigError::NonFiniteSetpoint { index });
        }
        if self.poll_frequency_ms == 0 {
            return Err(ConfigError::ZeroPollFrequency);
        }
        if !self.hysteresis.is_finite() || self.hysteresis < 0.0 {
            return Err(ConfigError::InvalidHysteresis(self.hysteresis));
        }
        Ok(())
    }

    /// The fan curve, sorted by temperature.
    pub fn curve(&self) -> Curve {
        Curve::new(self.setpoints.clone())
    }

    pub fn policy(&self) -> Policy {
        Policy {
            poll_interval: Duration::from_millis(self.poll_frequency_ms),
            hysteresis: self.hysteresis,
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate the config file. A missing file is an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = Config::from_toml(&contents, path)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the config file path from CLI arg or default.
pub fn resolve_config_path(cli_path: Option<&str>) -> PathBuf {
    cli_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}
