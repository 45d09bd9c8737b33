// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Error types shared by the controller, the sysfs adapters and the
//! configuration loader.
//!
//! Every error is fatal to the daemon: nothing here is retried.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading the sensor or writing a sink failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sensor file did not hold an integer.
    #[error("could not parse {content:?} from {} as an integer: {source}", path.display())]
    Parse {
        path: PathBuf,
        content: String,
        #[source]
        source: ParseIntError,
    },
}

/// Malformed, missing or unusable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("fan curve has no setpoints")]
    EmptyCurve,

    #[error("setpoint {index} has a non-finite temperature")]
    NonFiniteSetpoint { index: usize },

    #[error("poll frequency must be greater than 0 ms")]
    ZeroPollFrequency,

    #[error("hysteresis must be a finite, non-negative number of degrees (got {0})")]
    InvalidHysteresis(f64),
}
