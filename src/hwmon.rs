// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! hwmon sysfs access.
//!
//! Thin wrappers around the `tempN_input`, `pwmN` and `pwmN_enable` files of
//! an amdgpu hwmon device, implementing the controller's device traits.

use crate::controller::{DutySink, ModeSink, SensorSource};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Temperature input
// ---------------------------------------------------------------------------

/// A `tempN_input` file (millidegrees C).
#[derive(Debug, Clone)]
pub struct TempInput {
    path: PathBuf,
}

impl TempInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SensorSource for TempInput {
    fn read_millidegrees(&mut self) -> Result<i64> {
        let content = read_trimmed(&self.path)?;
        content.parse::<i64>().map_err(|source| Error::Parse {
            path: self.path.clone(),
            content,
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// PWM outputs
// ---------------------------------------------------------------------------

/// A `pwmN` duty file (0-255).
#[derive(Debug, Clone)]
pub struct PwmOutput {
    path: PathBuf,
}

impl PwmOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DutySink for PwmOutput {
    fn write_duty(&mut self, duty: i32) -> Result<()> {
        write_value(&self.path, &format!("{duty}"))
    }
}

/// A `pwmN_enable` mode file.
///   1 = manual PWM control
///   2 = automatic (driver)
#[derive(Debug, Clone)]
pub struct PwmEnable {
    path: PathBuf,
}

impl PwmEnable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModeSink for PwmEnable {
    fn write_mode(&mut self, mode: &str) -> Result<()> {
        write_value(&self.path, mode)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_trimmed(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim_end().to_string())
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn write_value(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::millidegrees_to_celsius;
    use std::env;
    use std::process;

    /// A fresh directory standing in for `/sys/class/hwmon/hwmonN`,
    /// removed again on drop.
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(name: &str) -> Self {
            let dir = env::temp_dir().join(format!("amdgpu-tweaks-{}-{name}", process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn join(&self, file: &str) -> PathBuf {
            self.0.join(file)
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_read_temp_input() {
        let dir = ScratchDir::new("temp-ok");
        let path = dir.join("temp1_input");
        fs::write(&path, "52500\n").unwrap();

        let mut sensor = TempInput::new(&path);
        let raw = sensor.read_millidegrees().unwrap();
        assert_eq!(raw, 52500);
        assert_eq!(millidegrees_to_celsius(raw), 52.5);
    }

    #[test]
    fn test_read_temp_input_garbage() {
        let dir = ScratchDir::new("temp-garbage");
        let path = dir.join("temp1_input");
        fs::write(&path, "hot\n").unwrap();

        let err = TempInput::new(&path).read_millidegrees().unwrap_err();
        match err {
            Error::Parse { content, .. } => assert_eq!(content, "hot"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_temp_input_missing() {
        let dir = ScratchDir::new("temp-missing");
        let err = TempInput::new(dir.join("temp1_input"))
            .read_millidegrees()
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_write_pwm_and_mode() {
        let dir = ScratchDir::new("pwm");
        let mut pwm = PwmOutput::new(dir.join("pwm1"));
        let mut enable = PwmEnable::new(dir.join("pwm1_enable"));

        enable.write_mode("1").unwrap();
        pwm.write_duty(87).unwrap();

        assert_eq!(fs::read_to_string(dir.join("pwm1_enable")).unwrap(), "1");
        assert_eq!(fs::read_to_string(dir.join("pwm1")).unwrap(), "87");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = ScratchDir::new("pwm-missing");
        let mut pwm = PwmOutput::new(dir.join("gone").join("pwm1"));
        assert!(matches!(pwm.write_duty(100), Err(Error::Io { .. })));
    }

    #[test]
    fn test_scratch_dir_is_removed_on_drop() {
        let path = {
            let dir = ScratchDir::new("cleanup");
            fs::write(dir.join("pwm1"), "0").unwrap();
            dir.0.clone()
        };
        assert!(!path.exists());
    }
}
