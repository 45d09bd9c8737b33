// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Hysteresis-gated control loop.
//!
//! The controller reads the sensor on a fixed interval and only writes a new
//! duty when the temperature moved by more than the hysteresis threshold
//! since the previous reading. Devices are reached through the
//! [`SensorSource`], [`DutySink`] and [`ModeSink`] traits so the loop can be
//! driven by in-memory fakes.

use crate::curve::Curve;
use crate::error::{ConfigError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// `pwmN_enable` value that hands duty control to userspace.
pub const MODE_MANUAL: &str = "1";

/// `pwmN_enable` value that returns control to the driver.
pub const MODE_AUTOMATIC: &str = "2";

// ---------------------------------------------------------------------------
// Device capabilities
// ---------------------------------------------------------------------------

/// Source of raw temperature readings in milli-degrees Celsius.
pub trait SensorSource {
    fn read_millidegrees(&mut self) -> Result<i64>;
}

/// Target for duty commands.
pub trait DutySink {
    fn write_duty(&mut self, duty: i32) -> Result<()>;
}

/// Target for fan mode commands.
pub trait ModeSink {
    fn write_mode(&mut self, mode: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Timing and threshold settings for the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    pub poll_interval: Duration,
    /// Minimum temperature change, in degrees, that triggers a write.
    pub hysteresis: f64,
}

/// Outcome of a single iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Temperature stayed within the hysteresis band; nothing written.
    Idle,
    /// A new duty has to be written.
    Correct { duty: i32 },
}

/// Convert a raw sensor reading to degrees Celsius.
pub fn millidegrees_to_celsius(millidegrees: i64) -> f64 {
    millidegrees as f64 / 1000.0
}

/// The reading the next one is compared against, kept in raw milli-degrees
/// so the delta is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub last_millidegrees: i64,
}

impl ControllerState {
    pub fn new(seed_millidegrees: i64) -> Self {
        Self {
            last_millidegrees: seed_millidegrees,
        }
    }

    pub fn last_celsius(&self) -> f64 {
        millidegrees_to_celsius(self.last_millidegrees)
    }

    /// Feed a new reading through the hysteresis gate.
    ///
    /// The state always moves to `current`, whether or not a correction was
    /// decided.
    pub fn advance(&mut self, current: i64, hysteresis: f64, curve: &Curve) -> Decision {
        let delta = current.abs_diff(self.last_millidegrees) as f64 / 1000.0;
        self.last_millidegrees = current;

        if delta > hysteresis {
            Decision::Correct {
                duty: curve.lookup(millidegrees_to_celsius(current)),
            }
        } else {
            Decision::Idle
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller<S, D> {
    curve: Curve,
    policy: Policy,
    sensor: S,
    sink: D,
    state: ControllerState,
}

impl<S: SensorSource, D: DutySink> Controller<S, D> {
    /// Run the startup sequence and return a controller ready to loop.
    ///
    /// Rejects an empty curve before touching any device, then switches the
    /// fan to manual mode and seeds the state from one sensor reading. The
    /// seed reading never causes a duty write.
    ///
    /// The manual-mode command goes to `mode`, the `pwmN_enable` file. Older
    /// amdgpu-tweaks releases wrote it to the `pwmN` duty file instead; that
    /// is intentionally not reproduced.
    pub fn start<M: ModeSink>(
        curve: Curve,
        policy: Policy,
        mut sensor: S,
        sink: D,
        mode: &mut M,
    ) -> Result<Self> {
        if curve.is_empty() {
            return Err(ConfigError::EmptyCurve.into());
        }

        mode.write_mode(MODE_MANUAL)?;
        log::info!("Fan switched to manual control");

        let seed = sensor.read_millidegrees()?;
        log::info!(
            "Initial temperature: {:.1}°C",
            millidegrees_to_celsius(seed)
        );

        Ok(Self {
            curve,
            policy,
            sensor,
            sink,
            state: ControllerState::new(seed),
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// One iteration without the trailing sleep.
    pub fn tick(&mut self) -> Result<Decision> {
        let raw = self.sensor.read_millidegrees()?;
        let previous = self.state.last_celsius();
        let current = millidegrees_to_celsius(raw);
        let decision = self
            .state
            .advance(raw, self.policy.hysteresis, &self.curve);

        match decision {
            Decision::Correct { duty } => {
                log::info!("Temperature {previous:.1}°C -> {current:.1}°C, writing PWM {duty}");
                self.sink.write_duty(duty)?;
            }
            Decision::Idle => {
                log::debug!("Temperature {current:.1}°C within hysteresis, no change");
            }
        }

        Ok(decision)
    }

    /// Loop forever, sleeping `poll_interval` between iterations.
    ///
    /// Returns `Ok(())` only once `shutdown` is set; any device error ends
    /// the loop immediately.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        while !shutdown.load(Ordering::Relaxed) {
            self.tick()?;
            thread::sleep(self.policy.poll_interval);
        }
        Ok(())
    }

    /// Give back the devices, e.g. to restore automatic mode.
    pub fn into_parts(self) -> (S, D) {
        (self.sensor, self.sink)
    }
}
