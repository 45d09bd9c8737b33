// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Fan curve definitions and interpolation.
//!
//! A curve maps temperature readings to PWM duty values (0-255).
//! Duty is linearly interpolated between setpoints and floored.

use serde::Deserialize;

/// Returned by [`Curve::lookup`] when no duty could be chosen (empty curve).
/// It lies outside the 0-255 range a PWM file accepts.
pub const SENTINEL_DUTY: i32 = 256;

/// A single vertex of the fan curve.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Setpoint {
    /// Temperature in degrees Celsius
    #[serde(rename = "Temp")]
    pub temp_c: f64,
    /// PWM duty value (0-255)
    #[serde(rename = "Fan")]
    pub duty: u8,
}

impl Setpoint {
    pub fn new(temp_c: f64, duty: u8) -> Self {
        Self { temp_c, duty }
    }
}

/// An immutable fan curve. Setpoints are kept sorted by ascending temperature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    setpoints: Vec<Setpoint>,
}

impl Curve {
    /// Build a curve from setpoints in any order.
    ///
    /// The sort is stable, so setpoints sharing a temperature keep the order
    /// they were given in.
    pub fn new(mut setpoints: Vec<Setpoint>) -> Self {
        setpoints.sort_by(|a, b| a.temp_c.total_cmp(&b.temp_c));
        Self { setpoints }
    }

    pub fn setpoints(&self) -> &[Setpoint] {
        &self.setpoints
    }

    pub fn is_empty(&self) -> bool {
        self.setpoints.is_empty()
    }

    /// Map a temperature to a duty value.
    ///
    /// - At or below the lowest setpoint: the lowest setpoint's duty
    /// - Above the highest setpoint: the highest setpoint's duty
    /// - On a breakpoint: that breakpoint's duty
    /// - Strictly between two setpoints: `a + floor((b - a) / (tb - ta) * (t - ta))`
    /// - Empty curve: [`SENTINEL_DUTY`]
    ///
    /// The interpolated value is not clamped to the duty range of the segment
    /// or to 0-255.
    pub fn lookup(&self, temp_c: f64) -> i32 {
        let points = &self.setpoints;

        for (i, a) in points.iter().enumerate() {
            if a.temp_c >= temp_c {
                // Below the first setpoint, or an exact hit reached by the scan
                return a.duty as i32;
            }

            let Some(b) = points.get(i + 1) else {
                return a.duty as i32;
            };

            if b.temp_c > temp_c {
                let slope = (b.duty as f64 - a.duty as f64) / (b.temp_c - a.temp_c);
                return a.duty as i32 + (slope * (temp_c - a.temp_c)).floor() as i32;
            }
        }

        SENTINEL_DUTY
    }
}
