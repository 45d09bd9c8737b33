// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Hysteresis-gated fan curve control for amdgpu hwmon devices.

pub mod config;
pub mod controller;
pub mod curve;
pub mod error;
pub mod hwmon;
