// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! amdgpu-tweaks: system service that drives an amdgpu fan from a
//! temperature curve, writing PWM only when the temperature moves past the
//! configured hysteresis.

use amdgpu_tweaks::config::{self, Config};
use amdgpu_tweaks::controller::{Controller, MODE_AUTOMATIC, ModeSink};
use amdgpu_tweaks::hwmon::{PwmEnable, PwmOutput, TempInput};
use anyhow::Context;
use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::process;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "amdgpu-tweaks", about = "amdgpu fan curve daemon")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Validate the configuration, print the curve and exit.
    #[arg(long)]
    check: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log::error!("{e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config_path = config::resolve_config_path(Some(&cli.config));
    let cfg = config::load_config(&config_path)?;

    log_config(&cfg);
    if cli.check {
        log::info!("Configuration OK");
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .with_context(|| format!("failed to register handler for signal {signal}"))?;
    }

    let mut mode = PwmEnable::new(&cfg.fan_mode_file);
    let mut controller = Controller::start(
        cfg.curve(),
        cfg.policy(),
        TempInput::new(&cfg.temp_file),
        PwmOutput::new(&cfg.pwm_file),
        &mut mode,
    )?;

    controller.run(&shutdown)?;
    log::info!("Received shutdown signal");

    if cfg.restore_on_exit {
        mode.write_mode(MODE_AUTOMATIC)
            .context("failed to restore automatic fan control")?;
        log::info!("Restored fan to automatic control");
    }

    log::info!("Daemon shutting down");
    Ok(())
}

fn log_config(cfg: &Config) {
    log::info!(
        "Sensor {}, PWM {}, mode {}",
        cfg.temp_file.display(),
        cfg.pwm_file.display(),
        cfg.fan_mode_file.display()
    );
    log::info!(
        "Polling every {} ms, hysteresis {:.1}°C",
        cfg.poll_frequency_ms,
        cfg.hysteresis
    );
    for point in cfg.curve().setpoints() {
        log::info!("  {:>6.1}°C -> PWM {}", point.temp_c, point.duty);
    }
}
