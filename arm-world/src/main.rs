//! arm-world - Robot arm world simulator daemon
//!
//! Serves the simulated arm over UDP (default port 3001) and ticks its
//! physics on a background thread until Ctrl-C.

use arm_world::error::{Error, Result};
use arm_world::{Simulator, WorldConfig, WorldServer, spawn_physics};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const DEFAULT_CONFIG: &str = "arm-world.toml";

/// Parse config path from command line arguments.
///
/// Supports:
/// - `arm-world <path>` (positional)
/// - `arm-world --config <path>` (flag-based)
/// - `arm-world -c <path>` (short flag)
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

fn load_config() -> Result<WorldConfig> {
    match parse_config_path() {
        Some(path) => {
            log::info!("Using config: {}", path);
            WorldConfig::load(&path)
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            log::info!("Using config: {}", DEFAULT_CONFIG);
            WorldConfig::load(DEFAULT_CONFIG)
        }
        None => {
            log::info!("No config file, using defaults");
            Ok(WorldConfig::default())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("arm-world v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    log::info!(
        "Arm links {:?}, cube at {:?}, mode {:?}",
        config.arm.links(),
        config.arm.cube_start,
        config.simulation.mode
    );

    let simulator = Simulator::new(config.arm.clone(), &config.simulation).into_shared();

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let physics = spawn_physics(
        Arc::clone(&simulator),
        Arc::clone(&running),
        Duration::from_millis(config.simulation.tick_ms),
    )?;

    let mut server = WorldServer::bind(
        config.network.bind_address.as_str(),
        simulator,
        Arc::clone(&running),
        Duration::from_millis(config.network.read_timeout_ms),
    )?;
    log::info!("arm-world running. Press Ctrl-C to stop.");
    server.run()?;

    running.store(false, Ordering::Relaxed);
    if physics.join().is_err() {
        log::error!("Physics thread panicked");
    }

    log::info!("arm-world stopped");
    Ok(())
}
