//! arm-plc - PLC bridge and HMI for the robot arm world simulator
//!
//! Connects to `arm-world`, mirrors its state into the variable store and
//! forwards HMI targets back. Optionally runs an auto-grab or a scenario file
//! once the bridge is in sync.

use arm_plc::{
    BridgeConnector, HmiController, MemoryStore, PlcConfig, PlcError, Result, RoleWriter,
    SyncLoop, SyncStatus, UdpTransport, VariableStore, WriterRole, load_scenario,
    register_variables,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Default config file looked up in the working directory
const DEFAULT_CONFIG: &str = "arm-plc.toml";

/// Joint error (degrees) at which the arm counts as arrived
const ARRIVAL_TOLERANCE: f64 = 1.0;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (TOML)
    #[arg(value_name = "CONFIG")]
    config_path: Option<PathBuf>,

    /// Config file (TOML), same as the positional argument
    #[arg(short, long, value_name = "CONFIG", conflicts_with = "config_path")]
    config: Option<PathBuf>,

    /// Override the simulator IP address
    #[arg(long)]
    world_ip: Option<String>,

    /// Aim at the cube, wait for the arm, then grab it
    #[arg(long)]
    auto_grab: bool,

    /// Run a scenario file (JSON array of actions)
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Seconds to wait for the bridge and the arm before giving up
    #[arg(long, default_value_t = 30)]
    wait_secs: u64,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "arm_plc=info"
                    .parse()
                    .map_err(|e| PlcError::Config(format!("Bad log directive: {}", e)))?,
            ),
        )
        .init();

    let args = Args::parse();

    let mut config = match args.config_path.as_ref().or(args.config.as_ref()) {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            PlcConfig::load(path)?
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG);
            PlcConfig::load(Path::new(DEFAULT_CONFIG))?
        }
        None => {
            info!("Using default configuration");
            PlcConfig::default()
        }
    };
    if let Some(ip) = args.world_ip.clone() {
        info!("Using world simulator IP: {}", ip);
        config.world.ip = ip;
    }

    info!("arm-plc v{}", env!("CARGO_PKG_VERSION"));
    info!("Connecting to world simulator at {}", config.world_address());

    // Variable store and role handles
    let store: Arc<dyn VariableStore> = Arc::new(MemoryStore::new());
    register_variables(store.as_ref(), &config.store.namespace, &config.store.object)?;
    let sensors = RoleWriter::new(
        Arc::clone(&store),
        WriterRole::Sensor,
        &config.store.namespace,
        &config.store.object,
    );
    let targets = RoleWriter::new(
        store,
        WriterRole::Target,
        &config.store.namespace,
        &config.store.object,
    );

    // Bridge
    let transport = UdpTransport::connect(
        config.world_address(),
        Duration::from_millis(config.world.timeout_ms),
    )?;
    let mut connector = BridgeConnector::new(
        transport,
        config.device.plc_id.clone(),
        config.sync.reconnect_count,
    );
    if !connector.connect() {
        warn!("World simulator not ready, will keep retrying");
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })
        .map_err(|e| PlcError::Config(format!("Failed to set signal handler: {}", e)))?;
    }

    let sync = SyncLoop::new(connector, sensors)?;
    let status = sync.status();
    let sync_handle = sync.spawn(
        Arc::clone(&running),
        Duration::from_millis(config.sync.interval_ms),
        Duration::from_millis(config.sync.reconnect_tick_ms),
    )?;

    let hmi = HmiController::from_config(targets, &config)?;
    let wait = Duration::from_secs(args.wait_secs);

    if args.auto_grab || args.scenario.is_some() {
        if wait_for_bootstrap(&status, &running, wait) {
            if let Err(e) = run_actions(&hmi, &args, &running, wait) {
                error!("HMI task failed: {}", e);
            }
        } else {
            warn!("Bridge did not come in sync within {} s", args.wait_secs);
        }
    }

    // Keep bridging until interrupted
    while running.load(Ordering::Relaxed) && !sync_handle.is_finished() {
        std::thread::sleep(Duration::from_millis(500));
    }
    running.store(false, Ordering::SeqCst);

    match sync_handle.join() {
        Ok(sync) => info!(
            "Sync loop stopped after {} ticks ({} login attempts, {} links lost)",
            status.ticks(),
            sync.connector().login_attempts(),
            sync.connector().links_lost()
        ),
        Err(e) => error!("Sync thread panicked: {:?}", e),
    }

    info!("arm-plc finished");
    Ok(())
}

/// Block until the sync loop has seeded the targets
fn wait_for_bootstrap(status: &SyncStatus, running: &AtomicBool, timeout: Duration) -> bool {
    let start = Instant::now();
    while running.load(Ordering::Relaxed) && start.elapsed() < timeout {
        if status.is_bootstrapped() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    false
}

/// Block until the measured pose matches the targets
fn wait_for_arrival(hmi: &HmiController, running: &AtomicBool, timeout: Duration) -> Result<bool> {
    let start = Instant::now();
    while running.load(Ordering::Relaxed) && start.elapsed() < timeout {
        if hmi.snapshot()?.at_target(ARRIVAL_TOLERANCE) {
            return Ok(true);
        }
        std::thread::sleep(Duration::from_millis(200));
    }
    Ok(false)
}

fn run_actions(
    hmi: &HmiController,
    args: &Args,
    running: &AtomicBool,
    wait: Duration,
) -> Result<()> {
    if let Some(path) = &args.scenario {
        let actions = load_scenario(path)?;
        info!("Running scenario {:?} ({} actions)", path, actions.len());
        hmi.run_scenario(&actions)?;
    }

    if args.auto_grab {
        hmi.auto_grab()?;
        if wait_for_arrival(hmi, running, wait)? {
            hmi.set_gripper(true)?;
            info!("Arm over the cube, grab requested");
        } else {
            warn!("Arm did not reach the grasp pose, grab skipped");
        }
    }
    Ok(())
}
