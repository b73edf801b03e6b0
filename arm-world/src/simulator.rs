//! Simulator: world model plus requested targets and motion
//!
//! The server thread stores requests, the physics thread advances the arm
//! toward them. Both hold the same `Arc<Mutex<Simulator>>`; the lock is
//! taken for one request or one tick at a time.
//!
//! Field writers:
//! - `targets`: server thread (`request_angles`, `reset`)
//! - `world` joint angles: physics thread in automatic mode, server thread in
//!   manual mode
//! - `world` cube: physics thread (`tick`), server thread (`grab`, `release`)

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use arm_kinematics::{
    ArmConfig, ControlMode, GrabError, JointAngles, MotionProfile, WorldModel,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Simulator shared between the server and physics threads
pub type SharedSimulator = Arc<Mutex<Simulator>>;

/// World model driven by requested joint targets
#[derive(Debug, Clone)]
pub struct Simulator {
    world: WorldModel,
    targets: JointAngles,
    profile: MotionProfile,
    mode: ControlMode,
    ticks: u64,
}

impl Simulator {
    /// Simulator at rest in the default pose
    pub fn new(arm: ArmConfig, sim: &SimulationConfig) -> Self {
        let world = WorldModel::new(arm);
        let targets = *world.angles();
        Self {
            world,
            targets,
            profile: MotionProfile::new(sim.motor_deg_speed),
            mode: sim.mode,
            ticks: 0,
        }
    }

    /// Wrap for sharing across threads
    pub fn into_shared(self) -> SharedSimulator {
        Arc::new(Mutex::new(self))
    }

    /// Authoritative world state
    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    /// Last requested joint angles
    pub fn targets(&self) -> &JointAngles {
        &self.targets
    }

    /// Current control mode
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Switch control mode; manual mode snaps the arm to the targets
    pub fn set_mode(&mut self, mode: ControlMode) {
        self.mode = mode;
        if mode == ControlMode::Manual {
            self.world.set_angles(self.targets);
        }
    }

    /// Ticks advanced so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Request new joint angles
    pub fn request_angles(&mut self, angles: JointAngles) {
        self.targets = angles;
        if self.mode == ControlMode::Manual {
            self.world.set_angles(angles);
        }
    }

    /// Request angles from raw wire values
    pub fn request_raw_angles(&mut self, values: &[f64]) -> Result<()> {
        let angles = JointAngles::try_from_slice(values)?;
        self.request_angles(angles);
        Ok(())
    }

    /// Grab (`true`) or release (`false`) the cube
    pub fn set_gripper(&mut self, closed: bool) -> std::result::Result<(), GrabError> {
        if closed {
            self.world.grab()
        } else {
            self.world.release();
            Ok(())
        }
    }

    /// Default pose, cube back at its start, targets cleared
    pub fn reset(&mut self) {
        self.world.reset();
        self.targets = *self.world.angles();
    }

    /// True when every joint has reached its target
    pub fn at_target(&self) -> bool {
        *self.world.angles() == self.targets
    }

    /// Advance motion then cube physics by one tick
    pub fn tick(&mut self) {
        if self.mode == ControlMode::Automatic {
            let targets = self.targets;
            self.profile.advance(self.world.angles_mut(), &targets);
        }
        self.world.tick();
        self.ticks += 1;
    }
}

/// Spawn the physics thread ticking `simulator` every `period`
pub fn spawn_physics(
    simulator: SharedSimulator,
    running: Arc<AtomicBool>,
    period: Duration,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("world-physics".to_string())
        .spawn(move || physics_loop(simulator, running, period))
        .map_err(|e| Error::Other(format!("Failed to spawn physics thread: {}", e)))
}

fn physics_loop(simulator: SharedSimulator, running: Arc<AtomicBool>, period: Duration) {
    log::info!("Physics loop started ({} ms tick)", period.as_millis());

    while running.load(Ordering::Relaxed) {
        let loop_start = Instant::now();

        simulator.lock().tick();

        let elapsed = loop_start.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
    }

    log::info!("Physics loop terminated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use arm_kinematics::Joint;

    fn simulator(mode: ControlMode) -> Simulator {
        let sim = SimulationConfig {
            tick_ms: 10,
            motor_deg_speed: 5.0,
            mode,
        };
        Simulator::new(ArmConfig::default(), &sim)
    }

    #[test]
    fn test_starts_at_rest() {
        let sim = simulator(ControlMode::Automatic);
        assert!(sim.at_target());
        assert_eq!(sim.world().angles().to_array(), JointAngles::DEFAULT_POSE);
    }

    #[test]
    fn test_automatic_mode_is_rate_limited() {
        let mut sim = simulator(ControlMode::Automatic);
        sim.request_angles(JointAngles::new([60.0, -15.0, 30.0, 0.0, 0.0, 50.0]));

        sim.tick();
        assert_eq!(sim.world().angles()[Joint::Base], 50.0);
        sim.tick();
        sim.tick();
        assert_eq!(sim.world().angles()[Joint::Base], 60.0);
        assert!(sim.at_target());
    }

    #[test]
    fn test_manual_mode_jumps() {
        let mut sim = simulator(ControlMode::Manual);
        let target = JointAngles::new([-90.0, 10.0, 20.0, 30.0, 40.0, 0.0]);
        sim.request_angles(target);
        assert_eq!(*sim.world().angles(), target);
    }

    #[test]
    fn test_raw_angles_validated() {
        let mut sim = simulator(ControlMode::Automatic);
        assert!(sim.request_raw_angles(&[1.0, 2.0]).is_err());
        assert!(sim.at_target());
        assert!(sim.request_raw_angles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).is_ok());
        assert!(!sim.at_target());
    }

    #[test]
    fn test_grab_refused_far_from_cube() {
        let mut sim = simulator(ControlMode::Manual);
        sim.request_angles(JointAngles::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        assert!(matches!(
            sim.set_gripper(true),
            Err(GrabError::TooFar { .. })
        ));
        assert!(sim.set_gripper(false).is_ok());
    }

    #[test]
    fn test_reset_clears_targets() {
        let mut sim = simulator(ControlMode::Automatic);
        sim.request_angles(JointAngles::zero());
        sim.tick();
        sim.reset();
        assert!(sim.at_target());
        assert_eq!(sim.targets().to_array(), JointAngles::DEFAULT_POSE);
    }

    #[test]
    fn test_physics_thread_advances_and_stops() {
        let shared = simulator(ControlMode::Automatic).into_shared();
        let running = Arc::new(AtomicBool::new(true));
        let handle = spawn_physics(
            Arc::clone(&shared),
            Arc::clone(&running),
            Duration::from_millis(5),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(60));
        running.store(false, Ordering::Relaxed);
        handle.join().unwrap();

        let sim = shared.lock();
        assert!(sim.ticks() > 0);
        assert_eq!(sim.world().cube().position().z, 0.15);
    }
}
