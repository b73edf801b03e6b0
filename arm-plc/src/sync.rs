//! Sync loop: mirrors simulator state into the store and forwards targets back
//!
//! Each tick pulls the cube position and joint angles into the sensor
//! variables, then compares the target variables against what was last
//! forwarded. A changed channel becomes pending until a post for it is
//! delivered. Joint targets go out as one batched `armAngle` post.

use crate::connector::BridgeConnector;
use crate::error::{PlcError, Result};
use crate::store::{RoleWriter, VariableName, WriterRole};
use crate::transport::Transport;
use arm_kinematics::JOINT_COUNT;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest sleep between shutdown checks
const POLL_SLICE: Duration = Duration::from_millis(50);

/// Outcome of one sync tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Link was online when the tick started
    pub online: bool,
    /// Fresh sensor values were published
    pub published: bool,
    /// An `armAngle` post was delivered
    pub arm_posted: bool,
    /// A `gripperOn` post was delivered
    pub gripper_posted: bool,
}

/// Sync loop progress readable from other threads
#[derive(Debug, Default)]
pub struct SyncStatus {
    online: AtomicBool,
    bootstrapped: AtomicBool,
    ticks: AtomicU64,
}

impl SyncStatus {
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::Acquire)
    }

    /// Completed ticks
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}

/// Next deadline after `next`, never earlier than `now`
///
/// A slow exchange skips missed slots instead of running them back to back.
fn reschedule(next: Instant, interval: Duration, now: Instant) -> Instant {
    (next + interval).max(now)
}

/// Round to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Bridge between the world simulator and the variable store
pub struct SyncLoop<T: Transport> {
    connector: BridgeConnector<T>,
    store: RoleWriter,
    bootstrapped: bool,
    cube: [f64; 3],
    angles: [f64; JOINT_COUNT],
    /// Integer-rounded joint targets last forwarded
    last_targets: [i64; JOINT_COUNT],
    last_gripper: bool,
    arm_pending: bool,
    gripper_pending: bool,
    status: Arc<SyncStatus>,
}

impl<T: Transport> SyncLoop<T> {
    /// `store` must be a sensor-role handle
    pub fn new(connector: BridgeConnector<T>, store: RoleWriter) -> Result<Self> {
        if store.role() != WriterRole::Sensor {
            return Err(PlcError::Config(
                "sync loop needs a sensor-role store handle".to_string(),
            ));
        }
        Ok(Self {
            connector,
            store,
            bootstrapped: false,
            cube: [0.0; 3],
            angles: [0.0; JOINT_COUNT],
            last_targets: [0; JOINT_COUNT],
            last_gripper: false,
            arm_pending: false,
            gripper_pending: false,
            status: Arc::new(SyncStatus::default()),
        })
    }

    pub fn connector(&self) -> &BridgeConnector<T> {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut BridgeConnector<T> {
        &mut self.connector
    }

    /// True once targets were seeded from a successful pull
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Shared progress handle
    pub fn status(&self) -> Arc<SyncStatus> {
        Arc::clone(&self.status)
    }

    /// Channels waiting for delivery: (arm, gripper)
    pub fn pending(&self) -> (bool, bool) {
        (self.arm_pending, self.gripper_pending)
    }

    /// Run one sync cycle
    pub fn tick(&mut self) -> Result<TickReport> {
        let report = self.cycle();
        self.status
            .online
            .store(self.connector.is_online(), Ordering::Release);
        self.status
            .bootstrapped
            .store(self.bootstrapped, Ordering::Release);
        self.status.ticks.fetch_add(1, Ordering::AcqRel);
        report
    }

    fn cycle(&mut self) -> Result<TickReport> {
        let mut report = TickReport {
            online: self.connector.is_online(),
            ..TickReport::default()
        };

        report.published = self.pull()?;
        if report.published && !self.bootstrapped {
            self.bootstrap()?;
        }
        if !self.bootstrapped {
            return Ok(report);
        }

        let targets = self.collect_dirty()?;

        if self.arm_pending
            && let Some(accepted) = self.connector.set_arm_angles(&targets)
        {
            self.arm_pending = false;
            report.arm_posted = true;
            tracing::debug!("Forwarded joint targets {:?} (accepted: {})", targets, accepted);
        }

        if self.gripper_pending
            && let Some(accepted) = self.connector.set_gripper(self.last_gripper)
        {
            self.gripper_pending = false;
            report.gripper_posted = true;
            tracing::info!(
                "Forwarded gripper {} (accepted: {})",
                if self.last_gripper { "grab" } else { "release" },
                accepted
            );
        }

        Ok(report)
    }

    /// Publish sensor values; true when they came fresh from the simulator
    fn pull(&mut self) -> Result<bool> {
        let fresh = if self.connector.is_online() {
            match (self.connector.cube_position(), self.connector.arm_angles()) {
                (Some(cube), Some(angles)) => {
                    self.cube = cube.to_array().map(round1);
                    self.angles = angles.map(round1);
                    true
                }
                _ => false,
            }
        } else {
            false
        };

        if !fresh {
            tracing::warn!(
                "World simulator {}; publishing last known values",
                self.connector.state()
            );
        }

        for (name, value) in VariableName::CUBE_POS.iter().zip(self.cube) {
            self.store.write(*name, value)?;
        }
        for (name, value) in VariableName::ARM_ANGLES.iter().zip(self.angles) {
            self.store.write(*name, value)?;
        }
        Ok(fresh)
    }

    /// Start targets at the measured pose so nothing moves on connect
    fn bootstrap(&mut self) -> Result<()> {
        for (i, name) in VariableName::MOTOR_CTRL.iter().enumerate() {
            self.store.seed_target(*name, self.angles[i])?;
            self.last_targets[i] = self.angles[i].round() as i64;
        }
        self.last_gripper = self.store.read_bool(VariableName::GripperCtrl)?;
        self.bootstrapped = true;
        tracing::info!("Targets seeded from measured pose {:?}", self.angles);
        Ok(())
    }

    /// Read targets, flag changed channels, return the joint targets
    fn collect_dirty(&mut self) -> Result<[f64; JOINT_COUNT]> {
        let mut targets = [0.0; JOINT_COUNT];
        for (i, name) in VariableName::MOTOR_CTRL.iter().enumerate() {
            targets[i] = self.store.read_f64(*name)?;
            let rounded = targets[i].round() as i64;
            if rounded != self.last_targets[i] {
                self.last_targets[i] = rounded;
                self.arm_pending = true;
            }
        }

        let gripper = self.store.read_bool(VariableName::GripperCtrl)?;
        if gripper != self.last_gripper {
            self.last_gripper = gripper;
            self.gripper_pending = true;
        }
        Ok(targets)
    }

    /// Tick every `interval` and step the reconnect countdown every
    /// `reconnect_interval` until `running` is cleared
    pub fn run(&mut self, running: &AtomicBool, interval: Duration, reconnect_interval: Duration) {
        tracing::info!(
            "Sync loop started ({} ms tick, {} ms reconnect tick)",
            interval.as_millis(),
            reconnect_interval.as_millis()
        );

        let mut next_tick = Instant::now();
        let mut next_reconnect = Instant::now() + reconnect_interval;

        while running.load(Ordering::Relaxed) {
            let now = Instant::now();

            if now >= next_reconnect {
                self.connector.reconnect();
                next_reconnect =
                    reschedule(next_reconnect, reconnect_interval, Instant::now());
            }

            if now >= next_tick {
                match self.tick() {
                    Ok(report) => tracing::trace!("Sync tick: {:?}", report),
                    Err(e) => tracing::error!("Sync tick failed: {}", e),
                }
                next_tick = reschedule(next_tick, interval, Instant::now());
            }

            let wake = next_tick.min(next_reconnect);
            let now = Instant::now();
            if wake > now {
                thread::sleep((wake - now).min(POLL_SLICE));
            }
        }

        tracing::info!("Sync loop terminated");
    }
}

impl<T: Transport + 'static> SyncLoop<T> {
    /// Run the loop on its own thread
    pub fn spawn(
        mut self,
        running: Arc<AtomicBool>,
        interval: Duration,
        reconnect_interval: Duration,
    ) -> Result<JoinHandle<Self>> {
        thread::Builder::new()
            .name("plc-sync".to_string())
            .spawn(move || {
                self.run(&running, interval, reconnect_interval);
                self
            })
            .map_err(PlcError::Connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, VariableStore, register_variables};
    use crate::transport::MockTransport;

    const NS: &str = "RobotArmPLC";
    const OBJ: &str = "RobotArmCtrl";

    /// Mock simulator that answers every request
    fn responder(mock: &MockTransport) {
        mock.set_responder(|request| {
            let reply = if request.starts_with("GET;login") {
                r#"REP;login;{"state":"ready"}"#
            } else if request.starts_with("GET;cubePos") {
                r#"REP;cubePos;{"pos":[2.04,1.0,0.26]}"#
            } else if request.starts_with("GET;armAngle") {
                r#"REP;armAngle;{"angles":[45.0,-15.0,30.04,0.0,0.0,50.0]}"#
            } else if request.starts_with("POST;armAngle") {
                r#"REP;armAngle;{"result":"success"}"#
            } else if request.starts_with("POST;gripperOn") {
                r#"REP;gripperOn;{"result":"success"}"#
            } else {
                "REP;deny;{}"
            };
            Some(reply.to_string())
        });
    }

    fn setup() -> (MockTransport, SyncLoop<MockTransport>, RoleWriter) {
        let store: Arc<dyn VariableStore> = Arc::new(MemoryStore::new());
        register_variables(store.as_ref(), NS, OBJ).unwrap();
        let mock = MockTransport::new();
        responder(&mock);
        let mut connector = BridgeConnector::new(mock.clone(), "PLC-01", 2);
        assert!(connector.connect());
        let sensors = RoleWriter::new(store.clone(), WriterRole::Sensor, NS, OBJ);
        let hmi = RoleWriter::new(store, WriterRole::Target, NS, OBJ);
        (mock, SyncLoop::new(connector, sensors).unwrap(), hmi)
    }

    #[test]
    fn test_rejects_target_role_handle() {
        let (mock, _, hmi) = setup();
        let connector = BridgeConnector::new(mock, "PLC-01", 2);
        assert!(SyncLoop::new(connector, hmi).is_err());
    }

    #[test]
    fn test_first_tick_publishes_and_bootstraps() {
        let (mock, mut sync, hmi) = setup();
        let report = sync.tick().unwrap();
        assert!(report.online && report.published);
        assert!(!report.arm_posted && !report.gripper_posted);
        assert!(sync.is_bootstrapped());
        let status = sync.status();
        assert!(status.is_online() && status.is_bootstrapped());
        assert_eq!(status.ticks(), 1);

        assert_eq!(hmi.read_f64(VariableName::CubePosX).unwrap(), 2.0);
        assert_eq!(hmi.read_f64(VariableName::CubePosZ).unwrap(), 0.3);
        assert_eq!(hmi.read_f64(VariableName::ArmAngle3).unwrap(), 30.0);
        assert_eq!(hmi.read_f64(VariableName::Motor1Ctrl).unwrap(), 45.0);
        assert_eq!(mock.count("POST;"), 0);
    }

    #[test]
    fn test_posts_only_when_target_changes() {
        let (mock, mut sync, hmi) = setup();
        sync.tick().unwrap();

        hmi.write(VariableName::Motor2Ctrl, 20.0).unwrap();
        assert!(sync.tick().unwrap().arm_posted);
        assert!(!sync.tick().unwrap().arm_posted);

        // Sub-integer change is not forwarded
        hmi.write(VariableName::Motor2Ctrl, 20.3).unwrap();
        assert!(!sync.tick().unwrap().arm_posted);
        assert_eq!(mock.count("POST;armAngle"), 1);

        // All six targets go out in one batch
        let posts: Vec<_> = mock
            .requests()
            .into_iter()
            .filter(|r| r.starts_with("POST;armAngle"))
            .collect();
        assert_eq!(posts[0], r#"POST;armAngle;{"angles":[45.0,20.0,30.0,0.0,0.0,50.0]}"#);
    }

    #[test]
    fn test_gripper_forwarded_on_toggle() {
        let (mock, mut sync, hmi) = setup();
        sync.tick().unwrap();

        hmi.write(VariableName::GripperCtrl, true).unwrap();
        let report = sync.tick().unwrap();
        assert!(report.gripper_posted && !report.arm_posted);
        assert!(!sync.tick().unwrap().gripper_posted);
        assert_eq!(mock.count(r#"POST;gripperOn;{"gripper":true}"#), 1);
    }

    #[test]
    fn test_undelivered_post_stays_pending() {
        let (mock, mut sync, hmi) = setup();
        sync.tick().unwrap();

        hmi.write(VariableName::Motor1Ctrl, 90.0).unwrap();
        mock.clear_responder();
        let report = sync.tick().unwrap();
        assert!(!report.published && !report.arm_posted);
        assert_eq!(sync.pending(), (true, false));

        // Link is down: the post is not even attempted
        mock.clear_requests();
        sync.tick().unwrap();
        assert!(mock.requests().is_empty());

        responder(&mock);
        sync.connector_mut().connect();
        let report = sync.tick().unwrap();
        assert!(report.arm_posted);
        assert_eq!(sync.pending(), (false, false));
    }

    #[test]
    fn test_no_forwarding_before_bootstrap() {
        let store: Arc<dyn VariableStore> = Arc::new(MemoryStore::new());
        register_variables(store.as_ref(), NS, OBJ).unwrap();
        let mock = MockTransport::new();
        let connector = BridgeConnector::new(mock.clone(), "PLC-01", 2);
        let hmi = RoleWriter::new(store.clone(), WriterRole::Target, NS, OBJ);
        let mut sync =
            SyncLoop::new(connector, RoleWriter::new(store, WriterRole::Sensor, NS, OBJ)).unwrap();

        hmi.write(VariableName::Motor1Ctrl, 10.0).unwrap();
        let report = sync.tick().unwrap();
        assert_eq!(report, TickReport::default());
        assert!(!sync.is_bootstrapped());
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_reschedule_after_slow_tick() {
        let start = Instant::now();
        let interval = Duration::from_millis(400);

        // On time: fixed cadence
        assert_eq!(reschedule(start, interval, start), start + interval);

        // A 1 s timeout overran two slots: next tick is now, not in the past
        let late = start + Duration::from_millis(1000);
        assert_eq!(reschedule(start, interval, late), late);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(1.04), 1.0);
        assert_eq!(round1(-15.06), -15.1);
    }
}
