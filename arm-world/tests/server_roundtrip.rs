//! Real UDP round trips against a running WorldServer

use approx::assert_relative_eq;
use arm_kinematics::{
    ArmConfig, ControlMode, IkStrategy, NonlinearConfig, NonlinearSolver, base_yaw,
};
use arm_world::config::SimulationConfig;
use arm_world::protocol::{AnglesPayload, CubePosReply, Message, RequestKey};
use arm_world::{SharedSimulator, Simulator, WorldServer};
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

struct Harness {
    addr: SocketAddr,
    client: UdpSocket,
    simulator: SharedSimulator,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Harness {
    fn start(mode: ControlMode) -> Self {
        let sim = SimulationConfig {
            mode,
            ..SimulationConfig::default()
        };
        let simulator = Simulator::new(ArmConfig::default(), &sim).into_shared();
        let running = Arc::new(AtomicBool::new(true));
        let server = WorldServer::bind(
            "127.0.0.1:0",
            Arc::clone(&simulator),
            Arc::clone(&running),
            Duration::from_millis(20),
        )
        .unwrap();
        let addr = server.local_addr().unwrap();
        let handle = server.spawn().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();

        Self {
            addr,
            client,
            simulator,
            running,
            handle: Some(handle),
        }
    }

    fn request(&self, line: &str) -> String {
        self.client.send_to(line.as_bytes(), self.addr).unwrap();
        let mut buf = [0u8; 4096];
        let (len, _) = self.client.recv_from(&mut buf).unwrap();
        String::from_utf8(buf[..len].to_vec()).unwrap()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[test]
fn test_login_and_reads() {
    let h = Harness::start(ControlMode::Automatic);

    assert_eq!(
        h.request(r#"GET;login;{"plcID":"PLC-TEST"}"#),
        r#"REP;login;{"state":"ready"}"#
    );

    let reply = Message::decode_str(&h.request("GET;cubePos;{}")).unwrap();
    assert_eq!(reply.key, RequestKey::Rep);
    let cube: CubePosReply = reply.payload_as().unwrap();
    assert_eq!(cube.pos, [2.0, 1.0, 0.3]);

    let reply = Message::decode_str(&h.request("GET;armAngle;{}")).unwrap();
    let angles: AnglesPayload = reply.payload_as().unwrap();
    assert_eq!(angles.angles.len(), 6);
}

#[test]
fn test_malformed_request_gets_deny_and_server_survives() {
    let h = Harness::start(ControlMode::Automatic);

    assert_eq!(h.request("not a message"), "REP;deny;{}");
    assert_eq!(h.request("GET;unknown;{}"), "REP;deny;{}");
    assert_eq!(
        h.request(r#"GET;login;{"plcID":"again"}"#),
        r#"REP;login;{"state":"ready"}"#
    );
}

#[test]
fn test_move_and_grab_over_the_wire() {
    let h = Harness::start(ControlMode::Manual);

    let (x, y) = (2.0, 1.0);
    let solver = NonlinearSolver::new(&ArmConfig::default(), NonlinearConfig::default());
    let solution = solver.solve(x, y).unwrap();
    let mut angles = [0.0; 6];
    for (joint, value) in solution.to_joint_targets(base_yaw(x, y)) {
        angles[joint.index()] = value;
    }
    angles[5] = 10.0;

    let post = Message::new(
        RequestKey::Post,
        "armAngle",
        &AnglesPayload {
            angles: angles.to_vec(),
        },
    )
    .unwrap();
    assert_eq!(
        h.request(&post.encode()),
        r#"REP;armAngle;{"result":"success"}"#
    );

    assert_eq!(
        h.request(r#"POST;gripperOn;{"gripper":true}"#),
        r#"REP;gripperOn;{"result":"success"}"#
    );

    let sim = h.simulator.lock();
    assert!(sim.world().cube().is_held());
    let tip = sim.world().gripper_position();
    let cube = sim.world().cube().position();
    assert_relative_eq!(cube.x, tip.x, epsilon = 1e-9);
    assert_relative_eq!(cube.y, tip.y, epsilon = 1e-9);
    assert_relative_eq!(cube.z, tip.z, epsilon = 1e-9);
    assert_relative_eq!(tip.x, 2.0, epsilon = 1e-3);
    assert_relative_eq!(tip.y, 1.0, epsilon = 1e-3);
}
