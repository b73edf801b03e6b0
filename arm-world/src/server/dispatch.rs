//! Request dispatch table
//!
//! Requests are routed on `(KEY, TYPE)`. Read handlers serialize a slice of
//! the simulator state; write handlers parse the payload, mutate the
//! simulator and answer `{"result":"success"|"failed"}`. Replies echo the
//! request type.

use crate::protocol::{
    ARM_ANGLE, AnglesPayload, CUBE_POS, CubePosReply, DENY, EMPTY_PAYLOAD, GRIPPER_ON,
    GripperRequest, LOGIN, LoginReply, LoginRequest, Message, READY, RequestKey, ResultReply,
};
use crate::simulator::SharedSimulator;
use serde::Serialize;
use std::collections::HashMap;

/// Handler returning the reply payload for a request payload
type Handler = fn(&mut Dispatcher, &str) -> String;

/// Routes decoded requests to handlers
pub struct Dispatcher {
    simulator: SharedSimulator,
    routes: HashMap<(RequestKey, &'static str), Handler>,
    last_device: Option<String>,
}

impl Dispatcher {
    /// Dispatcher with the standard route table
    pub fn new(simulator: SharedSimulator) -> Self {
        let mut routes: HashMap<(RequestKey, &'static str), Handler> = HashMap::new();
        routes.insert((RequestKey::Get, LOGIN), handle_login);
        routes.insert((RequestKey::Get, CUBE_POS), handle_get_cube);
        routes.insert((RequestKey::Get, ARM_ANGLE), handle_get_angles);
        routes.insert((RequestKey::Post, ARM_ANGLE), handle_post_angles);
        routes.insert((RequestKey::Post, GRIPPER_ON), handle_post_gripper);
        Self {
            simulator,
            routes,
            last_device: None,
        }
    }

    /// Device id of the most recent login
    pub fn last_device(&self) -> Option<&str> {
        self.last_device.as_deref()
    }

    /// Handle one raw datagram and return the encoded reply
    ///
    /// Never fails: malformed or unmatched requests get `REP;deny;{}`.
    pub fn handle(&mut self, raw: &[u8]) -> String {
        let request = match Message::decode(raw) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!(
                    "Malformed request {:?}: {}",
                    String::from_utf8_lossy(raw),
                    e
                );
                return deny();
            }
        };
        log::debug!("Request: {}", request.encode());

        let Some(&handler) = self.routes.get(&(request.key, request.kind.as_str())) else {
            log::debug!("No handler for {};{}", request.key, request.kind);
            return deny();
        };
        let payload = handler(self, &request.payload);
        Message::raw(RequestKey::Rep, request.kind, payload).encode()
    }
}

fn deny() -> String {
    Message::raw(RequestKey::Rep, DENY, EMPTY_PAYLOAD).encode()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize reply: {}", e);
        EMPTY_PAYLOAD.to_string()
    })
}

fn result_json(ok: bool) -> String {
    to_json(&if ok {
        ResultReply::success()
    } else {
        ResultReply::failed()
    })
}

fn handle_login(dispatcher: &mut Dispatcher, payload: &str) -> String {
    match serde_json::from_str::<LoginRequest>(payload) {
        Ok(req) => {
            log::info!("Device {} logged in", req.plc_id);
            dispatcher.last_device = Some(req.plc_id);
        }
        Err(e) => log::warn!("Login without device id: {}", e),
    }
    to_json(&LoginReply {
        state: READY.to_string(),
    })
}

fn handle_get_cube(dispatcher: &mut Dispatcher, _payload: &str) -> String {
    let pos = dispatcher.simulator.lock().world().cube().position();
    to_json(&CubePosReply { pos: pos.to_array() })
}

fn handle_get_angles(dispatcher: &mut Dispatcher, _payload: &str) -> String {
    let angles = dispatcher.simulator.lock().world().angles().to_array();
    to_json(&AnglesPayload {
        angles: angles.to_vec(),
    })
}

fn handle_post_angles(dispatcher: &mut Dispatcher, payload: &str) -> String {
    let req = match serde_json::from_str::<AnglesPayload>(payload) {
        Ok(req) => req,
        Err(e) => {
            log::warn!("Bad armAngle payload: {}", e);
            return result_json(false);
        }
    };
    match dispatcher.simulator.lock().request_raw_angles(&req.angles) {
        Ok(()) => {
            log::info!("Accepted joint targets {:?}", req.angles);
            result_json(true)
        }
        Err(e) => {
            log::warn!("Rejected joint targets {:?}: {}", req.angles, e);
            result_json(false)
        }
    }
}

fn handle_post_gripper(dispatcher: &mut Dispatcher, payload: &str) -> String {
    let req = match serde_json::from_str::<GripperRequest>(payload) {
        Ok(req) => req,
        Err(e) => {
            log::warn!("Bad gripperOn payload: {}", e);
            return result_json(false);
        }
    };
    match dispatcher.simulator.lock().set_gripper(req.gripper) {
        Ok(()) => {
            log::info!("Gripper {}", if req.gripper { "holding cube" } else { "released" });
            result_json(true)
        }
        Err(e) => {
            log::info!("Grab refused: {}", e);
            result_json(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::simulator::Simulator;
    use arm_kinematics::{ArmConfig, ControlMode, JointAngles};

    fn dispatcher(mode: ControlMode) -> Dispatcher {
        let sim = SimulationConfig {
            mode,
            ..SimulationConfig::default()
        };
        Dispatcher::new(Simulator::new(ArmConfig::default(), &sim).into_shared())
    }

    #[test]
    fn test_login_replies_ready_and_records_device() {
        let mut d = dispatcher(ControlMode::Automatic);
        let reply = d.handle(br#"GET;login;{"plcID":"PLC-01"}"#);
        assert_eq!(reply, r#"REP;login;{"state":"ready"}"#);
        assert_eq!(d.last_device(), Some("PLC-01"));
    }

    #[test]
    fn test_get_cube_position() {
        let mut d = dispatcher(ControlMode::Automatic);
        let reply = Message::decode_str(&d.handle(b"GET;cubePos;{}")).unwrap();
        assert_eq!(reply.key, RequestKey::Rep);
        assert_eq!(reply.kind, CUBE_POS);
        let body: CubePosReply = reply.payload_as().unwrap();
        assert_eq!(body.pos, [2.0, 1.0, 0.3]);
    }

    #[test]
    fn test_get_angles() {
        let mut d = dispatcher(ControlMode::Automatic);
        let reply = Message::decode_str(&d.handle(b"GET;armAngle;{}")).unwrap();
        let body: AnglesPayload = reply.payload_as().unwrap();
        assert_eq!(body.angles, JointAngles::DEFAULT_POSE.to_vec());
    }

    #[test]
    fn test_post_angles_manual_mode_applies() {
        let mut d = dispatcher(ControlMode::Manual);
        let reply = d.handle(br#"POST;armAngle;{"angles":[0,0,0,0,0,10]}"#);
        assert_eq!(reply, r#"REP;armAngle;{"result":"success"}"#);
        assert_eq!(
            d.simulator.lock().world().angles().to_array(),
            [0.0, 0.0, 0.0, 0.0, 0.0, 10.0]
        );
    }

    #[test]
    fn test_post_angles_wrong_count_fails() {
        let mut d = dispatcher(ControlMode::Manual);
        let reply = d.handle(br#"POST;armAngle;{"angles":[0,0,0]}"#);
        assert_eq!(reply, r#"REP;armAngle;{"result":"failed"}"#);
        let reply = d.handle(b"POST;armAngle;not json");
        assert_eq!(reply, r#"REP;armAngle;{"result":"failed"}"#);
    }

    #[test]
    fn test_post_gripper_refused_when_far() {
        let mut d = dispatcher(ControlMode::Automatic);
        let reply = d.handle(br#"POST;gripperOn;{"gripper":true}"#);
        assert_eq!(reply, r#"REP;gripperOn;{"result":"failed"}"#);
        let reply = d.handle(br#"POST;gripperOn;{"gripper":false}"#);
        assert_eq!(reply, r#"REP;gripperOn;{"result":"success"}"#);
    }

    #[test]
    fn test_unmatched_and_malformed_are_denied() {
        let mut d = dispatcher(ControlMode::Automatic);
        assert_eq!(d.handle(b"POST;cubePos;{}"), "REP;deny;{}");
        assert_eq!(d.handle(b"GET;weather;{}"), "REP;deny;{}");
        assert_eq!(d.handle(b"garbage"), "REP;deny;{}");
        assert_eq!(d.handle(b"FOO;login;{}"), "REP;deny;{}");
    }
}
