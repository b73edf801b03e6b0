//! Client side of the world protocol: login, queries and reconnect policy

use crate::transport::Transport;
use arm_kinematics::{JOINT_COUNT, Point3};
use arm_world::protocol::{
    ARM_ANGLE, AnglesPayload, CUBE_POS, CubePosReply, EMPTY_PAYLOAD, GRIPPER_ON, GripperRequest,
    LOGIN, LoginReply, LoginRequest, Message, READY, RequestKey, ResultReply,
};
use serde::de::DeserializeOwned;
use std::fmt;

/// Link state as seen by the bridge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; queries are refused
    Disconnected,
    /// Login request in flight
    Authenticating,
    /// Logged in and answering
    Online,
    /// Offline and counting down to the next login attempt
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Online => "online",
            ConnectionState::Reconnecting => "reconnecting",
        };
        f.write_str(name)
    }
}

/// Request/reply client for the world simulator
pub struct BridgeConnector<T: Transport> {
    transport: T,
    plc_id: String,
    state: ConnectionState,
    reconnect_count: u32,
    countdown: u32,
    login_attempts: u64,
    links_lost: u64,
}

impl<T: Transport> BridgeConnector<T> {
    /// Create a disconnected connector
    ///
    /// `reconnect_count` is the number of reconnect ticks between login
    /// attempts while offline; zero is treated as one.
    pub fn new(transport: T, plc_id: impl Into<String>, reconnect_count: u32) -> Self {
        let reconnect_count = reconnect_count.max(1);
        Self {
            transport,
            plc_id: plc_id.into(),
            state: ConnectionState::Disconnected,
            reconnect_count,
            countdown: reconnect_count,
            login_attempts: 0,
            links_lost: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_online(&self) -> bool {
        self.state == ConnectionState::Online
    }

    /// Login attempts made so far
    pub fn login_attempts(&self) -> u64 {
        self.login_attempts
    }

    /// Times an online link went down
    pub fn links_lost(&self) -> u64 {
        self.links_lost
    }

    /// Run the login handshake; true when the simulator answered `ready`
    pub fn connect(&mut self) -> bool {
        self.state = ConnectionState::Authenticating;
        self.login_attempts += 1;

        let request = match Message::new(
            RequestKey::Get,
            LOGIN,
            &LoginRequest {
                plc_id: self.plc_id.clone(),
            },
        ) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("Failed to encode login request: {}", e);
                self.state = ConnectionState::Disconnected;
                return false;
            }
        };

        let ready = self
            .exchange(&request)
            .filter(|reply| reply.key == RequestKey::Rep && reply.kind == LOGIN)
            .and_then(|reply| reply.payload_as::<LoginReply>().ok())
            .is_some_and(|reply| reply.state == READY);

        if ready {
            tracing::info!("Logged in to world simulator as {}", self.plc_id);
            self.state = ConnectionState::Online;
            self.countdown = self.reconnect_count;
        } else {
            tracing::warn!("Login as {} was not accepted", self.plc_id);
            self.state = ConnectionState::Disconnected;
        }
        ready
    }

    /// Advance the reconnect countdown by one tick
    ///
    /// Attempts a login when the countdown reaches zero, then starts over.
    /// Returns true when that attempt brought the link online.
    pub fn reconnect(&mut self) -> bool {
        if self.is_online() {
            return false;
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            self.state = ConnectionState::Reconnecting;
            return false;
        }

        self.countdown = self.reconnect_count;
        tracing::info!("Attempting reconnect to world simulator");
        self.connect()
    }

    /// Send one request and wait for its reply
    ///
    /// Refused unless online. A missing or malformed reply drops the link.
    pub fn query(&mut self, key: RequestKey, kind: &str, payload: &str) -> Option<Message> {
        if !self.is_online() {
            tracing::debug!("Query {};{} refused while {}", key, kind, self.state);
            return None;
        }

        let request = Message::raw(key, kind, payload);
        let reply = self.exchange(&request)?;
        if reply.key != RequestKey::Rep || reply.kind != kind {
            tracing::warn!(
                "Reply {};{} does not match request {};{}",
                reply.key,
                reply.kind,
                key,
                kind
            );
        }
        Some(reply)
    }

    /// Current cube center
    pub fn cube_position(&mut self) -> Option<Point3> {
        let reply: CubePosReply = self.query_typed(RequestKey::Get, CUBE_POS, EMPTY_PAYLOAD)?;
        Some(Point3::from(reply.pos))
    }

    /// Current joint angles θ1..θ6
    pub fn arm_angles(&mut self) -> Option<[f64; JOINT_COUNT]> {
        let reply: AnglesPayload = self.query_typed(RequestKey::Get, ARM_ANGLE, EMPTY_PAYLOAD)?;
        match <[f64; JOINT_COUNT]>::try_from(reply.angles.as_slice()) {
            Ok(angles) => Some(angles),
            Err(_) => {
                tracing::warn!(
                    "Angle reply carried {} values, expected {}",
                    reply.angles.len(),
                    JOINT_COUNT
                );
                self.drop_link();
                None
            }
        }
    }

    /// Post joint targets; `Some(accepted)` once delivered
    pub fn set_arm_angles(&mut self, angles: &[f64; JOINT_COUNT]) -> Option<bool> {
        let payload = AnglesPayload {
            angles: angles.to_vec(),
        };
        self.post(ARM_ANGLE, &payload)
    }

    /// Post a grab (true) or release (false); `Some(accepted)` once delivered
    pub fn set_gripper(&mut self, closed: bool) -> Option<bool> {
        self.post(GRIPPER_ON, &GripperRequest { gripper: closed })
    }

    fn post<P: serde::Serialize>(&mut self, kind: &str, payload: &P) -> Option<bool> {
        let payload = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to encode {} payload: {}", kind, e);
                return None;
            }
        };
        let reply: ResultReply = self.query_typed(RequestKey::Post, kind, &payload)?;
        if !reply.is_success() {
            tracing::warn!("Simulator refused {} write", kind);
        }
        Some(reply.is_success())
    }

    fn query_typed<R: DeserializeOwned>(
        &mut self,
        key: RequestKey,
        kind: &str,
        payload: &str,
    ) -> Option<R> {
        let reply = self.query(key, kind, payload)?;
        match reply.payload_as::<R>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Malformed {} reply payload: {}", kind, e);
                self.drop_link();
                None
            }
        }
    }

    /// Raw exchange without the online check
    fn exchange(&mut self, request: &Message) -> Option<Message> {
        let bytes = match self.transport.exchange(request.encode().as_bytes()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::warn!("No reply to {};{}", request.key, request.kind);
                self.drop_link();
                return None;
            }
            Err(e) => {
                tracing::warn!("Transport error on {};{}: {}", request.key, request.kind, e);
                self.drop_link();
                return None;
            }
        };

        match Message::decode(&bytes) {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!("Malformed reply to {};{}: {}", request.key, request.kind, e);
                self.drop_link();
                None
            }
        }
    }

    fn drop_link(&mut self) {
        if self.state == ConnectionState::Online {
            tracing::warn!("Link to world simulator lost");
            self.links_lost += 1;
        }
        self.state = ConnectionState::Disconnected;
    }
}
