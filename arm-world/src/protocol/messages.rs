//! Message type names and payload shapes

use serde::{Deserialize, Serialize};

/// Login handshake
pub const LOGIN: &str = "login";
/// Cube position
pub const CUBE_POS: &str = "cubePos";
/// Joint angles (read or write)
pub const ARM_ANGLE: &str = "armAngle";
/// Gripper grab/release
pub const GRIPPER_ON: &str = "gripperOn";
/// Reply type for unmatched requests
pub const DENY: &str = "deny";
/// Login reply state meaning the simulator accepts requests
pub const READY: &str = "ready";
/// Payload for requests that carry no data
pub const EMPTY_PAYLOAD: &str = "{}";

/// `GET;login` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Client device identifier
    #[serde(rename = "plcID")]
    pub plc_id: String,
}

/// `REP;login` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginReply {
    /// `"ready"` on success
    pub state: String,
}

/// `REP;cubePos` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubePosReply {
    /// Cube center `[x, y, z]`
    pub pos: [f64; 3],
}

/// `armAngle` read reply and write request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnglesPayload {
    /// θ1..θ5 in degrees, then the gripper opening
    pub angles: Vec<f64>,
}

/// `POST;gripperOn` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GripperRequest {
    /// true grabs, false releases
    pub gripper: bool,
}

/// Write reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultReply {
    /// `"success"` or `"failed"`
    pub result: String,
}

impl ResultReply {
    /// Successful write
    pub fn success() -> Self {
        Self {
            result: "success".to_string(),
        }
    }

    /// Refused write
    pub fn failed() -> Self {
        Self {
            result: "failed".to_string(),
        }
    }

    /// True for a successful write
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}
