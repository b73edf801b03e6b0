//! Text wire protocol between the world simulator and its clients
//!
//! # Wire Format
//!
//! Every datagram is one ASCII line of three `;`-separated fields:
//!
//! ```text
//! ┌──────────┬────────────┬─────────────────────┐
//! │ KEY      │ TYPE       │ JSON payload        │
//! │ GET/POST │ login, ... │ may itself contain ;│
//! │ /REP     │            │                     │
//! └──────────┴────────────┴─────────────────────┘
//! ```
//!
//! The line is split on `;` at most twice, so only the first two separators
//! are structural.
//!
//! # Message Types
//!
//! | TYPE | Direction | Request | Reply |
//! |------|-----------|---------|-------|
//! | `login` | GET→REP | `{"plcID":str}` | `{"state":"ready"}` |
//! | `cubePos` | GET→REP | `{}` | `{"pos":[x,y,z]}` |
//! | `armAngle` | GET→REP | `{}` | `{"angles":[θ1..θ6]}` |
//! | `armAngle` | POST→REP | `{"angles":[θ1..θ6]}` | `{"result":"success"\|"failed"}` |
//! | `gripperOn` | POST→REP | `{"gripper":bool}` | `{"result":"success"\|"failed"}` |
//!
//! Anything else is answered with `REP;deny;{}`.

mod frame;
mod messages;

pub use frame::{Message, ProtocolError, RequestKey};
pub use messages::{
    ARM_ANGLE, AnglesPayload, CUBE_POS, CubePosReply, DENY, EMPTY_PAYLOAD, GRIPPER_ON,
    GripperRequest, LOGIN, LoginReply, LoginRequest, READY, ResultReply,
};
