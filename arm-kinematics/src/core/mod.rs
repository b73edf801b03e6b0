//! Core types shared by the world model, motion profile and IK.

mod types;

pub use types::{JOINT_COUNT, Joint, JointAngles, Orientation, Point3};
