//! # arm-kinematics
//!
//! Kinematics library for the simulated 6-axis robot arm.
//!
//! ## Overview
//!
//! - **World model**: forward kinematics of the arm plus a tiny cube "physics"
//!   (settle-to-rest height, grab/release)
//! - **Motion profile**: rate-limited per-joint interpolation toward targets
//! - **Inverse kinematics**: grid-search and nonlinear strategies used for
//!   autonomous grasp targeting
//!
//! ## Quick Start
//!
//! ```rust
//! use arm_kinematics::{ArmConfig, WorldModel};
//!
//! let mut world = WorldModel::new(ArmConfig::default());
//! let gripper = world.gripper_position();
//! world.tick();
//! println!("gripper at {:?}, cube at {:?}", gripper, world.cube().position());
//! ```
//!
//! ## Angle Conventions
//!
//! - Joint angles are in degrees; the gripper channel is percent open.
//! - The arm frame measures pitch joints from the vertical, so all-zero angles
//!   point the arm straight up.
//! - The IK solvers work in elevation angles (from the horizontal) and convert
//!   through [`IkSolution::to_joint_targets`].

#![warn(missing_docs)]

pub mod config;
pub mod core;
pub mod error;
pub mod ik;
pub mod motion;
pub mod world;

pub use config::ArmConfig;
pub use core::{JOINT_COUNT, Joint, JointAngles, Orientation, Point3};
pub use error::{KinematicsError, Result};
pub use ik::{
    GridSearch, IkSolution, IkStrategy, MAX_REACH, NonlinearConfig, NonlinearSolver, base_yaw,
    within_envelope,
};
pub use motion::{ControlMode, MotionProfile};
pub use world::{Cube, GrabError, RobotArm, WorldModel};
