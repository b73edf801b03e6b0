//! Inverse kinematics for grasp targeting
//!
//! Both strategies answer the same question: which shoulder, elbow and wrist
//! angles put the gripper over ground point `(x, y)` with the wrist level.
//! Base yaw is exact ([`base_yaw`]) so only the planar sub-problem needs a
//! solver.
//!
//! Solutions are expressed in elevation angles, measured from the horizontal,
//! and converted into arm joint targets with [`IkSolution::to_joint_targets`].

mod grid;
mod nonlinear;

pub use grid::GridSearch;
pub use nonlinear::{NonlinearConfig, NonlinearSolver};

use crate::core::Joint;

/// Farthest planar distance the grasp planner accepts
pub const MAX_REACH: f64 = 2.4;

/// Planar arm solution in elevation angles (degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkSolution {
    /// Upper arm elevation above the horizontal
    pub shoulder: f64,
    /// Forearm angle relative to the upper arm
    pub elbow: f64,
    /// Hand angle relative to the forearm
    pub wrist: f64,
    /// Residual error of the solution
    pub error: f64,
    /// False when the solver stopped on a best-effort answer
    pub converged: bool,
}

impl IkSolution {
    /// Joint targets for the base, shoulder, elbow and wrist pitch
    ///
    /// The arm measures pitch from the vertical, so an elevation `a` becomes
    /// a shoulder angle of `90 - a` and the relative joints flip sign.
    pub fn to_joint_targets(&self, yaw: f64) -> [(Joint, f64); 4] {
        [
            (Joint::Base, yaw),
            (Joint::Shoulder, 90.0 - self.shoulder),
            (Joint::Elbow, -self.elbow),
            (Joint::WristPitch, -self.wrist),
        ]
    }
}

/// A planar IK strategy
pub trait IkStrategy: Send + Sync {
    /// Solve for ground point `(x, y)`; `None` when unreachable
    fn solve(&self, x: f64, y: f64) -> Option<IkSolution>;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}

/// Base yaw pointing at `(x, y)` in degrees
///
/// The x = 0 cases are explicit so the result never depends on the sign of
/// a zero.
pub fn base_yaw(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        if y > 0.0 {
            90.0
        } else if y < 0.0 {
            -90.0
        } else {
            0.0
        }
    } else {
        y.atan2(x).to_degrees()
    }
}

/// True when `(x, y)` lies within [`MAX_REACH`] of the base axis
pub fn within_envelope(x: f64, y: f64) -> bool {
    (x * x + y * y).sqrt() <= MAX_REACH
}

/// Wrap an angle into `(-180, 180]`
pub(crate) fn normalize_deg(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}
