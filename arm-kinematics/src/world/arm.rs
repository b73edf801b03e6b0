//! Forward kinematics of the 6-axis arm

use crate::config::ArmConfig;
use crate::core::{Joint, JointAngles, Orientation, Point3};

/// Fixed gripper pitch; the gripper always points straight down.
pub const GRIPPER_PITCH: f64 = 180.0;

/// Link geometry plus the current joint angles
#[derive(Debug, Clone, PartialEq)]
pub struct RobotArm {
    links: [f64; 4],
    angles: JointAngles,
}

impl RobotArm {
    /// Arm in the default pose
    pub fn new(config: &ArmConfig) -> Self {
        Self {
            links: config.links(),
            angles: JointAngles::default(),
        }
    }

    /// Link lengths `[l1, l2, l3, l4]`
    pub fn links(&self) -> [f64; 4] {
        self.links
    }

    /// Current joint angles
    pub fn angles(&self) -> &JointAngles {
        &self.angles
    }

    /// Mutable access for the motion profile
    pub fn angles_mut(&mut self) -> &mut JointAngles {
        &mut self.angles
    }

    /// Replace all joint angles
    pub fn set_angles(&mut self, angles: JointAngles) {
        self.angles = angles;
    }

    /// Joint positions: base, shoulder, elbow, wrist, gripper
    ///
    /// Pitch joints are measured from the vertical and accumulate along the
    /// chain, so each link's offset is `(l·sin c, l·cos c)` in the vertical
    /// plane rotated by the base yaw.
    pub fn positions(&self) -> [Point3; 5] {
        let [l1, l2, l3, l4] = self.links;
        let yaw = self.angles[Joint::Base].to_radians();
        let (sin_yaw, cos_yaw) = yaw.sin_cos();

        let c2 = self.angles[Joint::Shoulder];
        let c3 = c2 + self.angles[Joint::Elbow];
        let c4 = c3 + self.angles[Joint::WristPitch];

        let base = Point3::ORIGIN;
        let shoulder = Point3::new(0.0, 0.0, l1);

        let mut out = [base, shoulder, shoulder, shoulder, shoulder];
        let mut radial = 0.0;
        let mut height = l1;
        for (i, (len, cum)) in [(l2, c2), (l3, c3), (l4, c4)].into_iter().enumerate() {
            let (s, c) = cum.to_radians().sin_cos();
            radial += len * s;
            height += len * c;
            out[i + 2] = Point3::new(radial * cos_yaw, radial * sin_yaw, height);
        }
        out
    }

    /// Gripper tip position
    pub fn gripper_position(&self) -> Point3 {
        self.positions()[4]
    }

    /// Gripper orientation: yaw follows the base, roll the wrist
    pub fn gripper_orientation(&self) -> Orientation {
        Orientation {
            yaw: self.angles[Joint::Base],
            pitch: GRIPPER_PITCH,
            roll: self.angles[Joint::WristRoll],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arm_at(values: [f64; 6]) -> RobotArm {
        let mut arm = RobotArm::new(&ArmConfig::default());
        arm.set_angles(JointAngles::new(values));
        arm
    }

    #[test]
    fn test_zero_angles_point_straight_up() {
        let arm = arm_at([0.0; 6]);
        let p = arm.gripper_position();
        assert_eq!(p, Point3::new(0.0, 0.0, 5.0));

        let positions = arm.positions();
        assert_eq!(positions[0], Point3::ORIGIN);
        assert_eq!(positions[1].z, 2.0);
        assert_eq!(positions[2].z, 3.5);
        assert_eq!(positions[3].z, 4.5);
    }

    #[test]
    fn test_horizontal_arm_along_x() {
        let arm = arm_at([0.0, 90.0, 0.0, 0.0, 0.0, 0.0]);
        let p = arm.gripper_position();
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_base_yaw_rotates_reach() {
        let arm = arm_at([90.0, 90.0, 0.0, 0.0, 0.0, 0.0]);
        let p = arm.gripper_position();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_folded_wrist_hangs_down() {
        // Upper arm horizontal, forearm and hand pointing down
        let arm = arm_at([0.0, 90.0, 90.0, 0.0, 0.0, 0.0]);
        let p = arm.gripper_position();
        assert_relative_eq!(p.x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_orientation_pitch_fixed() {
        let arm = arm_at([30.0, 10.0, 20.0, 40.0, -60.0, 0.0]);
        let o = arm.gripper_orientation();
        assert_eq!(o.yaw, 30.0);
        assert_eq!(o.pitch, 180.0);
        assert_eq!(o.roll, -60.0);
    }
}
