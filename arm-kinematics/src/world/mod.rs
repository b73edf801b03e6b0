//! Authoritative world state: the arm and the cube
//!
//! The world advances in discrete ticks. A free cube drops toward its rest
//! height each tick; a held cube follows the gripper tip.

mod arm;
mod cube;

pub use arm::{GRIPPER_PITCH, RobotArm};
pub use cube::Cube;

use crate::config::ArmConfig;
use crate::core::{Joint, JointAngles, Orientation, Point3};

/// Why a grab attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GrabError {
    /// Gripper tip is not within the grab radius
    #[error("Cube out of reach: distance {distance:.3}")]
    TooFar {
        /// Gripper-to-cube distance
        distance: f64,
    },

    /// Gripper is not closed enough
    #[error("Gripper not closed: opening {opening:.1}%")]
    GripperOpen {
        /// Current opening in percent
        opening: f64,
    },
}

/// Arm plus cube
#[derive(Debug, Clone)]
pub struct WorldModel {
    config: ArmConfig,
    arm: RobotArm,
    cube: Cube,
}

impl WorldModel {
    /// World with the arm in its default pose and the cube at its start
    pub fn new(config: ArmConfig) -> Self {
        let arm = RobotArm::new(&config);
        let cube = Cube::new(config.cube_start_point(), config.cube_size);
        Self { config, arm, cube }
    }

    /// Geometry and physics parameters
    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    /// The arm
    pub fn arm(&self) -> &RobotArm {
        &self.arm
    }

    /// The cube
    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    /// Current joint angles
    pub fn angles(&self) -> &JointAngles {
        self.arm.angles()
    }

    /// Assign joint angles, dragging a held cube along
    pub fn set_angles(&mut self, angles: JointAngles) {
        self.arm.set_angles(angles);
        self.follow_gripper();
    }

    /// Mutable joint angles for in-place interpolation
    ///
    /// Callers should follow up with [`WorldModel::tick`] so a held cube
    /// catches up.
    pub fn angles_mut(&mut self) -> &mut JointAngles {
        self.arm.angles_mut()
    }

    /// Joint positions: base, shoulder, elbow, wrist, gripper
    pub fn positions(&self) -> [Point3; 5] {
        self.arm.positions()
    }

    /// Gripper tip position
    pub fn gripper_position(&self) -> Point3 {
        self.arm.gripper_position()
    }

    /// Gripper orientation (pitch fixed at 180)
    pub fn gripper_orientation(&self) -> Orientation {
        self.arm.gripper_orientation()
    }

    /// Distance from the gripper tip to the cube center
    pub fn gripper_to_cube(&self) -> f64 {
        self.gripper_position().distance(&self.cube.position())
    }

    /// Advance cube physics by one tick
    pub fn tick(&mut self) {
        if self.cube.is_held() {
            self.follow_gripper();
        } else {
            self.update_cube_z();
        }
    }

    /// Drop a free cube one step toward rest; idempotent once resting
    pub fn update_cube_z(&mut self) {
        if !self.cube.is_held() {
            self.cube.settle(self.config.settle_step);
        }
    }

    /// Attach the cube to the gripper
    ///
    /// Requires the tip strictly inside the grab radius and the opening
    /// strictly below the grip threshold.
    pub fn grab(&mut self) -> Result<(), GrabError> {
        let distance = self.gripper_to_cube();
        if distance >= self.config.grab_radius {
            return Err(GrabError::TooFar { distance });
        }
        let opening = self.arm.angles()[Joint::Gripper];
        if opening >= self.config.grip_threshold {
            return Err(GrabError::GripperOpen { opening });
        }
        self.cube.set_held(true);
        self.follow_gripper();
        log::debug!("Cube grabbed at distance {:.3}", distance);
        Ok(())
    }

    /// Let go of the cube; it falls on subsequent ticks
    pub fn release(&mut self) {
        if self.cube.is_held() {
            log::debug!("Cube released at {:?}", self.cube.position());
        }
        self.cube.set_held(false);
    }

    /// Default pose, cube back at its original position
    pub fn reset(&mut self) {
        self.arm.set_angles(JointAngles::default());
        self.cube.restore();
    }

    /// Move a free cube, e.g. to stage a scene
    pub fn place_cube(&mut self, position: Point3) {
        if !self.cube.is_held() {
            self.cube.move_to(position);
        }
    }

    fn follow_gripper(&mut self) {
        if self.cube.is_held() {
            let tip = self.arm.gripper_position();
            self.cube.move_to(tip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn upright_world() -> WorldModel {
        let mut world = WorldModel::new(ArmConfig::default());
        world.set_angles(JointAngles::zero());
        world
    }

    #[test]
    fn test_cube_settles_to_rest() {
        let mut world = WorldModel::new(ArmConfig::default());
        assert_relative_eq!(world.cube().position().z, 0.3);

        world.tick();
        assert_relative_eq!(world.cube().position().z, 0.2, epsilon = 1e-12);
        world.tick();
        assert_relative_eq!(world.cube().position().z, 0.15);
        world.tick();
        assert_relative_eq!(world.cube().position().z, 0.15);
    }

    #[test]
    fn test_cube_below_ground_snaps_up() {
        let mut world = WorldModel::new(ArmConfig::default());
        world.place_cube(Point3::new(1.0, 1.0, -0.4));
        world.update_cube_z();
        assert_eq!(world.cube().position().z, 0.15);
    }

    #[test]
    fn test_grab_boundary_distance_excluded() {
        let mut world = upright_world();
        // Tip at (0, 0, 5); cube exactly one unit below
        world.place_cube(Point3::new(0.0, 0.0, 4.0));
        assert_eq!(
            world.grab(),
            Err(GrabError::TooFar { distance: 1.0 })
        );

        world.place_cube(Point3::new(0.0, 0.0, 4.01));
        assert!(world.grab().is_ok());
        assert!(world.cube().is_held());
    }

    #[test]
    fn test_grab_boundary_opening_excluded() {
        let mut world = upright_world();
        world.place_cube(Point3::new(0.0, 0.0, 4.5));

        let mut angles = JointAngles::zero();
        angles.set(Joint::Gripper, 30.0);
        world.set_angles(angles);
        assert_eq!(
            world.grab(),
            Err(GrabError::GripperOpen { opening: 30.0 })
        );

        angles.set(Joint::Gripper, 29.9);
        world.set_angles(angles);
        assert!(world.grab().is_ok());
    }

    #[test]
    fn test_held_cube_tracks_gripper_until_release() {
        let mut world = upright_world();
        world.place_cube(Point3::new(0.0, 0.0, 4.6));
        world.grab().unwrap();
        assert_eq!(world.cube().position(), Point3::new(0.0, 0.0, 5.0));

        world.set_angles(JointAngles::new([0.0, 90.0, 0.0, 0.0, 0.0, 0.0]));
        world.tick();
        let cube = world.cube().position();
        assert_relative_eq!(cube.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(cube.z, 2.0, epsilon = 1e-12);

        world.release();
        world.tick();
        assert_relative_eq!(world.cube().position().z, 1.9, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_restores_pose_and_cube() {
        let mut world = upright_world();
        world.place_cube(Point3::new(0.0, 0.0, 4.6));
        world.grab().unwrap();
        world.reset();

        assert!(!world.cube().is_held());
        assert_eq!(world.cube().position(), Point3::new(2.0, 1.0, 0.3));
        assert_eq!(world.angles().to_array(), JointAngles::DEFAULT_POSE);
    }
}
