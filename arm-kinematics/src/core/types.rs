//! Point, joint and orientation types for the arm.

use crate::error::{KinematicsError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Index, Sub};

/// Number of controllable channels: five joints plus the gripper opening.
pub const JOINT_COUNT: usize = 6;

/// Position in the arm base frame (simulation units)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate (up)
    pub z: f64,
}

impl Point3 {
    /// Base origin
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new point
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance from the base axis in the ground plane
    #[inline]
    pub fn planar_distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Components as `[x, y, z]`
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Point3::new(v[0], v[1], v[2])
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// Arm channels in wire order (θ1..θ5, gripper opening)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    /// Base yaw (θ1)
    Base,
    /// Shoulder pitch (θ2)
    #[serde(alias = "shld")]
    Shoulder,
    /// Elbow pitch (θ3)
    #[serde(alias = "elbw")]
    Elbow,
    /// Wrist pitch (θ4)
    #[serde(alias = "wrtP")]
    WristPitch,
    /// Wrist roll / gripper rotation (θ5)
    #[serde(alias = "wrtR")]
    WristRoll,
    /// Gripper opening, percent
    #[serde(alias = "grip")]
    Gripper,
}

impl Joint {
    /// All channels in wire order
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Base,
        Joint::Shoulder,
        Joint::Elbow,
        Joint::WristPitch,
        Joint::WristRoll,
        Joint::Gripper,
    ];

    /// Position of this channel in `[θ1..θ6]`
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Valid range `(min, max)` for this channel
    pub fn range(self) -> (f64, f64) {
        match self {
            Joint::Base => (-180.0, 180.0),
            Joint::Shoulder => (-180.0, 180.0),
            Joint::Elbow => (-180.0, 180.0),
            Joint::WristPitch => (-135.0, 135.0),
            Joint::WristRoll => (-180.0, 180.0),
            Joint::Gripper => (0.0, 100.0),
        }
    }

    /// Clamp a value into this channel's range
    #[inline]
    pub fn clamp(self, value: f64) -> f64 {
        let (lo, hi) = self.range();
        value.clamp(lo, hi)
    }

    /// Short name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Joint::Base => "base",
            Joint::Shoulder => "shoulder",
            Joint::Elbow => "elbow",
            Joint::WristPitch => "wrist_pitch",
            Joint::WristRoll => "wrist_roll",
            Joint::Gripper => "gripper",
        }
    }
}

/// One value per arm channel, always within the channel ranges
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointAngles([f64; JOINT_COUNT]);

impl JointAngles {
    /// Power-on pose of the simulated arm
    pub const DEFAULT_POSE: [f64; JOINT_COUNT] = [45.0, -15.0, 30.0, 0.0, 0.0, 50.0];

    /// Build from raw values, clamping each into range
    pub fn new(values: [f64; JOINT_COUNT]) -> Self {
        let mut angles = JointAngles([0.0; JOINT_COUNT]);
        for joint in Joint::ALL {
            angles.set(joint, values[joint.index()]);
        }
        angles
    }

    /// All channels at zero
    pub fn zero() -> Self {
        Self::new([0.0; JOINT_COUNT])
    }

    /// Build from a slice received off the wire
    ///
    /// Requires exactly [`JOINT_COUNT`] finite values.
    pub fn try_from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != JOINT_COUNT {
            return Err(KinematicsError::AngleCount {
                expected: JOINT_COUNT,
                actual: values.len(),
            });
        }
        let mut raw = [0.0; JOINT_COUNT];
        for (joint, &value) in Joint::ALL.iter().zip(values) {
            if !value.is_finite() {
                return Err(KinematicsError::NonFinite {
                    joint: joint.name(),
                    value,
                });
            }
            raw[joint.index()] = value;
        }
        Ok(Self::new(raw))
    }

    /// Value of one channel
    #[inline]
    pub fn get(&self, joint: Joint) -> f64 {
        self.0[joint.index()]
    }

    /// Set one channel, clamped to its range
    #[inline]
    pub fn set(&mut self, joint: Joint, value: f64) {
        self.0[joint.index()] = joint.clamp(value);
    }

    /// Raw values in wire order
    #[inline]
    pub fn to_array(&self) -> [f64; JOINT_COUNT] {
        self.0
    }

    /// Iterate `(joint, value)` pairs in wire order
    pub fn iter(&self) -> impl Iterator<Item = (Joint, f64)> + '_ {
        Joint::ALL.iter().map(move |&j| (j, self.get(j)))
    }
}

impl Default for JointAngles {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POSE)
    }
}

impl Index<Joint> for JointAngles {
    type Output = f64;

    fn index(&self, joint: Joint) -> &f64 {
        &self.0[joint.index()]
    }
}

/// Gripper orientation in degrees
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Rotation about the vertical axis (follows the base)
    pub yaw: f64,
    /// Tilt; the gripper always points down (180)
    pub pitch: f64,
    /// Rotation about the gripper axis (follows the wrist roll)
    pub roll: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_angles_clamp_on_set() {
        let mut angles = JointAngles::zero();
        angles.set(Joint::Gripper, 140.0);
        angles.set(Joint::WristPitch, -200.0);
        assert_eq!(angles[Joint::Gripper], 100.0);
        assert_eq!(angles[Joint::WristPitch], -135.0);
    }

    #[test]
    fn test_try_from_slice_rejects_wrong_count() {
        let err = JointAngles::try_from_slice(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            KinematicsError::AngleCount {
                expected: 6,
                actual: 3
            }
        );
    }

    #[test]
    fn test_try_from_slice_rejects_nan() {
        let err = JointAngles::try_from_slice(&[0.0, f64::NAN, 0.0, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            KinematicsError::NonFinite {
                joint: "shoulder",
                ..
            }
        ));
    }

    #[test]
    fn test_default_pose() {
        let angles = JointAngles::default();
        assert_eq!(angles.to_array(), JointAngles::DEFAULT_POSE);
    }

    #[test]
    fn test_joint_deserialize_short_names() {
        let joint: Joint = serde_json::from_str("\"shld\"").unwrap();
        assert_eq!(joint, Joint::Shoulder);
        let joint: Joint = serde_json::from_str("\"wrist_roll\"").unwrap();
        assert_eq!(joint, Joint::WristRoll);
    }

    #[test]
    fn test_point_distance() {
        let a = Point3::new(1.0, 2.0, 2.0);
        assert_eq!(a.distance(&Point3::ORIGIN), 3.0);
        assert_eq!((a - a), Point3::ORIGIN);
    }
}
