//! Arm geometry and cube physics parameters

use crate::core::Point3;
use crate::error::{KinematicsError, Result};
use serde::{Deserialize, Serialize};

/// Physical parameters of the simulated arm and its cube
///
/// Deserialized from the `[arm]` table of the world simulator config; every
/// field has a default so a partial table is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Base column height l1
    #[serde(default = "default_base_height")]
    pub base_height: f64,

    /// Upper arm length l2 (shoulder to elbow)
    #[serde(default = "default_upper_arm")]
    pub upper_arm: f64,

    /// Forearm length l3 (elbow to wrist)
    #[serde(default = "default_forearm")]
    pub forearm: f64,

    /// Hand length l4 (wrist to gripper tip)
    #[serde(default = "default_hand")]
    pub hand: f64,

    /// Cube start position `[x, y, z]`
    #[serde(default = "default_cube_start")]
    pub cube_start: [f64; 3],

    /// Cube edge length; the cube rests at `z = size / 2`
    #[serde(default = "default_cube_size")]
    pub cube_size: f64,

    /// Height the cube drops per tick while falling
    #[serde(default = "default_settle_step")]
    pub settle_step: f64,

    /// Grab succeeds only when the gripper is strictly closer than this
    #[serde(default = "default_grab_radius")]
    pub grab_radius: f64,

    /// Grab succeeds only when the opening is strictly below this (percent)
    #[serde(default = "default_grip_threshold")]
    pub grip_threshold: f64,
}

fn default_base_height() -> f64 {
    2.0
}
fn default_upper_arm() -> f64 {
    1.5
}
fn default_forearm() -> f64 {
    1.0
}
fn default_hand() -> f64 {
    0.5
}
fn default_cube_start() -> [f64; 3] {
    [2.0, 1.0, 0.3]
}
fn default_cube_size() -> f64 {
    0.3
}
fn default_settle_step() -> f64 {
    0.1
}
fn default_grab_radius() -> f64 {
    1.0
}
fn default_grip_threshold() -> f64 {
    30.0
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            base_height: default_base_height(),
            upper_arm: default_upper_arm(),
            forearm: default_forearm(),
            hand: default_hand(),
            cube_start: default_cube_start(),
            cube_size: default_cube_size(),
            settle_step: default_settle_step(),
            grab_radius: default_grab_radius(),
            grip_threshold: default_grip_threshold(),
        }
    }
}

impl ArmConfig {
    /// Link lengths `[l1, l2, l3, l4]`
    pub fn links(&self) -> [f64; 4] {
        [self.base_height, self.upper_arm, self.forearm, self.hand]
    }

    /// Planar reach of the three pitch links when fully extended
    pub fn max_reach(&self) -> f64 {
        self.upper_arm + self.forearm + self.hand
    }

    /// Cube start position as a point
    pub fn cube_start_point(&self) -> Point3 {
        Point3::from(self.cube_start)
    }

    /// Reject geometry the world model cannot simulate
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("base_height", self.base_height),
            ("upper_arm", self.upper_arm),
            ("forearm", self.forearm),
            ("hand", self.hand),
            ("cube_size", self.cube_size),
            ("settle_step", self.settle_step),
            ("grab_radius", self.grab_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(KinematicsError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.grip_threshold) {
            return Err(KinematicsError::InvalidParameter(format!(
                "grip_threshold must be within 0..=100, got {}",
                self.grip_threshold
            )));
        }
        if self.cube_start.iter().any(|v| !v.is_finite()) {
            return Err(KinematicsError::InvalidParameter(
                "cube_start must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ArmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.links(), [2.0, 1.5, 1.0, 0.5]);
        assert_eq!(config.max_reach(), 3.0);
    }

    #[test]
    fn test_rejects_zero_link() {
        let config = ArmConfig {
            forearm: 0.0,
            ..ArmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(KinematicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let config: ArmConfig = serde_json::from_str(r#"{"cube_size": 0.5}"#).unwrap();
        assert_eq!(config.cube_size, 0.5);
        assert_eq!(config.grab_radius, 1.0);
        assert_eq!(config.cube_start, [2.0, 1.0, 0.3]);
    }
}
