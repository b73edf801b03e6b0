//! Rate-limited joint motion
//!
//! In automatic mode every channel moves toward its requested target by at
//! most `step` per tick and stops exactly on the target. Manual mode assigns
//! the request directly.

use crate::core::{Joint, JointAngles};
use serde::{Deserialize, Serialize};

/// How requested angles reach the arm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Interpolate through a [`MotionProfile`]
    #[default]
    Automatic,
    /// Jump straight to the requested angles
    Manual,
}

/// Per-tick step limit applied to every channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    /// Maximum change per tick (degrees, or percent for the gripper)
    pub step: f64,
}

impl MotionProfile {
    /// Create a profile; non-positive steps are raised to a tiny positive value
    pub fn new(step: f64) -> Self {
        Self {
            step: if step > 0.0 { step } else { f64::EPSILON },
        }
    }

    /// Move `current` one tick toward `target` without overshooting
    #[inline]
    pub fn step_toward(&self, current: f64, target: f64) -> f64 {
        if current < target {
            (current + self.step).min(target)
        } else if current > target {
            (current - self.step).max(target)
        } else {
            current
        }
    }

    /// Advance all channels one tick; returns true while any channel is moving
    pub fn advance(&self, current: &mut JointAngles, target: &JointAngles) -> bool {
        let mut moving = false;
        for joint in Joint::ALL {
            let now = current.get(joint);
            let next = self.step_toward(now, target.get(joint));
            if next != now {
                current.set(joint, next);
                moving = true;
            }
        }
        moving
    }

    /// Ticks needed to cover `delta`
    pub fn ticks_to_reach(&self, delta: f64) -> u32 {
        (delta.abs() / self.step).ceil() as u32
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::new(2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_never_overshoots() {
        let profile = MotionProfile::new(3.0);
        assert_eq!(profile.step_toward(0.0, 10.0), 3.0);
        assert_eq!(profile.step_toward(9.0, 10.0), 10.0);
        assert_eq!(profile.step_toward(10.0, 10.0), 10.0);
        assert_eq!(profile.step_toward(-1.0, -2.5), -2.5);
    }

    #[test]
    fn test_converges_in_ceil_ticks() {
        let profile = MotionProfile::new(2.0);
        for (start, target) in [(0.0, 7.0), (45.0, -15.0), (10.0, 10.0), (-30.0, 30.0)] {
            let expected = profile.ticks_to_reach(target - start);
            let mut current = start;
            let mut ticks = 0;
            while current != target {
                let next = profile.step_toward(current, target);
                assert!((next - current).abs() <= profile.step);
                if start < target {
                    assert!(next <= target);
                } else {
                    assert!(next >= target);
                }
                current = next;
                ticks += 1;
            }
            assert_eq!(ticks, expected, "{} -> {}", start, target);
        }
    }

    #[test]
    fn test_advance_moves_all_channels() {
        let profile = MotionProfile::new(5.0);
        let mut current = JointAngles::zero();
        let target = JointAngles::new([10.0, -3.0, 0.0, 20.0, 0.0, 100.0]);

        assert!(profile.advance(&mut current, &target));
        assert_eq!(current.to_array(), [5.0, -3.0, 0.0, 5.0, 0.0, 5.0]);

        for _ in 0..30 {
            profile.advance(&mut current, &target);
        }
        assert_eq!(current, target);
        assert!(!profile.advance(&mut current, &target));
    }

    #[test]
    fn test_control_mode_serde() {
        let mode: ControlMode = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(mode, ControlMode::Manual);
        assert_eq!(ControlMode::default(), ControlMode::Automatic);
    }
}
