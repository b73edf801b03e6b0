//! Exhaustive grid search over the planar reach
//!
//! Enumerates shoulder, elevation and wrist combinations at a fixed step and
//! keeps the one whose horizontal reach best matches the target distance.
//! Cost is cubic in the number of steps per axis; keep the step coarse
//! (5 degrees is ample for grasping).

use super::{IkSolution, IkStrategy, MAX_REACH};
use crate::config::ArmConfig;

const SHOULDER_RANGE: (f64, f64) = (-80.0, 80.0);
const ELBOW_RANGE: (f64, f64) = (-180.0, 180.0);
const WRIST_RANGE: (f64, f64) = (-90.0, 90.0);

/// Solutions must beat this error to be returned
pub const ACCEPT_ERROR: f64 = 0.04;

/// Search stops at the first solution below this error
pub const GOOD_ENOUGH_ERROR: f64 = 0.01;

/// Grid-search IK strategy
#[derive(Debug, Clone)]
pub struct GridSearch {
    links: [f64; 3],
    step: f64,
}

impl GridSearch {
    /// Search with the given step in degrees
    pub fn new(config: &ArmConfig, step: f64) -> Self {
        Self {
            links: [config.upper_arm, config.forearm, config.hand],
            step: if step > 0.0 { step } else { 5.0 },
        }
    }

    /// Step in degrees
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Horizontal reach for elevation angles in degrees
    pub fn reach(&self, shoulder: f64, elbow: f64, wrist: f64) -> f64 {
        let [l2, l3, l4] = self.links;
        let c1 = shoulder;
        let c2 = c1 + elbow;
        let c3 = c2 + wrist;
        (90.0 - c1).to_radians().sin() * l2
            + (90.0 - c2).to_radians().sin() * l3
            + (90.0 - c3).to_radians().sin() * l4
    }

    fn axis(&self, (lo, hi): (f64, f64)) -> impl Iterator<Item = f64> {
        let count = ((hi - lo) / self.step + 1e-9).floor() as usize;
        let step = self.step;
        (0..=count).map(move |i| lo + i as f64 * step)
    }
}

impl IkStrategy for GridSearch {
    fn solve(&self, x: f64, y: f64) -> Option<IkSolution> {
        let target = (x * x + y * y).sqrt();
        if target > MAX_REACH {
            log::debug!("Target distance {:.3} exceeds max reach {}", target, MAX_REACH);
            return None;
        }

        let mut best: Option<IkSolution> = None;
        let mut best_error = ACCEPT_ERROR;

        'search: for a in self.axis(SHOULDER_RANGE) {
            for b in self.axis(ELBOW_RANGE) {
                for c in self.axis(WRIST_RANGE) {
                    let error = (self.reach(a, b, c) - target).abs();
                    if error < best_error {
                        best_error = error;
                        best = Some(IkSolution {
                            shoulder: a,
                            elbow: b,
                            wrist: c,
                            error,
                            converged: true,
                        });
                    }
                    if error < GOOD_ENOUGH_ERROR {
                        break 'search;
                    }
                }
            }
        }

        if best.is_none() {
            log::debug!("No grid solution within {} for distance {:.3}", ACCEPT_ERROR, target);
        }
        best
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}
