//! Levenberg-Marquardt root finder for the planar arm
//!
//! Solves three equations in the elevation angles `a, b, c`:
//!
//! ```text
//! f1 = l2·cos(a) + l3·cos(a+b) + l4·cos(a+b+c) - d   (planar closure)
//! f2 = l1 + l2·sin(a) + l3·sin(a+b) + l4·sin(a+b+c) - h   (height closure)
//! f3 = a + b + c   (wrist level)
//! ```
//!
//! where `d` is the ground distance to the target and `h` the grasp height.
//! LM damping blends Gauss-Newton with gradient descent; set
//! `lm_initial_lambda = 0.0` for pure Gauss-Newton.

use super::{IkSolution, IkStrategy, normalize_deg};
use crate::config::ArmConfig;

/// Configuration for the nonlinear solver
#[derive(Clone, Debug)]
pub struct NonlinearConfig {
    /// Gripper height the solver aims for.
    /// Default: 0.5
    pub grasp_height: f64,

    /// Starting elevation angles `[a, b, c]` in degrees.
    /// Default: [0, -60, 60]
    pub initial_guess: [f64; 3],

    /// Maximum number of iterations.
    /// Default: 100
    pub max_iterations: usize,

    /// Residual norm below which the system counts as solved.
    /// Default: 1e-9
    pub tolerance: f64,

    /// Step norm (radians) below which iteration stops.
    /// Default: 1e-12
    pub min_step: f64,

    /// Initial LM damping factor (λ).
    /// Default: 0.001
    pub lm_initial_lambda: f64,

    /// Factor to scale λ up (on bad step) or down (on good step).
    /// Default: 10.0
    pub lm_lambda_factor: f64,

    /// Minimum λ value.
    /// Default: 1e-12
    pub lm_min_lambda: f64,

    /// Maximum λ value (gives up when exceeded).
    /// Default: 1e10
    pub lm_max_lambda: f64,
}

impl Default for NonlinearConfig {
    fn default() -> Self {
        Self {
            grasp_height: 0.5,
            initial_guess: [0.0, -60.0, 60.0],
            max_iterations: 100,
            tolerance: 1e-9,
            min_step: 1e-12,
            lm_initial_lambda: 0.001,
            lm_lambda_factor: 10.0,
            lm_min_lambda: 1e-12,
            lm_max_lambda: 1e10,
        }
    }
}

impl NonlinearConfig {
    /// Builder-style setter for the grasp height.
    pub fn with_grasp_height(mut self, height: f64) -> Self {
        self.grasp_height = height;
        self
    }

    /// Builder-style setter for the initial guess (degrees).
    pub fn with_initial_guess(mut self, guess: [f64; 3]) -> Self {
        self.initial_guess = guess;
        self
    }

    /// Builder-style setter for maximum iterations.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Disable LM damping (use pure Gauss-Newton).
    pub fn without_lm(mut self) -> Self {
        self.lm_initial_lambda = 0.0;
        self
    }
}

/// Nonlinear IK strategy
#[derive(Debug, Clone)]
pub struct NonlinearSolver {
    links: [f64; 4],
    config: NonlinearConfig,
}

impl NonlinearSolver {
    /// Solver for the given arm geometry
    pub fn new(arm: &ArmConfig, config: NonlinearConfig) -> Self {
        Self {
            links: arm.links(),
            config,
        }
    }

    /// Solver configuration
    pub fn config(&self) -> &NonlinearConfig {
        &self.config
    }

    /// Residuals `[f1, f2, f3]` at angles `q` (radians)
    fn residuals(&self, q: &[f64; 3], distance: f64) -> [f64; 3] {
        let [l1, l2, l3, l4] = self.links;
        let c1 = q[0];
        let c2 = c1 + q[1];
        let c3 = c2 + q[2];
        [
            l2 * c1.cos() + l3 * c2.cos() + l4 * c3.cos() - distance,
            l1 + l2 * c1.sin() + l3 * c2.sin() + l4 * c3.sin() - self.config.grasp_height,
            c3,
        ]
    }

    /// Jacobian of the residuals (rows: equations, cols: a, b, c)
    fn jacobian(&self, q: &[f64; 3]) -> [[f64; 3]; 3] {
        let [_, l2, l3, l4] = self.links;
        let c1 = q[0];
        let c2 = c1 + q[1];
        let c3 = c2 + q[2];
        let (s1, k1) = c1.sin_cos();
        let (s2, k2) = c2.sin_cos();
        let (s3, k3) = c3.sin_cos();
        [
            [
                -(l2 * s1 + l3 * s2 + l4 * s3),
                -(l3 * s2 + l4 * s3),
                -l4 * s3,
            ],
            [l2 * k1 + l3 * k2 + l4 * k3, l3 * k2 + l4 * k3, l4 * k3],
            [1.0, 1.0, 1.0],
        ]
    }
}

fn norm_sq(v: &[f64; 3]) -> f64 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

impl IkStrategy for NonlinearSolver {
    fn solve(&self, x: f64, y: f64) -> Option<IkSolution> {
        let distance = (x * x + y * y).sqrt();
        let cfg = &self.config;

        let mut q = cfg.initial_guess.map(f64::to_radians);
        let mut r = self.residuals(&q, distance);
        let mut cost = norm_sq(&r);

        let use_lm = cfg.lm_initial_lambda > 0.0;
        let mut lambda = cfg.lm_initial_lambda;
        let mut iterations = 0;

        while iterations < cfg.max_iterations && cost.sqrt() >= cfg.tolerance {
            iterations += 1;
            let j = self.jacobian(&q);

            // H = JᵀJ, g = Jᵀr
            let mut h = [[0.0f64; 3]; 3];
            let mut g = [0.0f64; 3];
            for row in 0..3 {
                for i in 0..3 {
                    g[i] += j[row][i] * r[row];
                    for k in 0..3 {
                        h[i][k] += j[row][i] * j[row][k];
                    }
                }
            }
            if use_lm {
                for (i, row) in h.iter_mut().enumerate() {
                    row[i] += lambda;
                }
            }

            let Some(delta) = solve_3x3(&h, &g) else {
                break;
            };

            let trial = [q[0] + delta[0], q[1] + delta[1], q[2] + delta[2]];
            let trial_r = self.residuals(&trial, distance);
            let trial_cost = norm_sq(&trial_r);

            if !use_lm || trial_cost < cost {
                q = trial;
                r = trial_r;
                cost = trial_cost;
                lambda = (lambda / cfg.lm_lambda_factor).max(cfg.lm_min_lambda);
                if norm_sq(&delta) < cfg.min_step * cfg.min_step {
                    break;
                }
            } else {
                lambda *= cfg.lm_lambda_factor;
                if lambda > cfg.lm_max_lambda {
                    break;
                }
            }
        }

        let error = cost.sqrt();
        if !error.is_finite() {
            log::warn!("Nonlinear IK diverged for ({:.3}, {:.3})", x, y);
            return None;
        }
        let converged = error < cfg.tolerance.max(1e-6);
        if !converged {
            log::warn!(
                "Nonlinear IK did not converge for ({:.3}, {:.3}) after {} iterations, residual {:.4}",
                x,
                y,
                iterations,
                error
            );
        }

        Some(IkSolution {
            shoulder: normalize_deg(q[0].to_degrees()),
            elbow: normalize_deg(q[1].to_degrees()),
            wrist: normalize_deg(q[2].to_degrees()),
            error,
            converged,
        })
    }

    fn name(&self) -> &'static str {
        "nonlinear"
    }
}

/// Solve `A·x = -b` for a 3x3 system using cofactors.
fn solve_3x3(a: &[[f64; 3]; 3], b: &[f64; 3]) -> Option<[f64; 3]> {
    let det = a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);

    if det.abs() < 1e-18 {
        return None;
    }

    let inv_det = 1.0 / det;
    let inv = [
        [
            (a[1][1] * a[2][2] - a[1][2] * a[2][1]) * inv_det,
            (a[0][2] * a[2][1] - a[0][1] * a[2][2]) * inv_det,
            (a[0][1] * a[1][2] - a[0][2] * a[1][1]) * inv_det,
        ],
        [
            (a[1][2] * a[2][0] - a[1][0] * a[2][2]) * inv_det,
            (a[0][0] * a[2][2] - a[0][2] * a[2][0]) * inv_det,
            (a[0][2] * a[1][0] - a[0][0] * a[1][2]) * inv_det,
        ],
        [
            (a[1][0] * a[2][1] - a[1][1] * a[2][0]) * inv_det,
            (a[0][1] * a[2][0] - a[0][0] * a[2][1]) * inv_det,
            (a[0][0] * a[1][1] - a[0][1] * a[1][0]) * inv_det,
        ],
    ];

    Some([
        -(inv[0][0] * b[0] + inv[0][1] * b[1] + inv[0][2] * b[2]),
        -(inv[1][0] * b[0] + inv[1][1] * b[1] + inv[1][2] * b[2]),
        -(inv[2][0] * b[0] + inv[2][1] * b[1] + inv[2][2] * b[2]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Joint, JointAngles};
    use crate::ik::base_yaw;
    use crate::world::WorldModel;
    use approx::assert_relative_eq;

    fn solver() -> NonlinearSolver {
        NonlinearSolver::new(&ArmConfig::default(), NonlinearConfig::default())
    }

    #[test]
    fn test_solves_default_cube() {
        let solution = solver().solve(2.0, 1.0).unwrap();
        assert!(solution.converged);
        assert!(solution.error < 1e-6);
        assert_relative_eq!(
            solution.shoulder + solution.elbow + solution.wrist,
            0.0,
            epsilon = 1e-6
        );
        // Elbow-up branch near the initial guess
        assert!(solution.shoulder > -40.0 && solution.shoulder < 0.0);
    }

    #[test]
    fn test_solution_places_gripper_through_forward_kinematics() {
        let (x, y) = (2.0, 1.0);
        let solution = solver().solve(x, y).unwrap();

        let mut angles = JointAngles::zero();
        for (joint, value) in solution.to_joint_targets(base_yaw(x, y)) {
            angles.set(joint, value);
        }
        angles.set(Joint::Gripper, 0.0);

        let mut world = WorldModel::new(ArmConfig::default());
        world.set_angles(angles);
        let tip = world.gripper_position();
        assert_relative_eq!(tip.x, x, epsilon = 1e-5);
        assert_relative_eq!(tip.y, y, epsilon = 1e-5);
        assert_relative_eq!(tip.z, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_pure_gauss_newton_also_solves() {
        let solver = NonlinearSolver::new(
            &ArmConfig::default(),
            NonlinearConfig::default().without_lm(),
        );
        let solution = solver.solve(1.5, -1.31).unwrap();
        assert!(solution.converged);
    }

    #[test]
    fn test_unreachable_returns_best_effort() {
        let solution = solver().solve(10.0, 0.0).unwrap();
        assert!(!solution.converged);
        assert!(solution.error > 1.0);
    }

    #[test]
    fn test_solve_3x3_identity() {
        let a = [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 4.0]];
        let x = solve_3x3(&a, &[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(x, [-1.0, -1.0, -1.0]);
        assert!(solve_3x3(&[[0.0; 3]; 3], &[1.0, 1.0, 1.0]).is_none());
    }
}
