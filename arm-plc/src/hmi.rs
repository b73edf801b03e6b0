//! HMI controller: operator commands and autonomous grasping
//!
//! The HMI only ever writes target variables. Sensor variables are read back
//! from the store as published by the sync loop.

use crate::config::{IkStrategyKind, PlcConfig};
use crate::error::{PlcError, Result};
use crate::store::{RoleWriter, StoreError, VariableName, WriterRole};
use arm_kinematics::{
    GridSearch, IkSolution, IkStrategy, JOINT_COUNT, Joint, JointAngles, NonlinearConfig,
    NonlinearSolver, Point3, base_yaw, within_envelope,
};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// HMI command errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HmiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Target ({x:.2}, {y:.2}) is out of reach")]
    Unreachable { x: f64, y: f64 },

    #[error("HMI needs a target-role store handle")]
    ReadOnlyHandle,
}

/// Everything the operator panel shows
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HmiSnapshot {
    pub cube: Point3,
    /// Measured θ1..θ6
    pub angles: [f64; JOINT_COUNT],
    /// Commanded θ1..θ6
    pub targets: [f64; JOINT_COUNT],
    /// Grab requested
    pub gripper: bool,
}

impl HmiSnapshot {
    /// True when every measured channel is within `tolerance` of its target
    pub fn at_target(&self, tolerance: f64) -> bool {
        self.angles
            .iter()
            .zip(&self.targets)
            .all(|(a, t)| (a - t).abs() <= tolerance)
    }
}

/// One step of a scripted task
///
/// Stored as JSON objects tagged by `act`:
/// `{"act":"RST"}`, `{"act":"MOV","key":"elbw","val":"90"}`,
/// `{"act":"GRP","on":true}`, `{"act":"AUTO"}`, `{"act":"WAIT","ms":500}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "act")]
pub enum ScenarioAction {
    #[serde(rename = "RST")]
    Reset,
    #[serde(rename = "MOV")]
    Move {
        #[serde(rename = "key")]
        joint: Joint,
        #[serde(rename = "val", deserialize_with = "number_or_string")]
        value: f64,
    },
    #[serde(rename = "GRP")]
    Gripper {
        #[serde(rename = "on")]
        closed: bool,
    },
    #[serde(rename = "AUTO")]
    AutoGrab,
    #[serde(rename = "WAIT")]
    Wait { ms: u64 },
}

/// Scenario files write values either as numbers or as numeric strings
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Load a scenario file (a JSON array of actions)
pub fn load_scenario(path: &Path) -> Result<Vec<ScenarioAction>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PlcError::Config(format!("Failed to read scenario file: {}", e)))?;
    Ok(serde_json::from_str(&content)?)
}

/// Operator-side logic on top of the variable store
pub struct HmiController {
    store: RoleWriter,
    ik: Box<dyn IkStrategy>,
    grip_opening: f64,
}

impl HmiController {
    pub fn new(
        store: RoleWriter,
        ik: Box<dyn IkStrategy>,
        grip_opening: f64,
    ) -> std::result::Result<Self, HmiError> {
        if store.role() != WriterRole::Target {
            return Err(HmiError::ReadOnlyHandle);
        }
        Ok(Self {
            store,
            ik,
            grip_opening: Joint::Gripper.clamp(grip_opening),
        })
    }

    /// Build with the IK strategy selected in the config
    pub fn from_config(
        store: RoleWriter,
        config: &PlcConfig,
    ) -> std::result::Result<Self, HmiError> {
        let ik: Box<dyn IkStrategy> = match config.hmi.ik_strategy {
            IkStrategyKind::Grid => {
                Box::new(GridSearch::new(&config.arm, config.hmi.grid_step_deg))
            }
            IkStrategyKind::Nonlinear => Box::new(NonlinearSolver::new(
                &config.arm,
                NonlinearConfig::default().with_grasp_height(config.hmi.grasp_height),
            )),
        };
        tracing::info!("HMI using {} IK", ik.name());
        Self::new(store, ik, config.hmi.grip_opening)
    }

    /// Read every sensor and target variable
    pub fn snapshot(&self) -> std::result::Result<HmiSnapshot, HmiError> {
        let mut cube = [0.0; 3];
        for (slot, name) in cube.iter_mut().zip(VariableName::CUBE_POS) {
            *slot = self.store.read_f64(name)?;
        }
        let mut angles = [0.0; JOINT_COUNT];
        for (slot, name) in angles.iter_mut().zip(VariableName::ARM_ANGLES) {
            *slot = self.store.read_f64(name)?;
        }
        let mut targets = [0.0; JOINT_COUNT];
        for (slot, name) in targets.iter_mut().zip(VariableName::MOTOR_CTRL) {
            *slot = self.store.read_f64(name)?;
        }
        Ok(HmiSnapshot {
            cube: Point3::from(cube),
            angles,
            targets,
            gripper: self.store.read_bool(VariableName::GripperCtrl)?,
        })
    }

    /// Command one joint; returns the value written after clamping
    pub fn set_target(&self, joint: Joint, value: f64) -> std::result::Result<f64, HmiError> {
        let value = joint.clamp(value);
        self.store.write(VariableName::motor(joint), value)?;
        tracing::debug!("Target {} -> {:.1}", joint.name(), value);
        Ok(value)
    }

    /// Request a grab (true) or release (false)
    pub fn set_gripper(&self, closed: bool) -> std::result::Result<(), HmiError> {
        self.store.write(VariableName::GripperCtrl, closed)?;
        Ok(())
    }

    /// Release and drive back to the power-on pose
    pub fn reset(&self) -> std::result::Result<(), HmiError> {
        self.set_gripper(false)?;
        for (joint, value) in JointAngles::default().iter() {
            self.set_target(joint, value)?;
        }
        tracing::info!("HMI reset to default pose");
        Ok(())
    }

    /// Aim the arm over the cube and close the gripper opening
    ///
    /// The grab itself is a separate [`set_gripper`](Self::set_gripper) once
    /// the arm has arrived. Targets are left untouched when the cube is out
    /// of reach.
    pub fn auto_grab(&self) -> std::result::Result<IkSolution, HmiError> {
        let snapshot = self.snapshot()?;
        let (x, y) = (snapshot.cube.x, snapshot.cube.y);
        if !within_envelope(x, y) {
            tracing::warn!("Cube at ({:.2}, {:.2}) is outside the arm envelope", x, y);
            return Err(HmiError::Unreachable { x, y });
        }

        let Some(solution) = self.ik.solve(x, y) else {
            tracing::warn!("{} IK found no pose for ({:.2}, {:.2})", self.ik.name(), x, y);
            return Err(HmiError::Unreachable { x, y });
        };
        if !solution.converged {
            tracing::warn!(
                "{} IK did not converge, using best effort (error {:.4})",
                self.ik.name(),
                solution.error
            );
        }

        for (joint, value) in solution.to_joint_targets(base_yaw(x, y)) {
            self.set_target(joint, value)?;
        }
        self.set_target(Joint::Gripper, self.grip_opening)?;
        tracing::info!(
            "Auto-grab targets for cube at ({:.2}, {:.2}): shoulder {:.1}, elbow {:.1}, wrist {:.1}",
            x,
            y,
            solution.shoulder,
            solution.elbow,
            solution.wrist
        );
        Ok(solution)
    }

    /// Execute scripted actions in order, stopping at the first failure
    pub fn run_scenario(&self, actions: &[ScenarioAction]) -> std::result::Result<(), HmiError> {
        for (step, action) in actions.iter().enumerate() {
            tracing::debug!("Scenario step {}: {:?}", step, action);
            match action {
                ScenarioAction::Reset => self.reset()?,
                ScenarioAction::Move { joint, value } => {
                    self.set_target(*joint, *value)?;
                }
                ScenarioAction::Gripper { closed } => self.set_gripper(*closed)?,
                ScenarioAction::AutoGrab => {
                    self.auto_grab()?;
                }
                ScenarioAction::Wait { ms } => std::thread::sleep(Duration::from_millis(*ms)),
            }
        }
        Ok(())
    }
}
