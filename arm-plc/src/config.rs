//! Configuration loading for the PLC bridge

use crate::error::{PlcError, Result};
use arm_kinematics::ArmConfig;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlcConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub world: WorldLinkConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub hmi: HmiConfig,
    /// Arm geometry the IK solvers plan against
    #[serde(default)]
    pub arm: ArmConfig,
}

/// Identity presented to the world simulator
#[derive(Clone, Debug, Deserialize)]
pub struct DeviceConfig {
    /// Device id sent in the login handshake (default: PLC-01)
    #[serde(default = "default_plc_id")]
    pub plc_id: String,
}

/// World simulator endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct WorldLinkConfig {
    /// Simulator IP address (default: 127.0.0.1)
    #[serde(default = "default_world_ip")]
    pub ip: String,

    /// Simulator UDP port (default: 3001)
    #[serde(default = "default_world_port")]
    pub port: u16,

    /// Reply timeout in milliseconds (default: 1000)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Sync loop cadence
#[derive(Clone, Debug, Deserialize)]
pub struct SyncConfig {
    /// Sync tick period in milliseconds (default: 400)
    #[serde(default = "default_interval")]
    pub interval_ms: u64,

    /// Reconnect ticks between login attempts while offline (default: 15)
    #[serde(default = "default_reconnect_count")]
    pub reconnect_count: u32,

    /// Reconnect tick period in milliseconds (default: 1000)
    #[serde(default = "default_reconnect_tick")]
    pub reconnect_tick_ms: u64,
}

/// Variable store layout
#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    /// Namespace the arm object lives in (default: RobotArmPLC)
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Object holding the arm variables (default: RobotArmCtrl)
    #[serde(default = "default_object")]
    pub object: String,
}

/// IK strategy used by the HMI auto-grab
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IkStrategyKind {
    /// Exhaustive grid search
    Grid,
    /// Levenberg-Marquardt solve
    #[default]
    Nonlinear,
}

/// HMI settings
#[derive(Clone, Debug, Deserialize)]
pub struct HmiConfig {
    /// IK strategy for auto-grab (default: nonlinear)
    #[serde(default)]
    pub ik_strategy: IkStrategyKind,

    /// Grid search step in degrees (default: 5.0)
    #[serde(default = "default_grid_step")]
    pub grid_step_deg: f64,

    /// Gripper height targeted by the nonlinear solver (default: 0.5)
    #[serde(default = "default_grasp_height")]
    pub grasp_height: f64,

    /// Opening written before a grab, percent (default: 10.0)
    #[serde(default = "default_grip_opening")]
    pub grip_opening: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            plc_id: default_plc_id(),
        }
    }
}

impl Default for WorldLinkConfig {
    fn default() -> Self {
        Self {
            ip: default_world_ip(),
            port: default_world_port(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            reconnect_count: default_reconnect_count(),
            reconnect_tick_ms: default_reconnect_tick(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            object: default_object(),
        }
    }
}

impl Default for HmiConfig {
    fn default() -> Self {
        Self {
            ik_strategy: IkStrategyKind::default(),
            grid_step_deg: default_grid_step(),
            grasp_height: default_grasp_height(),
            grip_opening: default_grip_opening(),
        }
    }
}

// Default value functions
fn default_plc_id() -> String {
    "PLC-01".to_string()
}
fn default_world_ip() -> String {
    "127.0.0.1".to_string()
}
fn default_world_port() -> u16 {
    3001
}
fn default_timeout() -> u64 {
    1000
}
fn default_interval() -> u64 {
    400
}
fn default_reconnect_count() -> u32 {
    15
}
fn default_reconnect_tick() -> u64 {
    1000
}
fn default_namespace() -> String {
    "RobotArmPLC".to_string()
}
fn default_object() -> String {
    "RobotArmCtrl".to_string()
}
fn default_grid_step() -> f64 {
    5.0
}
fn default_grasp_height() -> f64 {
    0.5
}
fn default_grip_opening() -> f64 {
    10.0
}

impl PlcConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlcError::Config(format!("Failed to read config file: {}", e)))?;
        let config: PlcConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the loops cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sync.interval_ms == 0 || self.sync.reconnect_tick_ms == 0 {
            return Err(PlcError::Config(
                "sync intervals must be positive".to_string(),
            ));
        }
        if self.hmi.grid_step_deg.is_nan() || self.hmi.grid_step_deg <= 0.0 {
            return Err(PlcError::Config(format!(
                "grid_step_deg must be positive, got {}",
                self.hmi.grid_step_deg
            )));
        }
        self.arm
            .validate()
            .map_err(|e| PlcError::Config(e.to_string()))
    }

    /// Simulator address string
    pub fn world_address(&self) -> String {
        format!("{}:{}", self.world.ip, self.world.port)
    }
}
