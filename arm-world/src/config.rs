//! Configuration for the world simulator
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) gives a working simulator on `0.0.0.0:3001`.

use crate::error::{Error, Result};
use arm_kinematics::{ArmConfig, ControlMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level simulator configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorldConfig {
    /// UDP endpoint settings
    #[serde(default)]
    pub network: NetworkConfig,
    /// Physics loop settings
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Arm geometry and cube physics
    #[serde(default)]
    pub arm: ArmConfig,
}

/// UDP endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Bind address for the request/reply socket
    ///
    /// Examples:
    /// - `0.0.0.0:3001` - All interfaces
    /// - `127.0.0.1:3001` - Localhost only
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Socket read timeout in milliseconds; bounds shutdown latency
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Physics loop settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Physics tick period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Maximum joint change per tick in automatic mode (degrees)
    #[serde(default = "default_motor_deg_speed")]
    pub motor_deg_speed: f64,

    /// `automatic` interpolates toward requests, `manual` jumps
    #[serde(default)]
    pub mode: ControlMode,
}

fn default_bind_address() -> String {
    "0.0.0.0:3001".to_string()
}
fn default_read_timeout_ms() -> u64 {
    200
}
fn default_tick_ms() -> u64 {
    100
}
fn default_motor_deg_speed() -> f64 {
    5.0
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            motor_deg_speed: default_motor_deg_speed(),
            mode: ControlMode::default(),
        }
    }
}

impl WorldConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: WorldConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the simulator cannot run with
    pub fn validate(&self) -> Result<()> {
        self.arm.validate()?;
        if self.simulation.tick_ms == 0 {
            return Err(Error::Config("simulation.tick_ms must be > 0".to_string()));
        }
        let speed = self.simulation.motor_deg_speed;
        if speed.is_nan() || speed <= 0.0 {
            return Err(Error::Config(format!(
                "simulation.motor_deg_speed must be > 0, got {}",
                speed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorldConfig::default();
        assert_eq!(config.network.bind_address, "0.0.0.0:3001");
        assert_eq!(config.simulation.mode, ControlMode::Automatic);
        assert_eq!(config.arm.grab_radius, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[network]
bind_address = "127.0.0.1:4001"

[simulation]
tick_ms = 50
mode = "manual"

[arm]
cube_start = [1.0, -1.0, 0.5]
"#;
        let config: WorldConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.network.bind_address, "127.0.0.1:4001");
        assert_eq!(config.network.read_timeout_ms, 200);
        assert_eq!(config.simulation.tick_ms, 50);
        assert_eq!(config.simulation.motor_deg_speed, 5.0);
        assert_eq!(config.simulation.mode, ControlMode::Manual);
        assert_eq!(config.arm.cube_start, [1.0, -1.0, 0.5]);
        assert_eq!(config.arm.upper_arm, 1.5);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: WorldConfig = toml::from_str("").unwrap();
        assert_eq!(config.simulation.tick_ms, 100);
    }

    #[test]
    fn test_rejects_zero_speed() {
        let mut config = WorldConfig::default();
        config.simulation.motor_deg_speed = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
