//! Variable names, values and writer roles

use arm_kinematics::{JOINT_COUNT, Joint};
use std::fmt;

/// Who is allowed to write a variable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterRole {
    /// Sync loop: measured state mirrored from the simulator
    Sensor,
    /// HMI: commanded targets
    Target,
}

impl fmt::Display for WriterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterRole::Sensor => f.write_str("sensor"),
            WriterRole::Target => f.write_str("target"),
        }
    }
}

/// Every variable the arm object carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableName {
    CubePosX,
    CubePosY,
    CubePosZ,
    ArmAngle1,
    ArmAngle2,
    ArmAngle3,
    ArmAngle4,
    ArmAngle5,
    ArmAngle6,
    Motor1Ctrl,
    Motor2Ctrl,
    Motor3Ctrl,
    Motor4Ctrl,
    Motor5Ctrl,
    Motor6Ctrl,
    GripperCtrl,
}

impl VariableName {
    /// Cube center, x/y/z
    pub const CUBE_POS: [VariableName; 3] = [
        VariableName::CubePosX,
        VariableName::CubePosY,
        VariableName::CubePosZ,
    ];

    /// Measured joint angles in wire order
    pub const ARM_ANGLES: [VariableName; JOINT_COUNT] = [
        VariableName::ArmAngle1,
        VariableName::ArmAngle2,
        VariableName::ArmAngle3,
        VariableName::ArmAngle4,
        VariableName::ArmAngle5,
        VariableName::ArmAngle6,
    ];

    /// Joint targets in wire order
    pub const MOTOR_CTRL: [VariableName; JOINT_COUNT] = [
        VariableName::Motor1Ctrl,
        VariableName::Motor2Ctrl,
        VariableName::Motor3Ctrl,
        VariableName::Motor4Ctrl,
        VariableName::Motor5Ctrl,
        VariableName::Motor6Ctrl,
    ];

    /// Registration order
    pub const ALL: [VariableName; 16] = [
        VariableName::CubePosX,
        VariableName::CubePosY,
        VariableName::CubePosZ,
        VariableName::ArmAngle1,
        VariableName::ArmAngle2,
        VariableName::ArmAngle3,
        VariableName::ArmAngle4,
        VariableName::ArmAngle5,
        VariableName::ArmAngle6,
        VariableName::Motor1Ctrl,
        VariableName::Motor2Ctrl,
        VariableName::Motor3Ctrl,
        VariableName::Motor4Ctrl,
        VariableName::Motor5Ctrl,
        VariableName::Motor6Ctrl,
        VariableName::GripperCtrl,
    ];

    /// Name as registered in the store
    pub fn as_str(self) -> &'static str {
        match self {
            VariableName::CubePosX => "cubePosX",
            VariableName::CubePosY => "cubePosY",
            VariableName::CubePosZ => "cubePosZ",
            VariableName::ArmAngle1 => "armAngle1",
            VariableName::ArmAngle2 => "armAngle2",
            VariableName::ArmAngle3 => "armAngle3",
            VariableName::ArmAngle4 => "armAngle4",
            VariableName::ArmAngle5 => "armAngle5",
            VariableName::ArmAngle6 => "armAngle6",
            VariableName::Motor1Ctrl => "motor1Ctrl",
            VariableName::Motor2Ctrl => "motor2Ctrl",
            VariableName::Motor3Ctrl => "motor3Ctrl",
            VariableName::Motor4Ctrl => "motor4Ctrl",
            VariableName::Motor5Ctrl => "motor5Ctrl",
            VariableName::Motor6Ctrl => "motor6Ctrl",
            VariableName::GripperCtrl => "gripperCtrl",
        }
    }

    /// Role allowed to write this variable
    pub fn role(self) -> WriterRole {
        match self {
            VariableName::CubePosX
            | VariableName::CubePosY
            | VariableName::CubePosZ
            | VariableName::ArmAngle1
            | VariableName::ArmAngle2
            | VariableName::ArmAngle3
            | VariableName::ArmAngle4
            | VariableName::ArmAngle5
            | VariableName::ArmAngle6 => WriterRole::Sensor,
            _ => WriterRole::Target,
        }
    }

    /// Value the variable is registered with
    pub fn initial(self) -> Value {
        match self {
            VariableName::GripperCtrl => Value::Bool(false),
            _ => Value::Float(0.0),
        }
    }

    /// Target variable driving `joint`
    pub fn motor(joint: Joint) -> VariableName {
        Self::MOTOR_CTRL[joint.index()]
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Float(f64),
    Bool(bool),
}

impl Value {
    /// Type name used in errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            Value::Float(_) => None,
        }
    }

    pub(crate) fn same_type(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        for name in VariableName::CUBE_POS.iter().chain(&VariableName::ARM_ANGLES) {
            assert_eq!(name.role(), WriterRole::Sensor);
        }
        for name in VariableName::MOTOR_CTRL {
            assert_eq!(name.role(), WriterRole::Target);
        }
        assert_eq!(VariableName::GripperCtrl.role(), WriterRole::Target);
    }

    #[test]
    fn test_names_and_initials() {
        assert_eq!(VariableName::Motor3Ctrl.as_str(), "motor3Ctrl");
        assert_eq!(VariableName::motor(Joint::WristPitch), VariableName::Motor4Ctrl);
        assert_eq!(VariableName::GripperCtrl.initial(), Value::Bool(false));
        assert_eq!(VariableName::CubePosZ.initial(), Value::Float(0.0));
    }
}
