//! Error types for arm-kinematics

/// Result type alias
pub type Result<T> = std::result::Result<T, KinematicsError>;

/// Kinematics error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KinematicsError {
    /// Wrong number of joint values
    #[error("Expected {expected} joint values, got {actual}")]
    AngleCount {
        /// Number of channels the arm has
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// NaN or infinite joint value
    #[error("Joint value for {joint} is not finite: {value}")]
    NonFinite {
        /// Joint name
        joint: &'static str,
        /// Offending value
        value: f64,
    },

    /// Invalid geometry or solver parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
