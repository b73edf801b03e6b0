//! Error types for the world simulator

use crate::protocol::ProtocolError;
use arm_kinematics::KinematicsError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// World simulator error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (socket, config file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed wire message
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Payload (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid arm geometry or joint values
    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
