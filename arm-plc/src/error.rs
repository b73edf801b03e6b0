//! Error types for the PLC bridge

use crate::hmi::HmiError;
use crate::store::StoreError;
use arm_world::protocol::ProtocolError;
use thiserror::Error;

/// PLC bridge error type
#[derive(Error, Debug)]
pub enum PlcError {
    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Variable store error: {0}")]
    Store(#[from] StoreError),

    #[error("HMI error: {0}")]
    Hmi(#[from] HmiError),
}

impl From<ProtocolError> for PlcError {
    fn from(e: ProtocolError) -> Self {
        PlcError::Protocol(e.to_string())
    }
}

impl From<serde_json::Error> for PlcError {
    fn from(e: serde_json::Error) -> Self {
        PlcError::Protocol(e.to_string())
    }
}

impl From<toml::de::Error> for PlcError {
    fn from(e: toml::de::Error) -> Self {
        PlcError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlcError>;
