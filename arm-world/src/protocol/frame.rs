//! `KEY;TYPE;JSON` framing

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

/// Malformed wire message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Datagram is not valid UTF-8
    #[error("Message is not valid UTF-8")]
    NotUtf8,

    /// Fewer than three `;`-separated fields
    #[error("Expected 3 fields, got {0}")]
    FieldCount(usize),

    /// KEY is not GET, POST or REP
    #[error("Unknown request key: {0:?}")]
    UnknownKey(String),

    /// TYPE field is empty
    #[error("Empty message type")]
    EmptyType,
}

/// First field of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey {
    /// Read request
    Get,
    /// Write request
    Post,
    /// Reply
    Rep,
}

impl RequestKey {
    /// Wire spelling
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKey::Get => "GET",
            RequestKey::Post => "POST",
            RequestKey::Rep => "REP",
        }
    }
}

impl FromStr for RequestKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(RequestKey::Get),
            "POST" => Ok(RequestKey::Post),
            "REP" => Ok(RequestKey::Rep),
            other => Err(ProtocolError::UnknownKey(other.to_string())),
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One protocol message; the payload is kept as raw JSON text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// GET, POST or REP
    pub key: RequestKey,
    /// Message type, e.g. `armAngle`
    pub kind: String,
    /// JSON payload text
    pub payload: String,
}

impl Message {
    /// Message with a raw payload
    pub fn raw(key: RequestKey, kind: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            key,
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Message with a serialized payload
    pub fn new<T: Serialize>(
        key: RequestKey,
        kind: impl Into<String>,
        payload: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self::raw(key, kind, serde_json::to_string(payload)?))
    }

    /// Parse the payload as `T`
    pub fn payload_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.payload)
    }

    /// Wire form `KEY;TYPE;JSON`
    pub fn encode(&self) -> String {
        format!("{};{};{}", self.key, self.kind, self.payload)
    }

    /// Parse a datagram
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ProtocolError::NotUtf8)?;
        Self::decode_str(text)
    }

    /// Parse a text line, splitting on `;` at most twice
    pub fn decode_str(text: &str) -> Result<Self, ProtocolError> {
        let mut fields = text.splitn(3, ';');
        let (Some(key), Some(kind), Some(payload)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(ProtocolError::FieldCount(text.split(';').count()));
        };
        let key: RequestKey = key.trim().parse()?;
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(ProtocolError::EmptyType);
        }
        Ok(Self::raw(key, kind, payload))
    }
}
