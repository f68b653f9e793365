//! Versioned JSON envelopes for saved data
//!
//! Everything written through the storage interface is wrapped in a
//! small envelope carrying a format version, so corrupt or stale blobs
//! are detected on load and degrade to defaults instead of failing.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    payload: serde_json::Value,
}

/// Why a stored blob could not be decoded.
#[derive(Debug)]
pub enum DecodeError {
    Malformed(serde_json::Error),
    VersionMismatch { found: u32, expected: u32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Malformed(e) => write!(f, "malformed envelope: {e}"),
            DecodeError::VersionMismatch { found, expected } => {
                write!(f, "envelope version {found}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Wrap a payload in a versioned envelope.
pub fn encode<T: Serialize>(version: u32, payload: &T) -> Result<String, serde_json::Error> {
    let envelope = Envelope {
        version,
        payload: serde_json::to_value(payload)?,
    };
    serde_json::to_string(&envelope)
}

/// Unwrap a versioned envelope, rejecting other versions.
pub fn decode<T: DeserializeOwned>(expected_version: u32, raw: &str) -> Result<T, DecodeError> {
    let envelope: Envelope = serde_json::from_str(raw).map_err(DecodeError::Malformed)?;
    if envelope.version != expected_version {
        return Err(DecodeError::VersionMismatch {
            found: envelope.version,
            expected: expected_version,
        });
    }
    serde_json::from_value(envelope.payload).map_err(DecodeError::Malformed)
}
