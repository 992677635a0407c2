//! Parameter state persistence
//!
//! The host stores an opaque blob and hands it back on session restore. Only
//! the four parameter values are persisted; smoother, filter and dither state
//! always start fresh at stream start.
//!
//! Blob layout (JSON):
//! ```json
//! {
//!   "plugin": "EnhancedHighpass",
//!   "version": 1,
//!   "parameters": { "cutoff": 200.0, "q": 0.707, "gain": 0.0, "wetdry": 1.0 },
//!   "checksum": "<sha256 hex of the serialized parameters object>"
//! }
//! ```
//! Version 0 blobs are a bare parameters object without envelope or checksum.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{HighpassError, Result};
use crate::params::{ParamId, ParameterInfo};

/// Plugin identifier written into every blob
pub const PLUGIN_ID: &str = "EnhancedHighpass";

/// Current state blob version
pub const CURRENT_STATE_VERSION: u32 = 1;

/// The four persisted parameter values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub cutoff: f32,
    pub q: f32,
    pub gain: f32,
    pub wetdry: f32,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            cutoff: ParameterInfo::for_id(ParamId::Cutoff).default,
            q: ParameterInfo::for_id(ParamId::Q).default,
            gain: ParameterInfo::for_id(ParamId::Gain).default,
            wetdry: ParameterInfo::for_id(ParamId::WetDry).default,
        }
    }
}

impl ParameterSnapshot {
    /// Value of one parameter
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Cutoff => self.cutoff,
            ParamId::Q => self.q,
            ParamId::Gain => self.gain,
            ParamId::WetDry => self.wetdry,
        }
    }

    /// Copy with every value clamped into its parameter range
    pub fn clamped(&self) -> Self {
        let clamp = |id: ParamId| ParameterInfo::for_id(id).range.clamp(self.get(id));
        Self {
            cutoff: clamp(ParamId::Cutoff),
            q: clamp(ParamId::Q),
            gain: clamp(ParamId::Gain),
            wetdry: clamp(ParamId::WetDry),
        }
    }
}

/// Versioned envelope around the persisted parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateEnvelope {
    plugin: String,
    version: u32,
    parameters: ParameterSnapshot,
    checksum: String,
}

/// SHA-256 hex digest of the canonical parameters encoding
fn checksum(parameters: &ParameterSnapshot) -> Result<String> {
    let bytes = serde_json::to_vec(parameters)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Serialize parameter values into a state blob
pub fn encode_state(parameters: &ParameterSnapshot) -> Result<Vec<u8>> {
    let envelope = StateEnvelope {
        plugin: PLUGIN_ID.to_string(),
        version: CURRENT_STATE_VERSION,
        parameters: *parameters,
        checksum: checksum(parameters)?,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode a state blob into clamped parameter values
///
/// # Errors
/// Fails on malformed JSON, a foreign plugin id, a version newer than
/// `CURRENT_STATE_VERSION`, or a checksum mismatch.
pub fn decode_state(data: &[u8]) -> Result<ParameterSnapshot> {
    if data.is_empty() {
        return Err(HighpassError::InvalidState {
            reason: "empty state blob".to_string(),
        });
    }

    let value: Value = serde_json::from_slice(data)?;
    let envelope = migrate_state(value)?;

    if envelope.plugin != PLUGIN_ID {
        return Err(HighpassError::InvalidState {
            reason: format!("state belongs to plugin '{}'", envelope.plugin),
        });
    }

    let expected = checksum(&envelope.parameters)?;
    if expected != envelope.checksum {
        return Err(HighpassError::StateChecksumMismatch {
            expected,
            found: envelope.checksum,
        });
    }

    let parameters = envelope.parameters;
    if ParamId::ALL.iter().any(|&id| !parameters.get(id).is_finite()) {
        return Err(HighpassError::InvalidState {
            reason: "non-finite parameter value".to_string(),
        });
    }

    Ok(parameters.clamped())
}

/// Bring any supported blob version up to the current envelope
fn migrate_state(value: Value) -> Result<StateEnvelope> {
    let version = match value.get("version") {
        None => 0,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| HighpassError::InvalidState {
                reason: format!("invalid version field: {}", v),
            })?,
    };

    match version {
        0 => {
            // Bare parameters object from before the envelope existed
            let parameters: ParameterSnapshot = serde_json::from_value(value)?;
            Ok(StateEnvelope {
                plugin: PLUGIN_ID.to_string(),
                version: CURRENT_STATE_VERSION,
                checksum: checksum(&parameters)?,
                parameters,
            })
        }
        CURRENT_STATE_VERSION => Ok(serde_json::from_value(value)?),
        other => Err(HighpassError::UnsupportedStateVersion { version: other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> ParameterSnapshot {
        ParameterSnapshot {
            cutoff: 1500.0,
            q: 2.5,
            gain: -6.0,
            wetdry: 0.4,
        }
    }

    #[test]
    fn test_encode_decode() {
        let blob = encode_state(&sample_snapshot()).unwrap();
        assert_eq!(decode_state(&blob).unwrap(), sample_snapshot());
    }

    #[test]
    fn test_blob_contains_envelope() {
        let blob = encode_state(&ParameterSnapshot::default()).unwrap();
        let value: Value = serde_json::from_slice(&blob).unwrap();
        assert_eq!(value["plugin"], PLUGIN_ID);
        assert_eq!(value["version"], CURRENT_STATE_VERSION);
        assert_eq!(value["checksum"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_legacy_bare_object_is_migrated() {
        let blob = br#"{ "cutoff": 900.0, "q": 1.0, "gain": 3.0, "wetdry": 0.5 }"#;
        let snapshot = decode_state(blob).unwrap();
        assert_eq!(snapshot.cutoff, 900.0);
        assert_eq!(snapshot.wetdry, 0.5);
    }

    #[test]
    fn test_tampered_blob_fails_checksum() {
        let blob = encode_state(&sample_snapshot()).unwrap();
        let mut value: Value = serde_json::from_slice(&blob).unwrap();
        value["parameters"]["gain"] = serde_json::json!(12.0);
        let tampered = serde_json::to_vec(&value).unwrap();

        let err = decode_state(&tampered).unwrap_err();
        assert_eq!(err.error_code(), "STATE_CHECKSUM_MISMATCH");
    }

    #[test]
    fn test_rejects_future_version_and_foreign_plugin() {
        let blob = br#"{ "plugin": "EnhancedHighpass", "version": 7 }"#;
        let err = decode_state(blob).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_STATE_VERSION");

        let mut value: Value =
            serde_json::from_slice(&encode_state(&sample_snapshot()).unwrap()).unwrap();
        value["plugin"] = serde_json::json!("SomethingElse");
        let err = decode_state(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(decode_state(b"").is_err());
        assert!(decode_state(b"\x00\x01\x02").is_err());
        assert!(decode_state(br#"{ "cutoff": "loud" }"#).is_err());
        assert!(decode_state(br#"{ "version": -1 }"#).is_err());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let blob = br#"{ "cutoff": 90000.0, "q": 0.0, "gain": -100.0, "wetdry": 2.0 }"#;
        let snapshot = decode_state(blob).unwrap();
        assert_eq!(snapshot.cutoff, 20000.0);
        assert_eq!(snapshot.q, 0.1);
        assert_eq!(snapshot.gain, -24.0);
        assert_eq!(snapshot.wetdry, 1.0);
    }
}
