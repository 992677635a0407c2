//! Error handling for the highpass effect
//!
//! Errors only surface at the stream-start, configuration and state-loading
//! boundaries. The block processor itself never produces one.

use thiserror::Error;

/// Result type alias for highpass operations
pub type Result<T> = std::result::Result<T, HighpassError>;

/// Main error type for highpass operations
#[derive(Error, Debug)]
pub enum HighpassError {
    // Stream Errors
    #[error("Unsupported channel layout: {input} in / {output} out (mono or stereo, matched)")]
    UnsupportedLayout { input: usize, output: usize },

    #[error("Invalid sample rate: {sample_rate}")]
    InvalidSampleRate { sample_rate: f64 },

    #[error("Invalid maximum block size: {size}")]
    InvalidBlockSize { size: usize },

    // Configuration Errors
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    // Parameter Errors
    #[error("Unknown parameter: {id}")]
    UnknownParameter { id: String },

    #[error("Dither seed {seed} is below the minimum of {minimum}")]
    InvalidDitherSeed { seed: u32, minimum: u32 },

    #[error("Expected {expected} dither seeds (one per channel), got {found}")]
    DitherSeedCount { expected: usize, found: usize },

    // State Errors
    #[error("Invalid state blob: {reason}")]
    InvalidState { reason: String },

    #[error("State checksum mismatch (expected {expected}, found {found})")]
    StateChecksumMismatch { expected: String, found: String },

    #[error("Unsupported state version: {version}")]
    UnsupportedStateVersion { version: u32 },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HighpassError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            HighpassError::UnsupportedLayout { .. } => "UNSUPPORTED_LAYOUT",
            HighpassError::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            HighpassError::InvalidBlockSize { .. } => "INVALID_BLOCK_SIZE",
            HighpassError::InvalidConfig { .. } => "INVALID_CONFIG",
            HighpassError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            HighpassError::InvalidDitherSeed { .. } => "INVALID_DITHER_SEED",
            HighpassError::DitherSeedCount { .. } => "DITHER_SEED_COUNT",
            HighpassError::InvalidState { .. } => "INVALID_STATE",
            HighpassError::StateChecksumMismatch { .. } => "STATE_CHECKSUM_MISMATCH",
            HighpassError::UnsupportedStateVersion { .. } => "UNSUPPORTED_STATE_VERSION",
            HighpassError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// State errors are recoverable because loading falls back to defaults.
    /// Stream errors need the host to offer a different configuration.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HighpassError::InvalidConfig { .. }
                | HighpassError::InvalidState { .. }
                | HighpassError::StateChecksumMismatch { .. }
                | HighpassError::UnsupportedStateVersion { .. }
                | HighpassError::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = HighpassError::UnsupportedLayout {
            input: 6,
            output: 6,
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_LAYOUT");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_state_errors_are_recoverable() {
        let err = HighpassError::StateChecksumMismatch {
            expected: "ab".to_string(),
            found: "cd".to_string(),
        };
        assert!(err.is_recoverable());

        let err: HighpassError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = HighpassError::InvalidDitherSeed {
            seed: 12,
            minimum: 16386,
        };
        assert_eq!(
            err.to_string(),
            "Dither seed 12 is below the minimum of 16386"
        );

        let err = HighpassError::DitherSeedCount {
            expected: 2,
            found: 1,
        };
        assert_eq!(err.error_code(), "DITHER_SEED_COUNT");
        assert!(!err.is_recoverable());
    }
}
