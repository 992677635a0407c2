//! Effect trait definition
//!
//! The narrow capability a host shell needs from an audio effect: lifecycle
//! hooks, the per-block entry point, parameter access and state persistence.

use crate::engine::{AudioBuffer, ChannelLayout};
use crate::error::{HighpassError, Result};
use crate::params::{ParamId, ParameterInfo};

/// Stream configuration negotiated by the host at stream start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSpec {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Largest block the host will pass to `process_block`
    pub max_block_size: usize,
    /// Number of input channels on the main bus
    pub input_channels: usize,
    /// Number of output channels on the main bus
    pub output_channels: usize,
}

impl StreamSpec {
    /// Matched input/output stream with the given layout
    pub fn new(sample_rate: f64, max_block_size: usize, layout: ChannelLayout) -> Self {
        Self {
            sample_rate,
            max_block_size,
            input_channels: layout.num_channels(),
            output_channels: layout.num_channels(),
        }
    }

    /// Matched stereo stream
    pub fn stereo(sample_rate: f64, max_block_size: usize) -> Self {
        Self::new(sample_rate, max_block_size, ChannelLayout::Stereo)
    }

    /// Matched mono stream
    pub fn mono(sample_rate: f64, max_block_size: usize) -> Self {
        Self::new(sample_rate, max_block_size, ChannelLayout::Mono)
    }

    /// Check the stream is one the effect can run
    ///
    /// Only mono or stereo with matched input and output is accepted.
    pub fn validate(&self) -> Result<ChannelLayout> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(HighpassError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            });
        }

        if self.max_block_size == 0 {
            return Err(HighpassError::InvalidBlockSize {
                size: self.max_block_size,
            });
        }

        if self.input_channels != self.output_channels {
            return Err(HighpassError::UnsupportedLayout {
                input: self.input_channels,
                output: self.output_channels,
            });
        }

        ChannelLayout::from_count(self.output_channels).ok_or(HighpassError::UnsupportedLayout {
            input: self.input_channels,
            output: self.output_channels,
        })
    }
}

/// Base trait for audio effects driven by a host shell
///
/// `process_block` runs on the real-time thread and must never allocate,
/// lock, block or fail. Everything else runs on host threads.
pub trait Effect: Send + Sync {
    /// Display name of the effect
    fn name(&self) -> &'static str;

    /// Seconds of output the effect keeps producing after input stops
    fn tail_length_seconds(&self) -> f64 {
        0.0
    }

    /// Processing latency in samples
    fn latency_samples(&self) -> usize {
        0
    }

    /// Allocate per-stream state; called on stream start
    ///
    /// Rejects unsupported stream configurations before any processing.
    fn prepare(&mut self, spec: StreamSpec) -> Result<()>;

    /// Drop per-stream state; called on stream stop
    fn release(&mut self);

    /// Clear runtime state (filter history, ramps) without reallocating
    fn reset(&mut self);

    /// Process one audio block in place
    fn process_block(&mut self, buffer: &mut AudioBuffer);

    /// Metadata for every parameter, in registration order
    fn parameter_infos(&self) -> &'static [ParameterInfo];

    /// Current plain value of a parameter
    fn get_parameter(&self, id: ParamId) -> f32;

    /// Set a plain value (clamped to the parameter's range)
    fn set_parameter(&self, id: ParamId, value: f32);

    /// Serialize the parameter values into an opaque blob
    fn save_state(&self) -> Result<Vec<u8>>;

    /// Restore parameter values from a blob produced by `save_state`
    ///
    /// Never fails observably; malformed data restores defaults.
    fn load_state(&mut self, data: &[u8]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_spec_accepts_mono_and_stereo() {
        assert_eq!(
            StreamSpec::stereo(48000.0, 512).validate().unwrap(),
            ChannelLayout::Stereo
        );
        assert_eq!(
            StreamSpec::mono(44100.0, 64).validate().unwrap(),
            ChannelLayout::Mono
        );
    }

    #[test]
    fn test_stream_spec_rejects_bad_layouts() {
        let mismatched = StreamSpec {
            sample_rate: 48000.0,
            max_block_size: 512,
            input_channels: 1,
            output_channels: 2,
        };
        assert_eq!(
            mismatched.validate().unwrap_err().error_code(),
            "UNSUPPORTED_LAYOUT"
        );

        let surround = StreamSpec {
            input_channels: 6,
            output_channels: 6,
            ..mismatched
        };
        assert!(surround.validate().is_err());

        let silent = StreamSpec {
            input_channels: 0,
            output_channels: 0,
            ..mismatched
        };
        assert!(silent.validate().is_err());
    }

    #[test]
    fn test_stream_spec_rejects_bad_rates_and_sizes() {
        let err = StreamSpec::stereo(0.0, 512).validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SAMPLE_RATE");
        assert!(StreamSpec::stereo(f64::NAN, 512).validate().is_err());

        let err = StreamSpec::stereo(48000.0, 0).validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BLOCK_SIZE");
    }
}
