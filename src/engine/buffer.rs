//! Audio Buffer Management
//!
//! Planar audio buffer handed to the processor once per audio block.

use crate::error::{HighpassError, Result};

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Audio buffer processed in place by the effect
///
/// Stores audio as non-interleaved 32-bit floating point samples.
/// Each channel is a separate Vec<f32> and all channels have equal length.
///
/// # Example
/// ```
/// use enhanced_highpass::engine::{AudioBuffer, ChannelLayout};
///
/// let buffer = AudioBuffer::new(256, ChannelLayout::Stereo);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_samples(), 256);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    samples: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Create a new silent buffer with the specified number of samples and layout
    pub fn new(num_samples: usize, layout: ChannelLayout) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; layout.num_channels()],
        }
    }

    /// Create a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// Returns `UnsupportedLayout` when the channel count is not mono or stereo,
    /// and `InvalidBlockSize` when the channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self> {
        if ChannelLayout::from_count(channels.len()).is_none() {
            return Err(HighpassError::UnsupportedLayout {
                input: channels.len(),
                output: channels.len(),
            });
        }

        let len = channels[0].len();
        if let Some(mismatch) = channels.iter().find(|ch| ch.len() != len) {
            return Err(HighpassError::InvalidBlockSize {
                size: mismatch.len(),
            });
        }

        Ok(Self { samples: channels })
    }

    /// Get the number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty (no samples)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Channel layout of this buffer, if it is mono or stereo
    pub fn channel_layout(&self) -> Option<ChannelLayout> {
        ChannelLayout::from_count(self.num_channels())
    }

    /// Get a read-only slice of a channel
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Get a mutable slice of a channel
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Mutable access to all channels at once
    ///
    /// Crate-internal so callers outside cannot change channel lengths.
    #[inline]
    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.samples
    }

    /// Get a single sample, or None when out of range
    pub fn get_sample(&self, channel: usize, index: usize) -> Option<f32> {
        self.samples.get(channel)?.get(index).copied()
    }

    /// Set a single sample. Returns false when out of range.
    pub fn set_sample(&mut self, channel: usize, index: usize, value: f32) -> bool {
        match self.samples.get_mut(channel).and_then(|ch| ch.get_mut(index)) {
            Some(sample) => {
                *sample = value;
                true
            }
            None => false,
        }
    }

    /// Check that no sample is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|channel| channel.iter())
            .all(|s| s.is_finite())
    }

    /// Consume the buffer and return the per-channel sample vectors
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.samples
    }
}
