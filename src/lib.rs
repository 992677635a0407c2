//! Enhanced Highpass - smoothed resonant highpass audio effect
//!
//! A single-stream (mono or stereo) real-time effect: a parameter-automatable
//! resonant highpass biquad with gain staging, dithered output and dry/wet
//! blending.
//!
//! # Architecture
//!
//! Signal flow per block:
//! - Dry capture (mixer)
//! - Highpass filter with per-sample coefficients from smoothed cutoff and Q
//! - Gain stage driven by a smoothed dB value
//! - Xorshift dither, one state per channel
//! - Dry/wet blend at a block-rate proportion
//!
//! The host shell owns a shared [`HighpassParams`] container, drives the
//! [`Effect`] lifecycle and persists the blob from [`Effect::save_state`].
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use enhanced_highpass::{AudioBuffer, ChannelLayout, Effect, HighpassParams,
//!     HighpassProcessor, ParamId, StreamSpec};
//!
//! let params = Arc::new(HighpassParams::new());
//! let mut processor = HighpassProcessor::new(Arc::clone(&params));
//! processor.prepare(StreamSpec::stereo(48000.0, 512)).unwrap();
//!
//! params.set_value(ParamId::Cutoff, 800.0);
//! let mut buffer = AudioBuffer::new(512, ChannelLayout::Stereo);
//! processor.process_block(&mut buffer);
//! ```

pub mod config;
pub mod dsp;
pub mod effect;
pub mod engine;
pub mod error;
pub mod params;
pub mod processor;
pub mod state;

pub use config::HighpassConfig;
pub use effect::{Effect, StreamSpec};
pub use engine::{AudioBuffer, ChannelLayout};
pub use error::{HighpassError, Result};
pub use params::{HighpassParams, ParamId, ParameterInfo, ParameterRange, PARAMETER_INFOS};
pub use processor::HighpassProcessor;
pub use state::ParameterSnapshot;
