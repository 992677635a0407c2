//! DSP building blocks
//!
//! Leaf components of the highpass signal path. Each is allocation-free once
//! prepared and safe to call from the real-time thread.

mod biquad;
mod dither;
mod gain;
mod mixer;
mod smoother;

pub use biquad::{FilterCoefficients, FilterStage, FilterState};
pub use dither::{
    DitherGenerator, DitherState, DITHER_SCALE, MAX_DITHER_AMPLITUDE, MIN_DITHER_SEED,
};
pub use gain::{db_to_linear, GainStage};
pub use mixer::{DryWetMixer, MixingRule, DEFAULT_MIXER_CAPACITY};
pub use smoother::SmoothedValue;
