//! Block processor
//!
//! Orchestrates the highpass signal path once per audio block:
//!
//! 1. read the four parameter targets from the shared parameter container
//! 2. retarget the smoothers
//! 3. capture the dry input
//! 4. per sample: advance cutoff/Q, regenerate and install coefficients,
//!    filter, advance gain and apply it, add dither
//! 5. advance the wet/dry smoother and set the mixer proportion
//! 6. blend the dry signal back in
//!
//! Cutoff, Q and gain are smoothed per sample. Wet/dry is applied at block
//! rate: its smoother advances by the block length and the resulting value is
//! used for the whole block. Blocks longer than the mixer capacity are split
//! into capacity-sized chunks, each running steps 3 to 6.

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::HighpassConfig;
use crate::dsp::{
    DitherGenerator, DitherState, DryWetMixer, FilterCoefficients, FilterStage, GainStage,
    SmoothedValue,
};
use crate::effect::{Effect, StreamSpec};
use crate::engine::{AudioBuffer, ChannelLayout};
use crate::error::{HighpassError, Result};
use crate::params::{HighpassParams, ParamId, ParameterInfo, PARAMETER_INFOS};
use crate::state::{decode_state, encode_state, ParameterSnapshot};

/// Display name reported to the host
pub const EFFECT_NAME: &str = "EnhancedHighpass";

/// One smoother per parameter, advanced in sample lockstep
#[derive(Debug, Clone)]
struct Smoothers {
    cutoff: SmoothedValue,
    q: SmoothedValue,
    gain: SmoothedValue,
    wetdry: SmoothedValue,
}

impl Smoothers {
    fn new(sample_rate: f64, smoothing_seconds: f64, values: &ParameterSnapshot) -> Self {
        let mut smoothers = Self {
            cutoff: SmoothedValue::new(sample_rate, smoothing_seconds),
            q: SmoothedValue::new(sample_rate, smoothing_seconds),
            gain: SmoothedValue::new(sample_rate, smoothing_seconds),
            wetdry: SmoothedValue::new(sample_rate, smoothing_seconds),
        };
        smoothers.jump_to(values);
        smoothers
    }

    /// Start without a ramp-in from zero
    fn jump_to(&mut self, values: &ParameterSnapshot) {
        self.cutoff.set_current_and_target_value(values.cutoff as f64);
        self.q.set_current_and_target_value(values.q as f64);
        self.gain.set_current_and_target_value(values.gain as f64);
        self.wetdry.set_current_and_target_value(values.wetdry as f64);
    }

    fn retarget(&mut self, values: &ParameterSnapshot) {
        self.cutoff.set_target_value(values.cutoff as f64);
        self.q.set_target_value(values.q as f64);
        self.gain.set_target_value(values.gain as f64);
        self.wetdry.set_target_value(values.wetdry as f64);
    }
}

/// Everything that lives from stream start to stream stop
#[derive(Debug)]
struct StreamState {
    sample_rate: f64,
    layout: ChannelLayout,
    smoothers: Smoothers,
    filter: FilterStage,
    gain: GainStage,
    dither: DitherGenerator,
    mixer: DryWetMixer,
}

impl StreamState {
    fn process_chunk(&mut self, channels: &mut [Vec<f32>], range: Range<usize>) {
        self.mixer.push_dry(channels, range.clone());

        for i in range.clone() {
            let cutoff = self.smoothers.cutoff.get_next_value();
            let q = self.smoothers.q.get_next_value();
            self.filter
                .set_coefficients(FilterCoefficients::highpass(self.sample_rate, cutoff, q));
            self.gain.set_gain_db(self.smoothers.gain.get_next_value());

            for (channel, samples) in channels.iter_mut().enumerate() {
                let filtered = self.filter.process_sample(channel, samples[i]);
                samples[i] = self.gain.apply(filtered) + self.dither.next_dither(channel);
            }
        }

        let wet = self.smoothers.wetdry.skip(range.len());
        self.mixer.set_wet_proportion(wet);
        self.mixer.mix_wet(channels, range);
    }
}

/// Smoothed resonant highpass with gain, dither and dry/wet mix
///
/// Parameters live in a shared [`HighpassParams`] owned by the host side;
/// the processor reads them once per block and never copies the container.
#[derive(Debug)]
pub struct HighpassProcessor {
    params: Arc<HighpassParams>,
    config: HighpassConfig,
    stream: Option<StreamState>,
}

impl HighpassProcessor {
    /// Create a processor with the default configuration
    pub fn new(params: Arc<HighpassParams>) -> Self {
        Self {
            params,
            config: HighpassConfig::default(),
            stream: None,
        }
    }

    /// Create a processor with a custom configuration
    ///
    /// An invalid configuration is logged and replaced by the defaults.
    pub fn with_config(params: Arc<HighpassParams>, config: HighpassConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "invalid highpass configuration, using defaults");
                HighpassConfig::default()
            }
        };
        Self {
            params,
            config,
            stream: None,
        }
    }

    /// Shared parameter container
    pub fn params(&self) -> &Arc<HighpassParams> {
        &self.params
    }

    pub fn config(&self) -> &HighpassConfig {
        &self.config
    }

    /// Whether a stream is running (between `prepare` and `release`)
    pub fn is_prepared(&self) -> bool {
        self.stream.is_some()
    }

    /// Sample rate of the running stream
    pub fn sample_rate(&self) -> Option<f64> {
        self.stream.as_ref().map(|s| s.sample_rate)
    }

    /// Channel layout of the running stream
    pub fn channel_layout(&self) -> Option<ChannelLayout> {
        self.stream.as_ref().map(|s| s.layout)
    }

    /// Replace the random dither seeds with fixed ones, one per channel
    ///
    /// Does nothing when no stream is running.
    ///
    /// # Errors
    /// Returns `InvalidDitherSeed` if any seed is below the minimum, and
    /// `DitherSeedCount` if the running stream has a different channel count.
    pub fn seed_dither(&mut self, seeds: &[u32]) -> Result<()> {
        let states = seeds
            .iter()
            .map(|&seed| DitherState::from_seed(seed))
            .collect::<Result<Vec<_>>>()?;
        if let Some(stream) = self.stream.as_mut() {
            let expected = stream.layout.num_channels();
            if states.len() != expected {
                return Err(HighpassError::DitherSeedCount {
                    expected,
                    found: states.len(),
                });
            }
            stream.dither = DitherGenerator::with_states(states);
        }
        Ok(())
    }
}

impl Effect for HighpassProcessor {
    fn name(&self) -> &'static str {
        EFFECT_NAME
    }

    fn prepare(&mut self, spec: StreamSpec) -> Result<()> {
        let layout = spec.validate()?;
        let num_channels = layout.num_channels();
        let values = self.params.snapshot();

        if spec.max_block_size > self.config.mixer_capacity {
            debug!(
                max_block_size = spec.max_block_size,
                mixer_capacity = self.config.mixer_capacity,
                "blocks above mixer capacity will be processed in chunks"
            );
        }

        let mut filter = FilterStage::new();
        filter.prepare(spec.sample_rate, spec.max_block_size, num_channels);
        filter.reset();
        filter.set_coefficients(FilterCoefficients::highpass(
            spec.sample_rate,
            values.cutoff as f64,
            values.q as f64,
        ));

        let mut dither = DitherGenerator::new();
        dither.prepare(num_channels);

        let mut mixer = DryWetMixer::new(self.config.mixer_capacity);
        mixer.set_mixing_rule(self.config.mixing_rule);
        mixer.prepare(num_channels);
        mixer.set_wet_proportion(values.wetdry as f64);

        self.stream = Some(StreamState {
            sample_rate: spec.sample_rate,
            layout,
            smoothers: Smoothers::new(spec.sample_rate, self.config.smoothing_seconds, &values),
            filter,
            gain: GainStage::new(values.gain as f64),
            dither,
            mixer,
        });

        info!(
            sample_rate = spec.sample_rate,
            max_block_size = spec.max_block_size,
            channels = num_channels,
            "highpass stream started"
        );
        Ok(())
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            debug!("highpass stream stopped");
        }
    }

    fn reset(&mut self) {
        let values = self.params.snapshot();
        if let Some(stream) = self.stream.as_mut() {
            stream.filter.reset();
            stream.mixer.reset();
            stream.smoothers.jump_to(&values);
            stream.gain.set_gain_db(values.gain as f64);
            stream.mixer.set_wet_proportion(values.wetdry as f64);
        }
    }

    fn process_block(&mut self, buffer: &mut AudioBuffer) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };

        let num_channels = buffer.num_channels().min(stream.layout.num_channels());
        let channels = &mut buffer.channels_mut()[..num_channels];

        // Ragged channels are processed up to the shortest one
        let num_samples = channels.iter().map(Vec::len).min().unwrap_or(0);
        if num_samples == 0 {
            return;
        }

        let targets = self.params.snapshot();
        stream.smoothers.retarget(&targets);

        let chunk = stream.mixer.capacity();

        let mut start = 0;
        while start < num_samples {
            let end = (start + chunk).min(num_samples);
            stream.process_chunk(channels, start..end);
            start = end;
        }
    }

    fn parameter_infos(&self) -> &'static [ParameterInfo] {
        &PARAMETER_INFOS
    }

    fn get_parameter(&self, id: ParamId) -> f32 {
        self.params.value(id)
    }

    fn set_parameter(&self, id: ParamId, value: f32) {
        self.params.set_value(id, value);
    }

    fn save_state(&self) -> Result<Vec<u8>> {
        encode_state(&self.params.snapshot())
    }

    fn load_state(&mut self, data: &[u8]) {
        match decode_state(data) {
            Ok(snapshot) => {
                self.params.apply_snapshot(&snapshot);
                debug!(?snapshot, "highpass state restored");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.error_code(),
                    "could not restore highpass state, using defaults"
                );
                self.params.reset_to_defaults();
            }
        }
    }
}
