//! Dry/Wet Mixer
//!
//! Captures the untouched input of a block before processing and blends it
//! back into the processed signal afterwards. The wet proportion is set once
//! per block; it is not smoothed per sample inside the mixer.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::ops::Range;

/// Default dry capture capacity in samples per channel
pub const DEFAULT_MIXER_CAPACITY: usize = 256;

/// Gain law used to blend dry and wet signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MixingRule {
    /// dry * (1 - x) + wet * x
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// Both signals at full level at 50%, each fading out over its own half
    #[serde(rename = "balanced")]
    Balanced,
    /// Sine law, -3 dB at the midpoint
    #[serde(rename = "sin_3db")]
    Sin3dB,
    /// Sine law, -4.5 dB at the midpoint
    #[serde(rename = "sin_4p5db")]
    Sin4p5dB,
    /// Sine law, -6 dB at the midpoint
    #[serde(rename = "sin_6db")]
    Sin6dB,
    /// Square-root law, -3 dB at the midpoint
    #[serde(rename = "square_root_3db")]
    SquareRoot3dB,
    /// Square-root law, -4.5 dB at the midpoint
    #[serde(rename = "square_root_4p5db")]
    SquareRoot4p5dB,
}

impl MixingRule {
    /// (dry gain, wet gain) for a wet proportion in [0, 1]
    pub fn gains(&self, wet_proportion: f64) -> (f64, f64) {
        let x = wet_proportion.clamp(0.0, 1.0);
        match self {
            MixingRule::Linear => (1.0 - x, x),
            MixingRule::Balanced => (2.0 * (1.0 - x).min(0.5), 2.0 * x.min(0.5)),
            MixingRule::Sin3dB => ((FRAC_PI_2 * (1.0 - x)).sin(), (FRAC_PI_2 * x).sin()),
            MixingRule::Sin4p5dB => (
                (FRAC_PI_2 * (1.0 - x)).sin().powf(1.5),
                (FRAC_PI_2 * x).sin().powf(1.5),
            ),
            MixingRule::Sin6dB => (
                (FRAC_PI_2 * (1.0 - x)).sin().powi(2),
                (FRAC_PI_2 * x).sin().powi(2),
            ),
            MixingRule::SquareRoot3dB => ((1.0 - x).sqrt(), x.sqrt()),
            MixingRule::SquareRoot4p5dB => ((1.0 - x).sqrt().powf(1.5), x.sqrt().powf(1.5)),
        }
    }
}

/// Dry/wet blender with a fixed-capacity dry capture buffer
#[derive(Debug, Clone)]
pub struct DryWetMixer {
    capacity: usize,
    dry: Vec<Vec<f32>>,
    dry_len: usize,
    wet_proportion: f64,
    rule: MixingRule,
}

impl Default for DryWetMixer {
    fn default() -> Self {
        Self::new(DEFAULT_MIXER_CAPACITY)
    }
}

impl DryWetMixer {
    /// Create a mixer holding at most `capacity` dry samples per channel
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            dry: Vec::new(),
            dry_len: 0,
            wet_proportion: 1.0,
            rule: MixingRule::Linear,
        }
    }

    /// Allocate the dry buffers; no allocation happens after this
    pub fn prepare(&mut self, num_channels: usize) {
        self.dry = vec![vec![0.0; self.capacity]; num_channels];
        self.dry_len = 0;
    }

    /// Forget any captured dry samples
    pub fn reset(&mut self) {
        for channel in &mut self.dry {
            channel.fill(0.0);
        }
        self.dry_len = 0;
    }

    /// Dry capture capacity in samples per channel
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of dry samples captured by the last `push_dry`
    pub fn captured_len(&self) -> usize {
        self.dry_len
    }

    pub fn set_mixing_rule(&mut self, rule: MixingRule) {
        self.rule = rule;
    }

    pub fn mixing_rule(&self) -> MixingRule {
        self.rule
    }

    /// Set the blend used by the next `mix_wet`, clamped to [0, 1]
    pub fn set_wet_proportion(&mut self, proportion: f64) {
        self.wet_proportion = proportion.clamp(0.0, 1.0);
    }

    pub fn wet_proportion(&self) -> f64 {
        self.wet_proportion
    }

    /// Capture `range` of every channel before processing
    ///
    /// At most `capacity` samples are captured; callers split longer blocks.
    /// Returns the number of samples captured per channel.
    pub fn push_dry(&mut self, channels: &[Vec<f32>], range: Range<usize>) -> usize {
        let len = range.len().min(self.capacity);
        for (dry, input) in self.dry.iter_mut().zip(channels.iter()) {
            let source = &input[range.start..range.start + len];
            dry[..len].copy_from_slice(source);
        }
        self.dry_len = len;
        len
    }

    /// Blend the captured dry samples into the processed `range` in place
    ///
    /// Only the overlap of `range` and the captured dry samples is mixed.
    pub fn mix_wet(&mut self, channels: &mut [Vec<f32>], range: Range<usize>) {
        let len = range.len().min(self.dry_len);
        let (dry_gain, wet_gain) = self.rule.gains(self.wet_proportion);

        for (dry, output) in self.dry.iter().zip(channels.iter_mut()) {
            let wet = &mut output[range.start..range.start + len];
            for (w, &d) in wet.iter_mut().zip(dry[..len].iter()) {
                *w = (d as f64 * dry_gain + *w as f64 * wet_gain) as f32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize, offset: f32) -> Vec<f32> {
        (0..len).map(|i| offset + i as f32 * 0.01).collect()
    }

    #[test]
    fn test_fully_dry_restores_input() {
        let mut mixer = DryWetMixer::new(64);
        mixer.prepare(2);

        let input = vec![ramp(32, 0.1), ramp(32, -0.3)];
        let mut channels = input.clone();
        mixer.push_dry(&channels, 0..32);

        for ch in channels.iter_mut() {
            ch.iter_mut().for_each(|s| *s = *s * 3.0 + 1.0);
        }

        mixer.set_wet_proportion(0.0);
        mixer.mix_wet(&mut channels, 0..32);
        assert_eq!(channels, input);
    }

    #[test]
    fn test_fully_wet_keeps_processed() {
        let mut mixer = DryWetMixer::new(64);
        mixer.prepare(1);

        let mut channels = vec![ramp(16, 0.5)];
        mixer.push_dry(&channels, 0..16);
        channels[0].iter_mut().for_each(|s| *s = -*s);
        let processed = channels.clone();

        mixer.set_wet_proportion(1.0);
        mixer.mix_wet(&mut channels, 0..16);
        assert_eq!(channels, processed);
    }

    #[test]
    fn test_half_mix_is_average() {
        let mut mixer = DryWetMixer::new(8);
        mixer.prepare(1);

        let mut channels = vec![vec![1.0; 8]];
        mixer.push_dry(&channels, 0..8);
        channels[0].fill(0.0);

        mixer.set_wet_proportion(0.5);
        mixer.mix_wet(&mut channels, 0..8);
        assert!(channels[0].iter().all(|&s| (s - 0.5).abs() < 1e-7));
    }

    #[test]
    fn test_push_dry_limited_to_capacity() {
        let mut mixer = DryWetMixer::new(4);
        mixer.prepare(1);

        let mut channels = vec![ramp(10, 0.0)];
        assert_eq!(mixer.push_dry(&channels, 2..10), 4);
        assert_eq!(mixer.captured_len(), 4);

        let before = channels.clone();
        channels[0].iter_mut().for_each(|s| *s += 1.0);
        mixer.set_wet_proportion(0.0);
        mixer.mix_wet(&mut channels, 2..10);

        // Captured region restored, remainder left as processed
        assert_eq!(&channels[0][2..6], &before[0][2..6]);
        assert_eq!(channels[0][6], before[0][6] + 1.0);
    }

    #[test]
    fn test_wet_proportion_clamped() {
        let mut mixer = DryWetMixer::default();
        assert_eq!(mixer.capacity(), DEFAULT_MIXER_CAPACITY);
        mixer.set_wet_proportion(1.5);
        assert_eq!(mixer.wet_proportion(), 1.0);
        mixer.set_wet_proportion(-0.5);
        assert_eq!(mixer.wet_proportion(), 0.0);
    }

    #[test]
    fn test_mixing_rule_endpoints() {
        let rules = [
            MixingRule::Linear,
            MixingRule::Balanced,
            MixingRule::Sin3dB,
            MixingRule::Sin4p5dB,
            MixingRule::Sin6dB,
            MixingRule::SquareRoot3dB,
            MixingRule::SquareRoot4p5dB,
        ];
        for rule in rules {
            let (dry, wet) = rule.gains(0.0);
            assert!((dry - 1.0).abs() < 1e-12 && wet.abs() < 1e-12, "{:?}", rule);
            let (dry, wet) = rule.gains(1.0);
            assert!(dry.abs() < 1e-12 && (wet - 1.0).abs() < 1e-12, "{:?}", rule);
        }
    }

    #[test]
    fn test_mixing_rule_midpoints() {
        let (dry, wet) = MixingRule::Sin3dB.gains(0.5);
        assert!((dry - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((wet - dry).abs() < 1e-12);

        assert_eq!(MixingRule::Balanced.gains(0.5), (1.0, 1.0));
        assert_eq!(MixingRule::Linear.gains(0.5), (0.5, 0.5));
        let (dry, _) = MixingRule::Sin6dB.gains(0.5);
        assert!((dry - 0.5).abs() < 1e-12);
    }
}
