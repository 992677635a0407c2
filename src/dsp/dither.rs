//! Dither Generator
//!
//! Xorshift32 noise added to every output sample after the gain stage.
//! Each channel owns an independent state word.

use rand::Rng;

use crate::error::{HighpassError, Result};

/// Smallest accepted seed; smaller seeds start the xorshift sequence in a
/// long run of near-zero words
pub const MIN_DITHER_SEED: u32 = 16386;

/// Midpoint subtracted from the state word before scaling
const DITHER_OFFSET: i64 = 0x7FFF_FFFF;

/// Noise floor calibration for float-domain dithering: 5.5e-36 * 2^23
///
/// The single-precision literal is kept so the product matches the reference
/// noise floor bit for bit.
pub const DITHER_SCALE: f64 = 5.5e-36_f32 as f64 * 8_388_608.0;

/// Largest magnitude a dither sample can take
pub const MAX_DITHER_AMPLITUDE: f64 = (u32::MAX as i64 - DITHER_OFFSET) as f64 * DITHER_SCALE;

/// One channel's dither state word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DitherState {
    state: u32,
}

impl DitherState {
    /// Seed from the thread-local random generator
    ///
    /// Draws until the seed reaches `MIN_DITHER_SEED`.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        let mut seed = 0_u32;
        while seed < MIN_DITHER_SEED {
            seed = rng.random();
        }
        Self { state: seed }
    }

    /// Seed with a fixed value (for reproducible output)
    ///
    /// # Errors
    /// Returns `InvalidDitherSeed` if `seed` is below `MIN_DITHER_SEED`.
    pub fn from_seed(seed: u32) -> Result<Self> {
        if seed < MIN_DITHER_SEED {
            return Err(HighpassError::InvalidDitherSeed {
                seed,
                minimum: MIN_DITHER_SEED,
            });
        }
        Ok(Self { state: seed })
    }

    /// Current state word
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the xorshift32 recurrence and return the next dither sample
    #[inline]
    pub fn next_dither(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;

        ((x as i64 - DITHER_OFFSET) as f64 * DITHER_SCALE) as f32
    }
}

/// Per-channel dither generator
#[derive(Debug, Clone, Default)]
pub struct DitherGenerator {
    channels: Vec<DitherState>,
}

impl DitherGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one independent state per channel from the random generator
    pub fn prepare(&mut self, num_channels: usize) {
        self.channels = (0..num_channels).map(|_| DitherState::random()).collect();
    }

    /// Install explicit per-channel states (for reproducible output)
    pub fn with_states(states: Vec<DitherState>) -> Self {
        Self { channels: states }
    }

    /// Number of channel states
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// State of one channel
    pub fn channel_state(&self, channel: usize) -> Option<&DitherState> {
        self.channels.get(channel)
    }

    /// Next dither sample for `channel`; channels without a state get none
    #[inline]
    pub fn next_dither(&mut self, channel: usize) -> f32 {
        match self.channels.get_mut(channel) {
            Some(state) => state.next_dither(),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_constant() {
        let expected = 5.5e-36_f32 as f64 * 2.0_f64.powi(23);
        assert_eq!(DITHER_SCALE, expected);
        assert!(MAX_DITHER_AMPLITUDE < 1e-6);
        assert!(MAX_DITHER_AMPLITUDE > 0.0);
    }

    #[test]
    fn test_random_seed_respects_minimum() {
        for _ in 0..100 {
            assert!(DitherState::random().state() >= MIN_DITHER_SEED);
        }
    }

    #[test]
    fn test_from_seed_rejects_small_seeds() {
        let err = DitherState::from_seed(16385).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DITHER_SEED");
        assert!(DitherState::from_seed(MIN_DITHER_SEED).is_ok());
    }

    #[test]
    fn test_xorshift_sequence() {
        let mut state = DitherState::from_seed(0x1234_5678).unwrap();
        let mut x = 0x1234_5678_u32;
        for _ in 0..16 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            state.next_dither();
            assert_eq!(state.state(), x);
        }
    }

    #[test]
    fn test_dither_is_zero_mean_and_bounded() {
        let mut state = DitherState::from_seed(987_654_321).unwrap();
        let mut sum = 0.0_f64;
        let mut peak = 0.0_f64;
        for _ in 0..10_000 {
            let d = state.next_dither() as f64;
            sum += d;
            peak = peak.max(d.abs());
        }
        let mean = sum / 10_000.0;

        assert!(peak < 1e-6);
        assert!(peak <= MAX_DITHER_AMPLITUDE * 1.0001);
        assert!(peak > 0.0);
        assert!(
            mean.abs() < MAX_DITHER_AMPLITUDE * 0.05,
            "mean {} vs amplitude {}",
            mean,
            MAX_DITHER_AMPLITUDE
        );
    }

    #[test]
    fn test_channels_have_independent_states() {
        let mut generator = DitherGenerator::with_states(vec![
            DitherState::from_seed(20_000).unwrap(),
            DitherState::from_seed(20_000).unwrap(),
        ]);

        // Advancing channel 0 alone leaves channel 1 untouched
        let first = generator.next_dither(0);
        generator.next_dither(0);
        assert_eq!(generator.channel_state(1).unwrap().state(), 20_000);
        assert_eq!(generator.next_dither(1), first);
        assert_eq!(generator.next_dither(5), 0.0);
    }

    #[test]
    fn test_prepare_seeds_every_channel() {
        let mut generator = DitherGenerator::new();
        generator.prepare(2);
        assert_eq!(generator.num_channels(), 2);
        assert!(generator.channel_state(0).unwrap().state() >= MIN_DITHER_SEED);
        assert!(generator.channel_state(1).unwrap().state() >= MIN_DITHER_SEED);
    }
}
