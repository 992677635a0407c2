//! Parameter smoothing
//!
//! Exponential approach from the current value toward a target, advanced once
//! per sample. The smoothing time is the time the remaining distance takes to
//! fall to 1e-4 of the step (-80 dB settling), so a retarget is audibly done
//! well within one smoothing period.

/// Fraction of a step still remaining after one smoothing period
const SETTLE_RATIO: f64 = 1e-4;

/// Exponentially smoothed parameter value
///
/// All values are held in `f64` so the approach keeps moving toward large
/// targets (such as a cutoff in Hz) long after an `f32` would have stalled a
/// few ULPs short.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedValue {
    current: f64,
    target: f64,
    coefficient: f64,
    smoothing_seconds: f64,
    sample_rate: f64,
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            coefficient: 1.0,
            smoothing_seconds: 0.0,
            sample_rate: 0.0,
        }
    }
}

impl SmoothedValue {
    /// Create a smoother already reset to the given rate and time
    pub fn new(sample_rate: f64, smoothing_seconds: f64) -> Self {
        let mut smoother = Self::default();
        smoother.reset(sample_rate, smoothing_seconds);
        smoother
    }

    /// Reinitialize the ramp law and jump to zero with no ramp pending
    pub fn reset(&mut self, sample_rate: f64, smoothing_seconds: f64) {
        self.sample_rate = sample_rate;
        self.smoothing_seconds = smoothing_seconds;
        self.coefficient = Self::coefficient_for(sample_rate, smoothing_seconds);
        self.current = 0.0;
        self.target = 0.0;
    }

    /// Per-sample approach coefficient in (0, 1]
    ///
    /// Zero-length ramps (or a smoothing period shorter than one sample)
    /// give 1.0, which jumps straight to the target.
    fn coefficient_for(sample_rate: f64, smoothing_seconds: f64) -> f64 {
        let steps = smoothing_seconds * sample_rate;
        if !steps.is_finite() || steps <= 1.0 {
            return 1.0;
        }
        (1.0 - SETTLE_RATIO.powf(1.0 / steps)).clamp(f64::MIN_POSITIVE, 1.0)
    }

    /// Jump to `value` immediately, cancelling any ramp in progress
    pub fn set_current_and_target_value(&mut self, value: f64) {
        self.current = value;
        self.target = value;
    }

    /// Start a new ramp from the current value toward `value`
    pub fn set_target_value(&mut self, value: f64) {
        self.target = value;
    }

    /// Advance one sample and return the new current value
    #[inline]
    pub fn get_next_value(&mut self) -> f64 {
        self.current += (self.target - self.current) * self.coefficient;
        self.current
    }

    /// Advance `num_samples` samples at once and return the new current value
    ///
    /// Equivalent to calling `get_next_value` that many times.
    pub fn skip(&mut self, num_samples: usize) -> f64 {
        if num_samples == 0 {
            return self.current;
        }
        let remaining = (1.0 - self.coefficient).powi(num_samples.min(i32::MAX as usize) as i32);
        self.current = self.target + (self.current - self.target) * remaining;
        self.current
    }

    /// Last produced value, without advancing
    #[inline]
    pub fn get_current_value(&self) -> f64 {
        self.current
    }

    /// Value the smoother is heading toward
    #[inline]
    pub fn get_target_value(&self) -> f64 {
        self.target
    }

    /// Whether the current value is still measurably away from the target
    pub fn is_smoothing(&self) -> bool {
        let scale = self.target.abs().max(1.0);
        (self.target - self.current).abs() > scale * 1e-9
    }

    /// Smoothing period in seconds
    pub fn smoothing_seconds(&self) -> f64 {
        self.smoothing_seconds
    }
}
