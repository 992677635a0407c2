//! Highpass biquad: coefficient generator and filter stage
//!
//! Coefficients follow the Audio EQ Cookbook highpass referenced to Q.
//! Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html

use std::f64::consts::PI;

/// Lowest cutoff handed to the cookbook equations
const MIN_CUTOFF_HZ: f64 = 1.0;

/// Highest cutoff as a fraction of the sample rate (just below Nyquist)
const MAX_CUTOFF_RATIO: f64 = 0.49;

/// Lowest Q handed to the cookbook equations
const MIN_Q: f64 = 0.01;

/// Values smaller than this are flushed to zero in the delay registers
const DENORMAL_THRESHOLD: f64 = 1e-30;

/// Biquad filter coefficients
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
/// Already normalized by a0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for FilterCoefficients {
    /// Unity passthrough
    fn default() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

impl FilterCoefficients {
    /// Highpass coefficients for the given sample rate, cutoff and Q
    ///
    /// Cutoff is clamped to `[1 Hz, 0.49 * sample_rate]` and Q to at least
    /// 0.01, so the result is finite and stable for any positive sample rate.
    pub fn highpass(sample_rate: f64, cutoff_hz: f64, q: f64) -> Self {
        let max_cutoff = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
        let freq = cutoff_hz.clamp(MIN_CUTOFF_HZ, max_cutoff);
        let q = q.max(MIN_Q);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * q);

        let b0 = (1.0 + cos_w0) / 2.0;
        let b1 = -(1.0 + cos_w0);
        let b2 = (1.0 + cos_w0) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        FilterCoefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Check that every coefficient is finite
    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|c| c.is_finite())
    }

    /// Check that both poles lie strictly inside the unit circle
    ///
    /// Uses the stability triangle for 1 + a1*z^-1 + a2*z^-2.
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }
}

/// Delay registers for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    x1: f64, // x[n-1]
    x2: f64, // x[n-2]
    y1: f64, // y[n-1]
    y2: f64, // y[n-2]
}

impl FilterState {
    /// Process a single sample (Direct Form I)
    #[inline]
    fn process(&mut self, input: f64, coeffs: &FilterCoefficients) -> f64 {
        let mut output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;

        if output.abs() < DENORMAL_THRESHOLD {
            output = 0.0;
        }

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Second-order highpass section applied to each channel independently
///
/// Channels never share delay state. Coefficients are installed with
/// `set_coefficients` and apply to every sample processed afterwards.
#[derive(Debug, Clone, Default)]
pub struct FilterStage {
    coeffs: FilterCoefficients,
    states: Vec<FilterState>,
}

impl FilterStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve per-channel state; the only allocation the stage performs
    pub fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize, num_channels: usize) {
        self.states.clear();
        self.states.resize(num_channels, FilterState::default());
    }

    /// Zero all delay registers
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    /// Install the coefficients used from the next sample on
    #[inline]
    pub fn set_coefficients(&mut self, coeffs: FilterCoefficients) {
        self.coeffs = coeffs;
    }

    /// Currently installed coefficients
    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coeffs
    }

    /// Number of prepared channels
    pub fn num_channels(&self) -> usize {
        self.states.len()
    }

    /// Filter one sample of one channel
    ///
    /// Channels that were not prepared pass through unchanged.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        match self.states.get_mut(channel) {
            Some(state) => state.process(input as f64, &self.coeffs) as f32,
            None => input,
        }
    }

    /// Filter whole channels in place with the installed coefficients
    pub fn process(&mut self, channels: &mut [Vec<f32>]) {
        for (state, samples) in self.states.iter_mut().zip(channels.iter_mut()) {
            for sample in samples.iter_mut() {
                *sample = state.process(*sample as f64, &self.coeffs) as f32;
            }
        }
    }
}
