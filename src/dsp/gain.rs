//! Gain Stage
//!
//! Decibel-controlled gain applied after the filter. The dB value comes from
//! a smoother, so it is converted per sample rather than cached.

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude value
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

// ============================================================================
// Gain Stage
// ============================================================================

/// Per-sample gain multiply driven by a dB value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainStage {
    gain_db: f64,
    gain_linear: f64,
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl GainStage {
    /// Create a gain stage at the given dB value
    pub fn new(gain_db: f64) -> Self {
        Self {
            gain_db,
            gain_linear: db_to_linear(gain_db),
        }
    }

    /// Set the gain for the samples that follow
    #[inline]
    pub fn set_gain_db(&mut self, gain_db: f64) {
        self.gain_db = gain_db;
        self.gain_linear = db_to_linear(gain_db);
    }

    /// Current gain in decibels
    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// Current linear gain multiplier
    pub fn gain_linear(&self) -> f64 {
        self.gain_linear
    }

    /// Apply the gain to one sample
    #[inline]
    pub fn apply(&self, sample: f32) -> f32 {
        (sample as f64 * self.gain_linear) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_linear() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
        // -6 dB ~= 0.501187
        assert!((db_to_linear(-6.0) - 0.501187).abs() < 1e-6);
        // +24 dB ~= 15.848932
        assert!((db_to_linear(24.0) - 15.848932).abs() < 1e-6);
    }

    #[test]
    fn test_gain_stage_apply() {
        let mut stage = GainStage::default();
        assert_eq!(stage.apply(0.5), 0.5);

        stage.set_gain_db(-6.0);
        assert!((stage.apply(1.0) - 0.501187).abs() < 1e-5);
        assert_eq!(stage.gain_db(), -6.0);

        stage.set_gain_db(-24.0);
        assert!((stage.gain_linear() - 0.0630957).abs() < 1e-6);
    }
}
