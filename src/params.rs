//! Parameter container
//!
//! The four automatable parameters, their ranges and metadata. Values are
//! stored as `f32` bits in atomics so the host thread can write while the
//! audio thread reads, without locks and without torn reads.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::HighpassError;
use crate::state::ParameterSnapshot;

// ============================================================================
// Parameter Identifiers
// ============================================================================

/// Identifier of one of the four parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamId {
    Cutoff,
    Q,
    Gain,
    WetDry,
}

impl ParamId {
    /// All parameters in host registration order
    pub const ALL: [ParamId; 4] = [ParamId::Cutoff, ParamId::Q, ParamId::Gain, ParamId::WetDry];

    /// Stable string identifier used for automation and persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamId::Cutoff => "cutoff",
            ParamId::Q => "q",
            ParamId::Gain => "gain",
            ParamId::WetDry => "wetdry",
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamId {
    type Err = HighpassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cutoff" => Ok(ParamId::Cutoff),
            "q" => Ok(ParamId::Q),
            "gain" => Ok(ParamId::Gain),
            "wetdry" => Ok(ParamId::WetDry),
            _ => Err(HighpassError::UnknownParameter { id: s.to_string() }),
        }
    }
}

// ============================================================================
// Parameter Range
// ============================================================================

/// Value range with a step interval and a skew for normalized mapping
///
/// A skew below 1 spends more of the normalized range on the low end, which
/// suits frequencies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub interval: f32,
    pub skew: f32,
}

impl ParameterRange {
    pub const fn new(min: f32, max: f32, interval: f32, skew: f32) -> Self {
        Self {
            min,
            max,
            interval,
            skew,
        }
    }

    /// Clamp a plain value into the range
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Snap a plain value to the nearest interval step, then clamp
    pub fn snap(&self, value: f32) -> f32 {
        if self.interval <= 0.0 {
            return self.clamp(value);
        }
        let steps = ((value - self.min) / self.interval).round();
        self.clamp(self.min + steps * self.interval)
    }

    /// Map a plain value to [0, 1]
    pub fn to_normalized(&self, value: f32) -> f32 {
        let proportion = ((self.clamp(value) - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    /// Map [0, 1] to a plain value
    pub fn from_normalized(&self, normalized: f32) -> f32 {
        let mut proportion = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        if self.skew != 1.0 && proportion > 0.0 {
            proportion = (proportion.ln() / self.skew).exp();
        }
        self.min + (self.max - self.min) * proportion
    }
}

// ============================================================================
// Parameter Metadata
// ============================================================================

/// Metadata surfaced to the host's automation and UI layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterInfo {
    pub id: ParamId,
    pub name: &'static str,
    pub unit: &'static str,
    pub range: ParameterRange,
    pub default: f32,
}

impl ParameterInfo {
    /// Metadata for one parameter
    pub const fn for_id(id: ParamId) -> Self {
        match id {
            ParamId::Cutoff => ParameterInfo {
                id,
                name: "Cutoff",
                unit: "Hz",
                range: ParameterRange::new(20.0, 20000.0, 0.01, 0.3),
                default: 200.0,
            },
            ParamId::Q => ParameterInfo {
                id,
                name: "Resonance",
                unit: "",
                range: ParameterRange::new(0.1, 10.0, 0.01, 1.0),
                default: 0.707,
            },
            ParamId::Gain => ParameterInfo {
                id,
                name: "Gain",
                unit: "dB",
                range: ParameterRange::new(-24.0, 24.0, 0.1, 1.0),
                default: 0.0,
            },
            ParamId::WetDry => ParameterInfo {
                id,
                name: "Dry/Wet",
                unit: "%",
                range: ParameterRange::new(0.0, 1.0, 0.01, 1.0),
                default: 1.0,
            },
        }
    }

    /// Human-readable value for display
    pub fn format_value(&self, value: f32) -> String {
        match self.id {
            ParamId::Cutoff if value >= 1000.0 => format!("{:.2} kHz", value / 1000.0),
            ParamId::Cutoff => format!("{:.1} Hz", value),
            ParamId::Q => format!("{:.2}", value),
            ParamId::Gain => format!("{:+.1} dB", value),
            ParamId::WetDry => format!("{:.0}%", value * 100.0),
        }
    }
}

/// Metadata for all four parameters in registration order
pub static PARAMETER_INFOS: [ParameterInfo; 4] = [
    ParameterInfo::for_id(ParamId::Cutoff),
    ParameterInfo::for_id(ParamId::Q),
    ParameterInfo::for_id(ParamId::Gain),
    ParameterInfo::for_id(ParamId::WetDry),
];

// ============================================================================
// Float Parameter
// ============================================================================

/// A float parameter with lock-free storage
#[derive(Debug)]
pub struct FloatParameter {
    info: ParameterInfo,
    value: AtomicU32,
}

impl FloatParameter {
    pub fn new(info: ParameterInfo) -> Self {
        Self {
            value: AtomicU32::new(info.default.to_bits()),
            info,
        }
    }

    pub fn info(&self) -> &ParameterInfo {
        &self.info
    }

    /// Current plain value
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Store a plain value, clamped to the range
    pub fn set(&self, value: f32) {
        let clamped = self.info.range.clamp(value);
        self.value.store(clamped.to_bits(), Ordering::Relaxed);
    }

    /// Current value mapped to [0, 1]
    pub fn get_normalized(&self) -> f32 {
        self.info.range.to_normalized(self.get())
    }

    /// Store a value given in [0, 1], snapped to the range interval
    pub fn set_normalized(&self, normalized: f32) {
        let range = &self.info.range;
        self.set(range.snap(range.from_normalized(normalized)));
    }

    pub fn reset_to_default(&self) {
        self.set(self.info.default);
    }
}

// ============================================================================
// Parameter Container
// ============================================================================

/// The four parameters of the effect
///
/// Shared between the host thread and the processor through an `Arc`; the
/// processor only reads.
#[derive(Debug)]
pub struct HighpassParams {
    pub cutoff: FloatParameter,
    pub q: FloatParameter,
    pub gain: FloatParameter,
    pub wetdry: FloatParameter,
}

impl Default for HighpassParams {
    fn default() -> Self {
        Self {
            cutoff: FloatParameter::new(ParameterInfo::for_id(ParamId::Cutoff)),
            q: FloatParameter::new(ParameterInfo::for_id(ParamId::Q)),
            gain: FloatParameter::new(ParameterInfo::for_id(ParamId::Gain)),
            wetdry: FloatParameter::new(ParameterInfo::for_id(ParamId::WetDry)),
        }
    }
}

impl HighpassParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameter behind an identifier
    pub fn param(&self, id: ParamId) -> &FloatParameter {
        match id {
            ParamId::Cutoff => &self.cutoff,
            ParamId::Q => &self.q,
            ParamId::Gain => &self.gain,
            ParamId::WetDry => &self.wetdry,
        }
    }

    /// Current plain value of a parameter; non-blocking
    #[inline]
    pub fn value(&self, id: ParamId) -> f32 {
        self.param(id).get()
    }

    /// Set a plain value, clamped to the parameter's range
    pub fn set_value(&self, id: ParamId, value: f32) {
        self.param(id).set(value);
    }

    /// Set a value given in [0, 1]
    pub fn set_normalized(&self, id: ParamId, normalized: f32) {
        self.param(id).set_normalized(normalized);
    }

    /// Read all four current values
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            cutoff: self.cutoff.get(),
            q: self.q.get(),
            gain: self.gain.get(),
            wetdry: self.wetdry.get(),
        }
    }

    /// Write all four values from a snapshot (each clamped to its range)
    pub fn apply_snapshot(&self, snapshot: &ParameterSnapshot) {
        self.cutoff.set(snapshot.cutoff);
        self.q.set(snapshot.q);
        self.gain.set(snapshot.gain);
        self.wetdry.set(snapshot.wetdry);
    }

    pub fn reset_to_defaults(&self) {
        for id in ParamId::ALL {
            self.param(id).reset_to_default();
        }
    }
}
