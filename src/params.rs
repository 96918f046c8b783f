//! Host-automatable parameters and read-only telemetry outputs.
//!
//! Each value lives in its own atomic so the control thread can write while
//! the audio thread reads, without locks. Values are independent scalars, a
//! change may therefore land anywhere within the block being processed.
//!
//! # Example
//!
//! ```
//! use pitch_cv::params::{ParameterId, Parameters};
//!
//! let params = Parameters::default();
//! params.set(ParameterId::ConfidenceThreshold, 80.0).unwrap();
//! assert_eq!(params.confidence_threshold(), 0.8);
//!
//! // Host values are clamped to the declared range.
//! params.set(ParameterId::Octave, 9.0).unwrap();
//! assert_eq!(params.octave_shift(), 4);
//!
//! assert!(params.set(ParameterId::DetectedPitch, 440.0).is_err());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use atomic_float::AtomicF32;

use crate::cv::GateParams;
use crate::error::{Error, Result};

/// How a parameter value is scaled between normalized (0-1) and real values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterScale {
    Linear,
    /// Values are quantized to integers between `min` and `max`.
    Integer,
    /// Denormalizes to `min` (off) or `max` (on).
    Toggle,
}

/// Valid range and default of a parameter, in host units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub scale: ParameterScale,
}

impl ParameterRange {
    pub fn linear(min: f32, max: f32, default: f32) -> Self {
        ParameterRange {
            min,
            max,
            default,
            scale: ParameterScale::Linear,
        }
    }

    pub fn integer(min: i32, max: i32, default: i32) -> Self {
        ParameterRange {
            min: min as f32,
            max: max as f32,
            default: default as f32,
            scale: ParameterScale::Integer,
        }
    }

    pub fn toggle(default_on: bool) -> Self {
        ParameterRange {
            min: 0.0,
            max: 1.0,
            default: if default_on { 1.0 } else { 0.0 },
            scale: ParameterScale::Toggle,
        }
    }

    /// Clamp `value` into the range, rounding integers and snapping toggles.
    pub fn clamp(&self, value: f32) -> f32 {
        let value = if value.is_nan() { self.default } else { value };
        let value = value.clamp(self.min, self.max);
        match self.scale {
            ParameterScale::Linear => value,
            ParameterScale::Integer => value.round(),
            ParameterScale::Toggle => {
                if value >= (self.min + self.max) / 2.0 {
                    self.max
                } else {
                    self.min
                }
            }
        }
    }

    /// Convert a real value to normalized (0.0-1.0).
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }

    /// Convert a normalized value (0.0-1.0) to a real value.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        self.clamp(self.min + normalized * (self.max - self.min))
    }
}

/// Static description of a parameter for host glue and UIs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub symbol: &'static str,
    pub unit: &'static str,
    pub range: ParameterRange,
    /// Written by the processor, read by the host.
    pub output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ParameterId {
    /// Linear input gain applied before analysis.
    Sensitivity,
    /// Minimum estimate confidence, in percent.
    ConfidenceThreshold,
    /// Detector tolerance, in percent.
    Tolerance,
    /// Whole-octave shift of the output pitch.
    Octave,
    HoldOutputPitch,
    /// Last accepted frequency in Hz.
    DetectedPitch,
    /// Last estimate confidence in percent.
    PitchConfidence,
}

impl ParameterId {
    pub const ALL: [ParameterId; 7] = [
        ParameterId::Sensitivity,
        ParameterId::ConfidenceThreshold,
        ParameterId::Tolerance,
        ParameterId::Octave,
        ParameterId::HoldOutputPitch,
        ParameterId::DetectedPitch,
        ParameterId::PitchConfidence,
    ];

    /// Stable position for hosts that address parameters by index.
    pub fn index(self) -> u32 {
        match self {
            ParameterId::Sensitivity => 0,
            ParameterId::ConfidenceThreshold => 1,
            ParameterId::Tolerance => 2,
            ParameterId::Octave => 3,
            ParameterId::HoldOutputPitch => 4,
            ParameterId::DetectedPitch => 5,
            ParameterId::PitchConfidence => 6,
        }
    }

    pub fn is_output(self) -> bool {
        self.info().output
    }

    pub fn info(self) -> ParameterInfo {
        match self {
            ParameterId::Sensitivity => ParameterInfo {
                name: "Sensitivity",
                symbol: "sensitivity",
                unit: "x",
                range: ParameterRange::linear(0.1, 100.0, 1.0),
                output: false,
            },
            ParameterId::ConfidenceThreshold => ParameterInfo {
                name: "Confidence Threshold",
                symbol: "threshold",
                unit: "%",
                range: ParameterRange::linear(0.0, 100.0, 50.0),
                output: false,
            },
            ParameterId::Tolerance => ParameterInfo {
                name: "Tolerance",
                symbol: "tolerance",
                unit: "%",
                range: ParameterRange::linear(0.0, 100.0, 15.0),
                output: false,
            },
            ParameterId::Octave => ParameterInfo {
                name: "Octave",
                symbol: "octave",
                unit: "",
                range: ParameterRange::integer(-4, 4, 0),
                output: false,
            },
            ParameterId::HoldOutputPitch => ParameterInfo {
                name: "Hold Output Pitch",
                symbol: "holdOutputPitch",
                unit: "",
                range: ParameterRange::toggle(true),
                output: false,
            },
            ParameterId::DetectedPitch => ParameterInfo {
                name: "Detected Pitch",
                symbol: "detectedPitch",
                unit: "Hz",
                range: ParameterRange::linear(0.0, 22050.0, 0.0),
                output: true,
            },
            ParameterId::PitchConfidence => ParameterInfo {
                name: "Pitch Confidence",
                symbol: "pitchConfidence",
                unit: "%",
                range: ParameterRange::linear(0.0, 100.0, 0.0),
                output: true,
            },
        }
    }
}

impl TryFrom<u32> for ParameterId {
    type Error = Error;

    fn try_from(index: u32) -> Result<Self> {
        ParameterId::ALL
            .iter()
            .copied()
            .find(|id| id.index() == index)
            .ok_or(Error::UnknownParameter(index))
    }
}

/// Shared parameter store. Hosts write through [set](Parameters::set), the
/// processor reads the typed accessors and publishes telemetry.
#[derive(Debug)]
pub struct Parameters {
    sensitivity: AtomicF32,
    confidence_threshold: AtomicF32,
    tolerance: AtomicF32,
    octave: AtomicF32,
    hold_output_pitch: AtomicBool,
    detected_pitch: AtomicF32,
    pitch_confidence: AtomicF32,
}

impl Default for Parameters {
    fn default() -> Self {
        let default = |id: ParameterId| AtomicF32::new(id.info().range.default);
        Parameters {
            sensitivity: default(ParameterId::Sensitivity),
            confidence_threshold: default(ParameterId::ConfidenceThreshold),
            tolerance: default(ParameterId::Tolerance),
            octave: default(ParameterId::Octave),
            hold_output_pitch: AtomicBool::new(
                ParameterId::HoldOutputPitch.info().range.default >= 0.5,
            ),
            detected_pitch: default(ParameterId::DetectedPitch),
            pitch_confidence: default(ParameterId::PitchConfidence),
        }
    }
}

impl Parameters {
    /// Current host value of `id`.
    pub fn get(&self, id: ParameterId) -> f32 {
        match id {
            ParameterId::Sensitivity => self.sensitivity.load(Ordering::Relaxed),
            ParameterId::ConfidenceThreshold => self.confidence_threshold.load(Ordering::Relaxed),
            ParameterId::Tolerance => self.tolerance.load(Ordering::Relaxed),
            ParameterId::Octave => self.octave.load(Ordering::Relaxed),
            ParameterId::HoldOutputPitch => {
                if self.hold_output_pitch.load(Ordering::Relaxed) {
                    1.0
                } else {
                    0.0
                }
            }
            ParameterId::DetectedPitch => self.detected_pitch.load(Ordering::Relaxed),
            ParameterId::PitchConfidence => self.pitch_confidence.load(Ordering::Relaxed),
        }
    }

    /// Set the host value of an input parameter, clamped to its range.
    pub fn set(&self, id: ParameterId, value: f32) -> Result<()> {
        let info = id.info();
        if info.output {
            return Err(Error::ReadOnlyParameter(id));
        }
        let value = info.range.clamp(value);
        match id {
            ParameterId::Sensitivity => self.sensitivity.store(value, Ordering::Relaxed),
            ParameterId::ConfidenceThreshold => {
                self.confidence_threshold.store(value, Ordering::Relaxed)
            }
            ParameterId::Tolerance => self.tolerance.store(value, Ordering::Relaxed),
            ParameterId::Octave => self.octave.store(value, Ordering::Relaxed),
            ParameterId::HoldOutputPitch => {
                self.hold_output_pitch.store(value >= 0.5, Ordering::Relaxed)
            }
            ParameterId::DetectedPitch | ParameterId::PitchConfidence => {}
        }
        Ok(())
    }

    /// Set by host index.
    pub fn set_by_index(&self, index: u32, value: f32) -> Result<()> {
        self.set(ParameterId::try_from(index)?, value)
    }

    pub fn get_by_index(&self, index: u32) -> Result<f32> {
        Ok(self.get(ParameterId::try_from(index)?))
    }

    /// Input gain multiplier.
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity.load(Ordering::Relaxed)
    }

    /// Confidence threshold in `[0, 1]`.
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold.load(Ordering::Relaxed) / 100.0
    }

    /// Detector tolerance in `[0, 1]`.
    pub fn tolerance(&self) -> f32 {
        self.tolerance.load(Ordering::Relaxed) / 100.0
    }

    pub fn octave_shift(&self) -> i32 {
        self.octave.load(Ordering::Relaxed).round() as i32
    }

    pub fn hold_output_pitch(&self) -> bool {
        self.hold_output_pitch.load(Ordering::Relaxed)
    }

    pub fn gate_params(&self) -> GateParams {
        GateParams {
            confidence_threshold: self.confidence_threshold(),
            octave_shift: self.octave_shift(),
            hold_output_pitch: self.hold_output_pitch(),
        }
    }

    /// Last accepted frequency in Hz.
    pub fn detected_pitch(&self) -> f32 {
        self.detected_pitch.load(Ordering::Relaxed)
    }

    /// Last estimate confidence in `[0, 1]`.
    pub fn pitch_confidence(&self) -> f32 {
        self.pitch_confidence.load(Ordering::Relaxed) / 100.0
    }

    pub(crate) fn publish(&self, frequency_hz: f32, confidence: f32) {
        self.detected_pitch.store(frequency_hz, Ordering::Relaxed);
        self.pitch_confidence
            .store(confidence * 100.0, Ordering::Relaxed);
    }
}
