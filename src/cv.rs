//! Frequency to control voltage mapping, confidence gating and
//! sample-and-hold output.
//!
//! Pitch is expressed at one volt per octave with A4 (440 Hz, MIDI note 69)
//! at `69 / 12` volts, clamped to a 0 to 10 volt range.

use crate::detector::Pitch;

pub const CV_MIN: f32 = 0.0;
pub const CV_MAX: f32 = 10.0;

const A4_FREQUENCY: f32 = 440.0;
const A4_NOTE: f32 = 69.0;

/// Map a frequency to a 1V/oct control voltage, shifted by whole octaves and
/// clamped to `[CV_MIN, CV_MAX]`. `frequency_hz` must be positive.
#[inline]
pub fn frequency_to_cv(frequency_hz: f32, octave_shift: i32) -> f32 {
    let note = 12.0 * (frequency_hz / A4_FREQUENCY).log2() + A4_NOTE + 12.0 * octave_shift as f32;
    (note / 12.0).clamp(CV_MIN, CV_MAX)
}

/// What the signal output carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SignalMode {
    /// 1.0 while the latched pitch is confirmed, 0.0 otherwise.
    #[default]
    Gate,
    /// The confidence of the latest estimate.
    Confidence,
}

/// Parameters consulted when an estimate is latched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateParams {
    /// Minimum confidence, in `[0, 1]`.
    pub confidence_threshold: f32,
    pub octave_shift: i32,
    /// Keep the previous pitch when an estimate is rejected.
    pub hold_output_pitch: bool,
}

impl Default for GateParams {
    fn default() -> Self {
        GateParams {
            confidence_threshold: 0.5,
            octave_shift: 0,
            hold_output_pitch: true,
        }
    }
}

/// The latched output, updated only at window boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeldState {
    /// Control voltage in `[CV_MIN, CV_MAX]`.
    pub linear_pitch: f32,
    pub frequency_hz: f32,
    pub confidence: f32,
}

impl HeldState {
    pub fn reset(&mut self) {
        *self = HeldState::default();
    }

    /// Apply an estimate. A pitch is accepted when it is positive and at
    /// least as confident as the threshold; otherwise the held pitch is kept
    /// or cleared depending on `hold_output_pitch`. The confidence is always
    /// recorded. Returns the gate for the boundary block.
    pub fn latch(&mut self, estimate: Pitch<f32>, params: &GateParams) -> f32 {
        self.confidence = estimate.confidence;

        if estimate.frequency > 0.0 && estimate.confidence >= params.confidence_threshold {
            self.linear_pitch = frequency_to_cv(estimate.frequency, params.octave_shift);
            self.frequency_hz = estimate.frequency;
            1.0
        } else {
            if !params.hold_output_pitch {
                self.linear_pitch = 0.0;
                self.frequency_hz = 0.0;
            }
            0.0
        }
    }

    /// Gate for a block without a window boundary: open while a pitch is held.
    pub fn idle_gate(&self) -> f32 {
        if self.linear_pitch > 0.0 {
            1.0
        } else {
            0.0
        }
    }

    /// Broadcast the held values to every sample of the output blocks.
    /// `boundary_gate` is the gate returned by [latch](HeldState::latch) when
    /// a boundary fell inside this block, `None` for an idle block.
    pub fn fill(
        &self,
        mode: SignalMode,
        boundary_gate: Option<f32>,
        pitch_out: &mut [f32],
        signal_out: &mut [f32],
    ) {
        let signal = match mode {
            SignalMode::Gate => boundary_gate.unwrap_or_else(|| self.idle_gate()),
            SignalMode::Confidence => self.confidence.clamp(0.0, 1.0),
        };
        pitch_out.iter_mut().for_each(|s| *s = self.linear_pitch);
        signal_out.iter_mut().for_each(|s| *s = signal);
    }
}
