//! Pitch estimators consumed by the streaming processor.
//!
//! A detector receives consecutive hops of audio and answers with a
//! [Pitch] for each. Configuration is fixed at construction: a change of
//! window, hop or sample rate means building a new detector.

use crate::error::{Error, Result};
use crate::float::Float;

pub mod internals;
pub mod yin;

/// The result of one estimator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pitch<T>
where
    T: Float,
{
    /// Fundamental frequency in Hz, `0` when nothing was detected.
    pub frequency: T,
    /// Confidence of the estimate in `[0, 1]`.
    pub confidence: T,
}

impl<T: Float> Pitch<T> {
    pub fn is_voiced(&self) -> bool {
        self.frequency > T::zero()
    }
}

/// Sizes and rate a detector is built for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    /// Number of samples analysed per estimate.
    pub window_size: usize,
    /// Number of new samples handed over per estimate.
    pub hop_size: usize,
    pub sample_rate: f64,
}

impl DetectorSettings {
    pub fn new(window_size: usize, hop_size: usize, sample_rate: f64) -> Self {
        DetectorSettings {
            window_size,
            hop_size,
            sample_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size < 8 {
            return Err(Error::InvalidDetectorSettings(format!(
                "window size {} is smaller than 8 samples",
                self.window_size
            )));
        }
        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err(Error::InvalidDetectorSettings(format!(
                "hop size {} must be within 1..={}",
                self.hop_size, self.window_size
            )));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(Error::InvalidDetectorSettings(format!(
                "sample rate {} must be a positive number",
                self.sample_rate
            )));
        }
        Ok(())
    }
}

pub trait PitchDetector<T>: Sized
where
    T: Float,
{
    /// Build a detector, failing on settings it cannot work with.
    fn new(settings: DetectorSettings) -> Result<Self>;

    fn settings(&self) -> &DetectorSettings;

    /// Estimate the pitch after appending `block` (of `hop_size` samples) to
    /// the analysed history.
    fn get_pitch(&mut self, block: &[T]) -> Pitch<T>;

    fn tolerance(&self) -> T;

    /// Algorithm specific sensitivity knob.
    fn set_tolerance(&mut self, tolerance: T);

    /// Level in dB below which input is treated as silence.
    fn silence_threshold(&self) -> T;

    fn set_silence_threshold(&mut self, threshold_db: T);

    /// Forget the analysed history, as if no block had been seen.
    fn reset(&mut self);
}
