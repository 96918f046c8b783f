//! Processor configuration.

use crate::cv::SignalMode;
use crate::detector::DetectorSettings;
use crate::error::{Error, Result};
use crate::window::OverflowPolicy;

/// Largest analysis window, in samples.
pub const MAX_ANALYSIS_SIZE: usize = 1 << 20;
/// Largest detector window as a multiple of the analysis window.
pub const MAX_WINDOW_FACTOR: usize = 16;

/// Static configuration of a [PitchToCvProcessor](crate::processor::PitchToCvProcessor).
/// Host-driven fields (`sample_rate`, `block_size`) change through the
/// processor's lifecycle hooks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ProcessorConfig {
    pub sample_rate: f64,
    /// Largest block the host delivers per callback.
    pub block_size: usize,
    /// Shortest analysis window, in seconds.
    pub min_analysis_duration: f64,
    /// Detector window length as a multiple of the analysis window.
    pub window_factor: usize,
    /// Input level in dB under which the detector reports no pitch.
    pub silence_threshold_db: f32,
    pub overflow: OverflowPolicy,
    pub signal_mode: SignalMode,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            block_size: 256,
            min_analysis_duration: 0.04,
            window_factor: 2,
            silence_threshold_db: -30.0,
            overflow: OverflowPolicy::Truncate,
            signal_mode: SignalMode::Gate,
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.block_size == 0 {
            return Err(Error::InvalidConfig("block_size must be greater than 0".into()));
        }
        if !self.min_analysis_duration.is_finite() || self.min_analysis_duration <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_analysis_duration {} must be a positive number of seconds",
                self.min_analysis_duration
            )));
        }
        if self.block_size > MAX_ANALYSIS_SIZE {
            return Err(Error::InvalidConfig(format!(
                "block_size {} exceeds {} samples",
                self.block_size, MAX_ANALYSIS_SIZE
            )));
        }
        if self.window_factor == 0 || self.window_factor > MAX_WINDOW_FACTOR {
            return Err(Error::InvalidConfig(format!(
                "window_factor {} out of range (1-{})",
                self.window_factor, MAX_WINDOW_FACTOR
            )));
        }
        if !self.silence_threshold_db.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "silence_threshold_db {} must be finite",
                self.silence_threshold_db
            )));
        }
        self.detector_settings().map(|_| ())
    }

    /// Smallest analysis window for the sample rate, rounded up to a power of two.
    pub fn min_analysis_size(&self) -> Result<usize> {
        let samples = (self.sample_rate * self.min_analysis_duration).ceil();
        // Also rejects NaN.
        if !(samples <= MAX_ANALYSIS_SIZE as f64) {
            return Err(Error::InvalidConfig(format!(
                "min_analysis_duration {} s needs more than {} samples",
                self.min_analysis_duration, MAX_ANALYSIS_SIZE
            )));
        }
        (samples as usize)
            .max(1)
            .checked_next_power_of_two()
            .filter(|&size| size <= MAX_ANALYSIS_SIZE)
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "minimum analysis size for {} s exceeds {} samples",
                    self.min_analysis_duration, MAX_ANALYSIS_SIZE
                ))
            })
    }

    /// Analysis window capacity: the larger of the host block and the
    /// minimum analysis size.
    pub fn analysis_capacity(&self) -> Result<usize> {
        let capacity = self.block_size.max(self.min_analysis_size()?);
        if capacity > MAX_ANALYSIS_SIZE {
            return Err(Error::InvalidConfig(format!(
                "analysis capacity {} exceeds {} samples",
                capacity, MAX_ANALYSIS_SIZE
            )));
        }
        Ok(capacity)
    }

    /// Detector settings: one analysis window per hop.
    pub fn detector_settings(&self) -> Result<DetectorSettings> {
        let capacity = self.analysis_capacity()?;
        let window_size = capacity.checked_mul(self.window_factor).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "detector window of {} x {} samples overflows",
                capacity, self.window_factor
            ))
        })?;
        Ok(DetectorSettings::new(window_size, capacity, self.sample_rate))
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_min_analysis_duration(mut self, seconds: f64) -> Self {
        self.min_analysis_duration = seconds;
        self
    }

    pub fn with_window_factor(mut self, factor: usize) -> Self {
        self.window_factor = factor;
        self
    }

    pub fn with_silence_threshold_db(mut self, threshold_db: f32) -> Self {
        self.silence_threshold_db = threshold_db;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_signal_mode(mut self, signal_mode: SignalMode) -> Self {
        self.signal_mode = signal_mode;
        self
    }
}
