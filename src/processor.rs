//! The streaming pitch-to-CV processor.
//!
//! Every audio callback hands a block of input to [PitchToCvProcessor::process],
//! which accumulates it into the analysis window, runs the detector whenever
//! the window fills, and writes a pitch CV and a gate (or confidence) signal
//! for the whole block from the held state.
//!
//! `process` runs in bounded time without allocating, locking or logging.
//! Reconfiguration allocates and must be serialized with processing by the
//! host, which the `&mut self` receivers enforce.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::ProcessorConfig;
use crate::cv::HeldState;
use crate::detector::yin::YINDetector;
use crate::detector::PitchDetector;
use crate::error::Result;
use crate::params::Parameters;
use crate::window::AnalysisWindow;

pub struct PitchToCvProcessor<D = YINDetector<f32>>
where
    D: PitchDetector<f32>,
{
    config: ProcessorConfig,
    params: Arc<Parameters>,
    window: AnalysisWindow,
    detector: D,
    held: HeldState,
}

impl<D> PitchToCvProcessor<D>
where
    D: PitchDetector<f32>,
{
    pub fn new(config: ProcessorConfig, params: Arc<Parameters>) -> Result<Self> {
        config.validate()?;
        let detector = Self::build_detector(&config, params.tolerance(), config.silence_threshold_db)?;
        let window = AnalysisWindow::new(config.analysis_capacity()?, config.overflow);

        info!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            capacity = window.capacity(),
            "Created pitch-to-CV processor"
        );

        Ok(PitchToCvProcessor {
            config,
            params,
            window,
            detector,
            held: HeldState::default(),
        })
    }

    fn build_detector(config: &ProcessorConfig, tolerance: f32, silence_threshold_db: f32) -> Result<D> {
        let settings = config.detector_settings()?;
        let mut detector = D::new(settings)?;
        detector.set_tolerance(tolerance);
        detector.set_silence_threshold(silence_threshold_db);
        debug!(
            window_size = settings.window_size,
            hop_size = settings.hop_size,
            sample_rate = settings.sample_rate,
            tolerance,
            "Built pitch detector"
        );
        Ok(detector)
    }

    /// Apply a new configuration. The detector is rebuilt, keeping its
    /// tolerance and silence threshold, and the analysis window is
    /// reallocated. On error nothing changes.
    pub fn configure(&mut self, config: ProcessorConfig) -> Result<()> {
        let built = config.validate().and_then(|_| {
            let capacity = config.analysis_capacity()?;
            let detector = Self::build_detector(
                &config,
                self.detector.tolerance(),
                self.detector.silence_threshold(),
            )?;
            Ok((capacity, detector))
        });
        let (capacity, detector) = match built {
            Ok(built) => built,
            Err(e) => {
                error!("Failed to reconfigure pitch-to-CV processor: {}", e);
                return Err(e);
            }
        };

        self.detector = detector;
        if config.overflow == self.window.policy() {
            self.window.configure(capacity);
        } else {
            self.window = AnalysisWindow::new(capacity, config.overflow);
        }
        debug!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            capacity = self.window.capacity(),
            "Reconfigured analysis window"
        );
        self.config = config;
        Ok(())
    }

    /// Host hook: the maximum block size changed.
    pub fn buffer_size_changed(&mut self, block_size: usize) -> Result<()> {
        let config = self.config.clone().with_block_size(block_size);
        self.configure(config)
    }

    /// Host hook: the sample rate changed.
    pub fn sample_rate_changed(&mut self, sample_rate: f64) -> Result<()> {
        let config = self.config.clone().with_sample_rate(sample_rate);
        self.configure(config)
    }

    /// Host hook: processing is about to start. Rewinds the window, clears
    /// the held output and the detector history.
    pub fn activate(&mut self) {
        self.window.reset();
        self.detector.reset();
        self.held.reset();
        self.params.publish(0.0, 0.0);
    }

    /// Host hook: processing stopped.
    pub fn deactivate(&mut self) {}

    /// Process one callback block. `pitch_out` and `signal_out` receive one
    /// value per input sample.
    pub fn process(&mut self, input: &[f32], pitch_out: &mut [f32], signal_out: &mut [f32]) {
        debug_assert_eq!(input.len(), pitch_out.len());
        debug_assert_eq!(input.len(), signal_out.len());

        let tolerance = self.params.tolerance();
        if tolerance != self.detector.tolerance() {
            self.detector.set_tolerance(tolerance);
        }
        let sensitivity = self.params.sensitivity();
        let gate_params = self.params.gate_params();

        // Blocks above the negotiated maximum are split so the window never
        // receives more than its capacity at once.
        let mut boundary_gate = None;
        for chunk in input.chunks(self.window.capacity()) {
            if self.window.absorb(chunk, sensitivity) {
                let estimate = self.detector.get_pitch(self.window.samples());
                boundary_gate = Some(self.held.latch(estimate, &gate_params));
                self.params
                    .publish(self.held.frequency_hz, self.held.confidence);
            }
        }

        self.held
            .fill(self.config.signal_mode, boundary_gate, pitch_out, signal_out);
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn parameters(&self) -> &Arc<Parameters> {
        &self.params
    }

    pub fn held_state(&self) -> HeldState {
        self.held
    }

    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    pub fn write_position(&self) -> usize {
        self.window.write_position()
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }
}
