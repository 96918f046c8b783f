//! # Pitch CV
//! *pitch_cv* turns a monophonic audio signal into a pitch control voltage
//! (1V/oct, 0 to 10 V) and a gate, the way a modular-synth "audio to CV"
//! module does. It is meant to run inside a real-time audio callback: after
//! configuration nothing in the processing path allocates, locks or logs.
//!
//! # Pipeline
//!   * [AnalysisWindow][window::AnalysisWindow] gathers host blocks of any size
//!     into a fixed analysis window.
//!   * A [PitchDetector][detector::PitchDetector], by default the FFT based
//!     [YINDetector][detector::yin::YINDetector], estimates frequency and
//!     confidence once per window.
//!   * [HeldState][cv::HeldState] gates the estimate by confidence, maps it
//!     to a voltage and holds it until the next window.
//!   * [PitchToCvProcessor] ties them together with the host lifecycle and
//!     the shared [Parameters].
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use pitch_cv::{ParameterId, Parameters, PitchToCvProcessor, ProcessorConfig};
//!
//! fn main() {
//!     const SAMPLE_RATE: f64 = 48000.0;
//!     const BLOCK: usize = 256;
//!
//!     let params = Arc::new(Parameters::default());
//!     params.set(ParameterId::ConfidenceThreshold, 60.0).unwrap();
//!
//!     let config = ProcessorConfig::default()
//!         .with_sample_rate(SAMPLE_RATE)
//!         .with_block_size(BLOCK);
//!     let mut processor: PitchToCvProcessor =
//!         PitchToCvProcessor::new(config, params.clone()).unwrap();
//!     processor.activate();
//!
//!     // Signal coming from some source (microphone, generated, etc...)
//!     let signal: Vec<f32> = (0..SAMPLE_RATE as usize / 2)
//!         .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / SAMPLE_RATE).sin() as f32)
//!         .collect();
//!
//!     let mut pitch = [0.0; BLOCK];
//!     let mut gate = [0.0; BLOCK];
//!     for block in signal.chunks_exact(BLOCK) {
//!         processor.process(block, &mut pitch, &mut gate);
//!     }
//!
//!     println!("CV: {} V, gate: {}, detected: {} Hz", pitch[0], gate[0], params.detected_pitch());
//! }
//! ```

pub use config::ProcessorConfig;
pub use cv::{frequency_to_cv, HeldState, SignalMode};
pub use detector::{DetectorSettings, Pitch, PitchDetector};
pub use error::{Error, Result};
pub use params::{ParameterId, Parameters};
pub use processor::PitchToCvProcessor;
pub use window::{AnalysisWindow, OverflowPolicy};

pub mod config;
pub mod cv;
pub mod detector;
pub mod error;
pub mod float;
pub mod params;
pub mod processor;
pub mod utils;
pub mod window;
