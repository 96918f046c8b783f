use std::path::{Path, PathBuf};
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use pitch_cv::detector::yin::YINDetector;
use pitch_cv::detector::{DetectorSettings, PitchDetector};
use pitch_cv::float::Float;
use pitch_cv::utils::buffer::new_real_buffer;
use pitch_cv::{OverflowPolicy, ParameterId, Parameters, PitchToCvProcessor, ProcessorConfig};

const SAMPLE_RATE: usize = 48000;

#[test]
fn yin_sin_signal() {
    pure_frequency(String::from("sin"), 440.0);
}

#[test]
fn yin_square_signal() {
    pure_frequency(String::from("square"), 440.0);
}

#[test]
fn yin_triangle_signal() {
    pure_frequency(String::from("triangle"), 440.0);
}

#[test]
fn yin_low_sin_signal() {
    pure_frequency(String::from("sin"), 82.41);
}

#[test]
fn processor_tracks_a_sine() {
    let (pitch, gate) = stream(&sin_wave::<f32>(440.0, SAMPLE_RATE, SAMPLE_RATE), 256, Parameters::default());
    assert_abs_diff_eq!(pitch, 69.0 / 12.0, epsilon = 0.01);
    assert_eq!(gate, 1.0);
}

#[test]
fn processor_applies_the_octave_shift() {
    let params = Parameters::default();
    params.set(ParameterId::Octave, 2.0).unwrap();
    let (pitch, _) = stream(&triangle_wave::<f32>(440.0, SAMPLE_RATE, SAMPLE_RATE), 128, params);
    assert_abs_diff_eq!(pitch, 69.0 / 12.0 + 2.0, epsilon = 0.01);
}

#[test]
fn processor_holds_pitch_through_silence() {
    let mut signal = sin_wave::<f32>(330.0, SAMPLE_RATE / 2, SAMPLE_RATE);
    signal.extend(new_real_buffer::<f32>(SAMPLE_RATE / 2));

    // The stream ends on an idle block, where the gate follows the held pitch.
    let (pitch, gate) = stream(&signal, 256, Parameters::default());
    assert_abs_diff_eq!(pitch, frequency_cv(330.0), epsilon = 0.01);
    assert_eq!(gate, 1.0);
}

#[test]
fn processor_clears_pitch_through_silence_without_hold() {
    let mut signal = sin_wave::<f32>(330.0, SAMPLE_RATE / 2, SAMPLE_RATE);
    signal.extend(new_real_buffer::<f32>(SAMPLE_RATE / 2));

    let params = Parameters::default();
    params.set(ParameterId::HoldOutputPitch, 0.0).unwrap();
    let (pitch, gate) = stream(&signal, 256, params);
    assert_eq!(pitch, 0.0);
    assert_eq!(gate, 0.0);
}

#[test]
fn sensitivity_lifts_quiet_input_over_the_silence_threshold() {
    // About -49 dB, under the -30 dB silence threshold.
    let quiet: Vec<f32> = sin_wave::<f32>(440.0, SAMPLE_RATE, SAMPLE_RATE)
        .iter()
        .map(|s| s * 0.005)
        .collect();

    let (pitch, gate) = stream(&quiet, 256, Parameters::default());
    assert_eq!(pitch, 0.0);
    assert_eq!(gate, 0.0);

    let params = Parameters::default();
    params.set(ParameterId::Sensitivity, 100.0).unwrap();
    let (pitch, gate) = stream(&quiet, 256, params);
    assert_abs_diff_eq!(pitch, 69.0 / 12.0, epsilon = 0.01);
    assert_eq!(gate, 1.0);
}

#[test]
fn processor_follows_a_sample_rate_change() {
    let params = Arc::new(Parameters::default());
    let mut processor: PitchToCvProcessor =
        PitchToCvProcessor::new(ProcessorConfig::default(), params.clone()).unwrap();
    processor.activate();
    processor.sample_rate_changed(96000.0).unwrap();
    assert_eq!(processor.capacity(), 4096);

    let signal = sin_wave::<f32>(440.0, 96000, 96000);
    let mut pitch = vec![0.0; 512];
    let mut gate = vec![0.0; 512];
    for block in signal.chunks_exact(512) {
        processor.process(block, &mut pitch, &mut gate);
    }
    assert_abs_diff_eq!(pitch[0], 69.0 / 12.0, epsilon = 0.01);
    assert_abs_diff_eq!(params.detected_pitch(), 440.0, epsilon = 1.5);
    assert!(params.pitch_confidence() > 0.9);
}

#[test]
fn reactivation_starts_from_a_clean_history() {
    let params = Arc::new(Parameters::default());
    let mut processor: PitchToCvProcessor =
        PitchToCvProcessor::new(ProcessorConfig::default(), params.clone()).unwrap();
    processor.activate();

    let signal = sin_wave::<f32>(440.0, SAMPLE_RATE / 2, SAMPLE_RATE);
    let mut pitch = vec![0.0; 256];
    let mut gate = vec![0.0; 256];
    for block in signal.chunks_exact(256) {
        processor.process(block, &mut pitch, &mut gate);
    }
    assert!(params.pitch_confidence() > 0.9);

    processor.deactivate();
    processor.activate();
    let silence = vec![0.0; 256];
    for _ in 0..processor.capacity() / 256 {
        processor.process(&silence, &mut pitch, &mut gate);
    }
    assert_eq!(params.detected_pitch(), 0.0);
    assert_eq!(params.pitch_confidence(), 0.0);
    assert_eq!(pitch[0], 0.0);
    assert_eq!(gate[0], 0.0);
}

#[test]
fn carry_policy_tracks_odd_block_sizes() {
    // 300 does not divide the analysis window. Carrying the overflow keeps
    // every window contiguous.
    let params = Arc::new(Parameters::default());
    let config = ProcessorConfig::default()
        .with_block_size(300)
        .with_overflow(OverflowPolicy::Carry);
    let mut processor: PitchToCvProcessor = PitchToCvProcessor::new(config, params).unwrap();

    let signal = square_wave::<f32>(220.0, SAMPLE_RATE, SAMPLE_RATE);
    let mut pitch = vec![0.0; 300];
    let mut gate = vec![0.0; 300];
    for block in signal.chunks_exact(300) {
        processor.process(block, &mut pitch, &mut gate);
    }
    assert_abs_diff_eq!(pitch[0], 57.0 / 12.0, epsilon = 0.01);
    assert_eq!(gate[0], 1.0);
}

#[test]
fn truncated_blocks_keep_the_output_well_formed() {
    let signal = sin_wave::<f32>(440.0, SAMPLE_RATE, SAMPLE_RATE);
    let (pitch, gate) = stream(&signal, 300, Parameters::default());
    assert!((0.0..=10.0).contains(&pitch));
    assert!(gate == 0.0 || gate == 1.0);
}

#[test]
fn wav_file_through_the_processor() {
    let path = temp_wav_path("a3-sine.wav");
    write_wav(&path, &sin_wave::<f64>(220.0, SAMPLE_RATE, SAMPLE_RATE));
    let signal = wav_file_to_signal(&path);
    std::fs::remove_file(&path).ok();

    assert_eq!(signal.len(), SAMPLE_RATE);
    let (pitch, gate) = stream(&signal, 512, Parameters::default());
    assert_abs_diff_eq!(pitch, 57.0 / 12.0, epsilon = 0.01);
    assert_eq!(gate, 1.0);
}

/// Run `signal` through a default processor in blocks of `block_size` and
/// return the last pitch and gate values.
fn stream(signal: &[f32], block_size: usize, params: Parameters) -> (f32, f32) {
    let config = ProcessorConfig::default()
        .with_sample_rate(SAMPLE_RATE as f64)
        .with_block_size(block_size);
    let mut processor: PitchToCvProcessor =
        PitchToCvProcessor::new(config, Arc::new(params)).unwrap();
    processor.activate();

    let mut pitch = vec![0.0; block_size];
    let mut gate = vec![0.0; block_size];
    for block in signal.chunks_exact(block_size) {
        processor.process(block, &mut pitch, &mut gate);
        // Zero-order hold: a block never varies internally.
        assert!(pitch.iter().all(|&p| p == pitch[0]));
        assert!(gate.iter().all(|&g| g == gate[0]));
    }
    (pitch[0], gate[0])
}

fn frequency_cv(freq: f32) -> f32 {
    (12.0 * (freq / 440.0).log2() + 69.0) / 12.0
}

fn temp_wav_path(file_name: &str) -> PathBuf {
    let mut d = std::env::temp_dir();
    d.push(format!("pitch-cv-{}-{}", std::process::id(), file_name));
    d
}

fn write_wav(path: &Path, signal: &[f64]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for s in signal {
        writer
            .write_sample((s * 0.8 * i16::MAX as f64) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

fn wav_file_to_signal(path: &Path) -> Vec<f32> {
    let mut reader = hound::WavReader::open(path).unwrap();
    assert_eq!(reader.spec().sample_rate as usize, SAMPLE_RATE);
    reader
        .samples::<i16>()
        .map(|s| s.unwrap() as f32 / i16::MAX as f32)
        .collect()
}

fn sin_wave<T: Float>(freq: f64, size: usize, sample_rate: usize) -> Vec<T> {
    let mut signal = new_real_buffer(size);
    let two_pi = 2.0 * std::f64::consts::PI;
    let dx = two_pi * freq / sample_rate as f64;
    for i in 0..size {
        let x = i as f64 * dx;
        let y = x.sin();
        signal[i] = T::from(y).unwrap();
    }
    signal
}

fn square_wave<T: Float>(freq: f64, size: usize, sample_rate: usize) -> Vec<T> {
    let mut signal = new_real_buffer(size);
    let period = sample_rate as f64 / freq;

    for i in 0..size {
        let x = i as f64 / period;
        let frac = x - x.floor();
        let y = match frac >= 0.5 {
            true => -1.0,
            false => 1.0,
        };
        signal[i] = T::from(y).unwrap();
    }
    signal
}

fn triangle_wave<T: Float>(freq: f64, size: usize, sample_rate: usize) -> Vec<T> {
    let mut signal = new_real_buffer(size);
    let period = sample_rate as f64 / freq;

    for i in 0..size {
        let x = i as f64 / period;
        let frac = x - x.floor();
        let y = match frac {
            f if f >= 0. && f < 0.25 => 4. * f,
            f if f >= 0.25 && f < 0.75 => 1. - 4. * (f - 0.25),
            f if f >= 0.75 && f < 1. => -1. + 4. * (f - 0.75),
            _ => panic!("Should be between 0 and 1"),
        };
        signal[i] = T::from(y).unwrap();
    }
    signal
}

fn signal_factory<T: Float>(name: String, freq: f64, size: usize, sample_rate: usize) -> Vec<T> {
    match name.as_ref() {
        "sin" => {
            return sin_wave(freq, size, sample_rate);
        }
        "square" => {
            return square_wave(freq, size, sample_rate);
        }
        "triangle" => {
            return triangle_wave(freq, size, sample_rate);
        }
        _ => {
            panic!("Unknown wave function {}", name);
        }
    }
}

/// Stream a pure tone through the detector hop by hop and check every
/// estimate once the history is full.
fn pure_frequency(wave_name: String, freq_in: f64) {
    const DURATION: f64 = 1.0;
    const SAMPLE_SIZE: usize = (SAMPLE_RATE as f64 * DURATION) as usize;
    const WINDOW: usize = 4096;
    const HOP: usize = WINDOW / 4;

    let signal = signal_factory::<f64>(wave_name, freq_in, SAMPLE_SIZE, SAMPLE_RATE);

    let mut detector =
        YINDetector::<f64>::new(DetectorSettings::new(WINDOW, HOP, SAMPLE_RATE as f64)).unwrap();

    for (i, hop) in signal.chunks_exact(HOP).enumerate() {
        let pitch = detector.get_pitch(hop);
        if (i + 1) * HOP < WINDOW {
            continue;
        }

        let frequency = pitch.frequency;
        let idx = SAMPLE_RATE as f64 / frequency;
        let epsilon = (SAMPLE_RATE as f64 / (idx - 1.0)) - frequency;
        println!(
            "Chosen idx: {}; confidence: {}; freq: {} +/- {}",
            idx, pitch.confidence, frequency, epsilon
        );
        assert!(frequency > 0.0, "No pitch accepted");
        assert!((frequency - freq_in).abs() < 2. * epsilon);
        assert!(pitch.confidence > 0.8);
    }
}
