//! The YIN pitch detection algorithm is based on the algorithm from the paper
//! *[YIN, a fundamental frequency estimator for speech and music](http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf)*.
//!
//! Let $S=(s_0,s_1,\ldots,s_N)$ be a discrete signal. The *square difference function* at lag $t$
//! is defined by
//! $$ d(t) = \sum_{i=0}^{W-1} (s_i-s_{i+t})^2. $$
//! The YIN algorithm normalizes it into the *cumulative mean normalized difference function*,
//! $$ d\'(t) = \begin{cases}1&\text{if }t=0\\\\ d(t) / \left[ \tfrac{1}{t}\sum_{i=1}^t d(i) \right] & \text{otherwise}\end{cases}, $$
//! and searches for the first local minimum of $d\'(t)$ below a tolerance.
//!
//! ## Implementation
//! [YINDetector] is a streaming detector: it keeps the last `window_size`
//! samples and every call slides `hop_size` new samples in. The difference
//! function is computed through an [FFT](https://en.wikipedia.org/wiki/Fast_Fourier_transform)
//! whose plans and buffers are created once, so estimating never allocates.
//! The chosen lag is refined with quadratic interpolation.
//!
//! Confidence is `1 - d'(t)` at the chosen lag, or at the global minimum when
//! no lag passed the tolerance, in which case the frequency is zero. A hop
//! whose level is under the silence threshold also reports zero frequency.

use crate::detector::internals::{windowed_square_error, yin_normalize_square_error, SquareErrorKernel};
use crate::detector::{DetectorSettings, Pitch, PitchDetector};
use crate::error::Result;
use crate::float::Float;
use crate::utils::buffer::{level_db, new_real_buffer};
use crate::utils::peak::{first_dip_below, min_index, refine_extremum};

pub const DEFAULT_TOLERANCE: f64 = 0.15;
pub const DEFAULT_SILENCE_THRESHOLD_DB: f64 = -30.0;

pub struct YINDetector<T>
where
    T: Float,
{
    settings: DetectorSettings,
    tolerance: T,
    silence_threshold: T,
    history: Vec<T>,
    kernel: SquareErrorKernel<T>,
    difference: Vec<T>,
}

impl<T> YINDetector<T>
where
    T: Float,
{
    /// Number of lags examined, which bounds the lowest detectable frequency
    /// to `sample_rate / lag_count`.
    pub fn lag_count(&self) -> usize {
        self.difference.len()
    }

    fn slide_in(&mut self, block: &[T]) {
        let len = self.history.len();
        let block = &block[block.len().saturating_sub(len)..];
        self.history.copy_within(block.len().., 0);
        self.history[len - block.len()..].copy_from_slice(block);
    }

    fn float(value: f64) -> T {
        T::from_f64(value).unwrap_or_else(T::zero)
    }
}

/// Pitch detection based on the YIN algorithm. See <http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf>
impl<T> PitchDetector<T> for YINDetector<T>
where
    T: Float,
{
    fn new(settings: DetectorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(YINDetector {
            settings,
            tolerance: Self::float(DEFAULT_TOLERANCE),
            silence_threshold: Self::float(DEFAULT_SILENCE_THRESHOLD_DB),
            history: new_real_buffer(settings.window_size),
            kernel: SquareErrorKernel::new(settings.window_size),
            difference: new_real_buffer(settings.window_size / 2),
        })
    }

    fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    fn get_pitch(&mut self, block: &[T]) -> Pitch<T> {
        debug_assert_eq!(block.len(), self.settings.hop_size);
        self.slide_in(block);

        let lag_count = self.difference.len();
        windowed_square_error(&self.history, lag_count, &mut self.kernel, &mut self.difference);
        yin_normalize_square_error(&mut self.difference);

        let dip = first_dip_below(&self.difference, self.tolerance);
        let lag = match dip.or_else(|| min_index(&self.difference)) {
            Some(lag) => lag,
            None => return Pitch::default(),
        };

        let confidence = (T::one() - self.difference[lag])
            .max(T::zero())
            .min(T::one());

        let silent = level_db(block) < self.silence_threshold.to_f64().unwrap_or(f64::NEG_INFINITY);
        let frequency = match dip {
            Some(lag) if !silent => {
                let period = refine_extremum(&self.difference, lag);
                if period > T::zero() {
                    Self::float(self.settings.sample_rate) / period
                } else {
                    T::zero()
                }
            }
            _ => T::zero(),
        };

        Pitch {
            frequency,
            confidence,
        }
    }

    fn tolerance(&self) -> T {
        self.tolerance
    }

    fn set_tolerance(&mut self, tolerance: T) {
        self.tolerance = tolerance;
    }

    fn silence_threshold(&self) -> T {
        self.silence_threshold
    }

    fn set_silence_threshold(&mut self, threshold_db: T) {
        self.silence_threshold = threshold_db;
    }

    fn reset(&mut self) {
        self.history.iter_mut().for_each(|s| *s = T::zero());
    }
}
