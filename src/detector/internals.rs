use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::float::Float;
use crate::utils::buffer::{copy_complex_to_real, copy_real_to_complex, new_complex_buffer, square_sum};

/// FFT plans and scratch space for the windowed square error of a signal of
/// fixed length. Everything is allocated once in `new` so that repeated
/// evaluation on the audio thread never touches the allocator.
pub struct SquareErrorKernel<T>
where
    T: Float,
{
    signal_len: usize,
    fft: Arc<dyn Fft<T>>,
    inv_fft: Arc<dyn Fft<T>>,
    signal_complex: Vec<Complex<T>>,
    truncated_complex: Vec<Complex<T>>,
    scratch: Vec<Complex<T>>,
}

impl<T> SquareErrorKernel<T>
where
    T: Float,
{
    pub fn new(signal_len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(signal_len);
        let inv_fft = planner.plan_fft_inverse(signal_len);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(inv_fft.get_inplace_scratch_len());

        SquareErrorKernel {
            signal_len,
            fft,
            inv_fft,
            signal_complex: new_complex_buffer(signal_len),
            truncated_complex: new_complex_buffer(signal_len),
            scratch: new_complex_buffer(scratch_len),
        }
    }

    pub fn signal_len(&self) -> usize {
        self.signal_len
    }
}

/// Compute the windowed autocorrelation of `signal` and put the result in `result`.
/// For a signal _x=(x_0,x_1,...)_, the windowed autocorrelation with window size _w_ is
/// the function
///
/// > r(t) = sum_{i=0}^{w-1} x_i*x_{i+t}
///
/// This function assumes `window_size` is at most half of the length of `signal`.
pub fn windowed_autocorrelation<T>(
    signal: &[T],
    window_size: usize,
    kernel: &mut SquareErrorKernel<T>,
    result: &mut [T],
) where
    T: Float,
{
    assert_eq!(
        signal.len(),
        kernel.signal_len,
        "The kernel was planned for a different signal length"
    );

    let SquareErrorKernel {
        fft,
        inv_fft,
        signal_complex,
        truncated_complex,
        scratch,
        ..
    } = kernel;

    // The cross correlation between the signal and the signal truncated to
    // `0..window_size` is the windowed autocorrelation.
    copy_real_to_complex(signal, signal_complex);
    copy_real_to_complex(&signal[..window_size], truncated_complex);
    fft.process_with_scratch(signal_complex, scratch);
    fft.process_with_scratch(truncated_complex, scratch);
    // rustfft does not normalize; one division by the length covers the forward
    // and inverse transforms together.
    let normalization_const = T::one() / T::from_usize(signal.len()).unwrap_or_else(T::one);
    signal_complex
        .iter_mut()
        .zip(truncated_complex.iter())
        .for_each(|(a, b)| {
            *a = *a * normalization_const * b.conj();
        });
    inv_fft.process_with_scratch(signal_complex, scratch);

    // Valid only for `0..window_size`
    copy_complex_to_real(&signal_complex[..window_size], result);
}

/// Compute the windowed square error, _d(t)_, of `signal`. For a window size of _w_ and a signal
/// _x=(x_0,x_1,...)_, this is defined by
///
///  > d(t) = sum_{i=0}^{w-1} (x_i - x_{i+t})^2
///
/// Computed through the FFT as `pow_0^w + pow_t^{t+w} - 2 r(t)` where `pow_a^b`
/// is the energy of `signal[a..b]`. `window_size` is at most half the signal length.
pub fn windowed_square_error<T>(
    signal: &[T],
    window_size: usize,
    kernel: &mut SquareErrorKernel<T>,
    result: &mut [T],
) where
    T: Float,
{
    assert!(
        2 * window_size <= signal.len(),
        "The window size cannot be more than half the signal length"
    );

    let two = T::one() + T::one();

    windowed_autocorrelation(signal, window_size, kernel, result);
    let power = square_sum(&signal[..window_size]);
    let mut windowed_power = power;

    result
        .iter_mut()
        .take(window_size)
        .enumerate()
        .for_each(|(i, a)| {
            *a = power + windowed_power - two * *a;
            // Slide pow_t^{t+w} to pow_{t+1}^{t+1+w} by its boundary terms.
            windowed_power = windowed_power - signal[i] * signal[i]
                + signal[i + window_size] * signal[i + window_size];
        })
}

/// Calculate the "cumulative mean normalized difference function" of the
/// YIN paper in place. If _d(t)_ is the square error function,
/// _d'(0) = 1_ and for _t > 0_
///
///  > d'(t) = d(t) / [ (1/t) * sum_{i=1}^t d(i) ]
///
/// A lag whose running sum is still zero (silence) is set to 1.
pub fn yin_normalize_square_error<T: Float>(square_error: &mut [T]) {
    if square_error.is_empty() {
        return;
    }
    let mut sum = T::zero();
    square_error[0] = T::one();
    square_error
        .iter_mut()
        .enumerate()
        .skip(1)
        .for_each(|(i, a)| {
            sum = sum + *a;
            *a = if sum > T::zero() {
                *a * T::from_usize(i).unwrap_or_else(T::one) / sum
            } else {
                T::one()
            };
        });
}
