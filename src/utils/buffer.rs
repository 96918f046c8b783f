use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::float::Float;

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Copy `input` into the real part of `output`, zeroing the imaginary part
/// and everything past `input.len()`.
pub fn copy_real_to_complex<T: Float>(input: &[T], output: &mut [Complex<T>]) {
    assert!(input.len() <= output.len());
    input.iter().zip(output.iter_mut()).for_each(|(i, o)| {
        o.re = *i;
        o.im = T::zero();
    });
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Copy the real part of `input` into `output`, zeroing the rest of `output`.
pub fn copy_complex_to_real<T: Float>(input: &[Complex<T>], output: &mut [T]) {
    assert!(input.len() <= output.len());
    input
        .iter()
        .map(|c| c.re)
        .zip(output.iter_mut())
        .for_each(|(i, o)| *o = i);

    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = T::zero());
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Mean-square level of `arr` in dB, `10 * log10(sum(x^2) / n)`.
/// An empty or all-zero buffer is `-inf`.
pub fn level_db<T: Float>(arr: &[T]) -> f64 {
    if arr.is_empty() {
        return f64::NEG_INFINITY;
    }
    let energy = square_sum(arr).to_f64().unwrap_or(0.0);
    10.0 * (energy / arr.len() as f64).log10()
}

/// Copy `input` into `output` multiplied by `gain`. A unity gain is a plain copy.
pub fn copy_scaled(input: &[f32], output: &mut [f32], gain: f32) {
    if gain == 1.0 {
        output.copy_from_slice(input);
    } else {
        output
            .iter_mut()
            .zip(input)
            .for_each(|(o, &i)| *o = i * gain);
    }
}
