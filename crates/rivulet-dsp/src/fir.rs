//! Windowed-sinc FIR design and convolution.
//!
//! Two forms of filtering live here:
//!
//! - [`convolve`] is stateless. Samples before the start of the buffer are
//!   taken as zero, so every call starts from silence.
//! - [`StreamingFir`] keeps the last `M` inputs in a ring buffer, so a signal
//!   split into consecutive blocks produces exactly the output of one
//!   [`convolve`] call over the concatenation.
//!
//! # Design
//!
//! For `order` taps, `M = order - 1` and `fc = cutoff / sample_rate`:
//!
//! ```text
//! h[n] = 2·fc·sinc(2·fc·(n − M/2)) · (0.54 − 0.46·cos(2πn/M))
//! ```
//!
//! The taps are normalized to sum to one (unity DC gain). Highpass filters
//! are obtained by spectral inversion after normalization: negate every tap,
//! then add one at the center tap `M/2`.

use std::f64::consts::PI;
use thiserror::Error;

/// Response type produced by [`design`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Passes frequencies below the cutoff.
    Lowpass,
    /// Passes frequencies above the cutoff.
    Highpass,
}

/// Errors raised by FIR coefficient design.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DesignError {
    /// Fewer than two taps requested.
    #[error("filter order must be at least 2, got {0}")]
    OrderTooSmall(usize),

    /// Sample rate is zero, negative or not finite.
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    /// Cutoff outside the open interval (0, Nyquist).
    #[error("cutoff {cutoff} Hz must lie strictly between 0 and {nyquist} Hz")]
    CutoffOutOfRange {
        /// Requested cutoff in Hz.
        cutoff: f32,
        /// Nyquist frequency for the given sample rate.
        nyquist: f32,
    },

    /// Bandpass edges given in the wrong order.
    #[error("band edges must satisfy low < high, got {low}..{high} Hz")]
    InvertedBand {
        /// Lower edge in Hz.
        low: f32,
        /// Upper edge in Hz.
        high: f32,
    },
}

/// Symmetric Hamming window value for tap `n` of a filter with `M = m`.
pub fn hamming(n: usize, m: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    0.54 - 0.46 * (2.0 * PI * n as f64 / m as f64).cos()
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn check_cutoff(cutoff: f32, sample_rate: f32) -> Result<(), DesignError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(DesignError::InvalidSampleRate(sample_rate));
    }
    let nyquist = sample_rate / 2.0;
    if !(cutoff > 0.0 && cutoff < nyquist) {
        return Err(DesignError::CutoffOutOfRange { cutoff, nyquist });
    }
    Ok(())
}

/// Design windowed-sinc FIR coefficients.
///
/// Coefficients are computed in f64 and returned as f32.
pub fn design(
    kind: FilterKind,
    order: usize,
    cutoff: f32,
    sample_rate: f32,
) -> Result<Vec<f32>, DesignError> {
    if order < 2 {
        return Err(DesignError::OrderTooSmall(order));
    }
    check_cutoff(cutoff, sample_rate)?;

    let m = order - 1;
    let fc = f64::from(cutoff) / f64::from(sample_rate);
    let half = m as f64 / 2.0;

    let mut taps: Vec<f64> = (0..order)
        .map(|n| 2.0 * fc * sinc(2.0 * fc * (n as f64 - half)) * hamming(n, m))
        .collect();

    let sum: f64 = taps.iter().sum();
    if sum.abs() > f64::EPSILON {
        for tap in &mut taps {
            *tap /= sum;
        }
    }

    if kind == FilterKind::Highpass {
        for tap in &mut taps {
            *tap = -*tap;
        }
        taps[m / 2] += 1.0;
    }

    Ok(taps.into_iter().map(|t| t as f32).collect())
}

/// Lowpass coefficients with unity DC gain.
pub fn lowpass_coefficients(
    order: usize,
    cutoff: f32,
    sample_rate: f32,
) -> Result<Vec<f32>, DesignError> {
    design(FilterKind::Lowpass, order, cutoff, sample_rate)
}

/// Highpass coefficients by spectral inversion of the lowpass design.
pub fn highpass_coefficients(
    order: usize,
    cutoff: f32,
    sample_rate: f32,
) -> Result<Vec<f32>, DesignError> {
    design(FilterKind::Highpass, order, cutoff, sample_rate)
}

/// Bandpass coefficients: lowpass at `high` minus lowpass at `low`.
///
/// Convolution is linear, so filtering with these taps equals the difference
/// of the two lowpass-filtered copies computed by [`bandpass`].
pub fn bandpass_coefficients(
    order: usize,
    low: f32,
    high: f32,
    sample_rate: f32,
) -> Result<Vec<f32>, DesignError> {
    if low >= high {
        return Err(DesignError::InvertedBand { low, high });
    }
    let upper = lowpass_coefficients(order, high, sample_rate)?;
    let lower = lowpass_coefficients(order, low, sample_rate)?;
    Ok(upper.iter().zip(&lower).map(|(u, l)| u - l).collect())
}

/// Stateless FIR convolution.
///
/// `output[n] = Σ_{k=0}^{min(n, M-1)} coeffs[k] · input[n-k]`. The output has
/// the same length as the input.
pub fn convolve(input: &[f32], coeffs: &[f32]) -> Vec<f32> {
    (0..input.len())
        .map(|n| {
            coeffs
                .iter()
                .take(n + 1)
                .enumerate()
                .map(|(k, &c)| c * input[n - k])
                .sum::<f32>()
        })
        .collect()
}

/// Bandpass a buffer as the difference of two lowpass-filtered copies.
pub fn bandpass(
    input: &[f32],
    order: usize,
    low: f32,
    high: f32,
    sample_rate: f32,
) -> Result<Vec<f32>, DesignError> {
    if low >= high {
        return Err(DesignError::InvertedBand { low, high });
    }
    let upper = convolve(input, &lowpass_coefficients(order, high, sample_rate)?);
    let lower = convolve(input, &lowpass_coefficients(order, low, sample_rate)?);
    Ok(upper.iter().zip(&lower).map(|(u, l)| u - l).collect())
}

/// FIR filter with a ring buffer of past inputs.
///
/// History survives between [`process_block`](Self::process_block) calls,
/// which is what the execution engine stores in a node's runtime state.
#[derive(Debug, Clone)]
pub struct StreamingFir {
    coeffs: Vec<f32>,
    history: Vec<f32>,
    pos: usize,
}

impl StreamingFir {
    /// Creates a filter with zeroed history.
    pub fn new(coeffs: Vec<f32>) -> Self {
        let len = coeffs.len().max(1);
        Self {
            coeffs,
            history: vec![0.0; len],
            pos: 0,
        }
    }

    /// The filter taps.
    pub fn coefficients(&self) -> &[f32] {
        &self.coeffs
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let len = self.history.len();
        self.history[self.pos] = input;

        let mut acc = 0.0;
        let mut idx = self.pos;
        for &c in &self.coeffs {
            acc += c * self.history[idx];
            idx = if idx == 0 { len - 1 } else { idx - 1 };
        }

        self.pos = (self.pos + 1) % len;
        acc
    }

    /// Filters a block into a freshly allocated output buffer.
    pub fn process_block(&mut self, input: &[f32]) -> Vec<f32> {
        input.iter().map(|&x| self.process(x)).collect()
    }

    /// Clears the history to silence.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(coeffs: &[f32]) -> f64 {
        coeffs.iter().map(|&c| f64::from(c)).sum()
    }

    #[test]
    fn lowpass_has_unity_dc_gain() {
        for order in [2, 3, 16, 63, 64, 255] {
            let coeffs = lowpass_coefficients(order, 500.0, 48000.0).unwrap();
            assert_eq!(coeffs.len(), order);
            assert!((sum(&coeffs) - 1.0).abs() < 1e-6, "order {order}");
        }
    }

    #[test]
    fn lowpass_is_symmetric() {
        let coeffs = lowpass_coefficients(31, 2000.0, 48000.0).unwrap();
        for i in 0..coeffs.len() / 2 {
            assert!((coeffs[i] - coeffs[coeffs.len() - 1 - i]).abs() < 1e-7);
        }
    }

    #[test]
    fn highpass_has_zero_dc_gain() {
        let coeffs = highpass_coefficients(65, 1000.0, 48000.0).unwrap();
        assert!(sum(&coeffs).abs() < 1e-6);
    }

    #[test]
    fn highpass_blocks_dc_input() {
        let coeffs = highpass_coefficients(33, 1000.0, 48000.0).unwrap();
        let out = convolve(&vec![1.0; 2048], &coeffs);
        for &y in &out[1024..] {
            assert!(y.abs() < 1e-5, "DC leaked: {y}");
        }
    }

    #[test]
    fn convolve_with_impulse_returns_coefficients() {
        let coeffs = [0.5, 0.25, 0.125];
        let mut impulse = vec![0.0; 6];
        impulse[0] = 1.0;
        let out = convolve(&impulse, &coeffs);
        assert_eq!(out, vec![0.5, 0.25, 0.125, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn convolve_starts_from_silence() {
        let out = convolve(&[1.0, 1.0], &[1.0, 1.0, 1.0]);
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn bandpass_matches_coefficient_difference() {
        let input: Vec<f32> = (0..512).map(|i| ((i * 7919) % 97) as f32 / 97.0 - 0.5).collect();
        let direct = bandpass(&input, 41, 800.0, 3000.0, 48000.0).unwrap();
        let taps = bandpass_coefficients(41, 800.0, 3000.0, 48000.0).unwrap();
        let via_taps = convolve(&input, &taps);
        for (a, b) in direct.iter().zip(&via_taps) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn streaming_matches_one_shot_convolution() {
        let coeffs = lowpass_coefficients(17, 3000.0, 48000.0).unwrap();
        let input: Vec<f32> = (0..300).map(|i| (i as f32 * 0.37).sin()).collect();
        let expected = convolve(&input, &coeffs);

        let mut fir = StreamingFir::new(coeffs);
        let mut streamed = Vec::new();
        for chunk in input.chunks(64) {
            streamed.extend(fir.process_block(chunk));
        }

        for (a, b) in expected.iter().zip(&streamed) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn streaming_reset_clears_history() {
        let mut fir = StreamingFir::new(vec![0.5, 0.5]);
        fir.process(1.0);
        fir.reset();
        assert_eq!(fir.process(0.0), 0.0);
    }

    #[test]
    fn design_rejects_bad_input() {
        assert_eq!(
            lowpass_coefficients(1, 500.0, 48000.0),
            Err(DesignError::OrderTooSmall(1))
        );
        assert!(matches!(
            lowpass_coefficients(16, 30000.0, 48000.0),
            Err(DesignError::CutoffOutOfRange { .. })
        ));
        assert!(matches!(
            lowpass_coefficients(16, 100.0, 0.0),
            Err(DesignError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            bandpass_coefficients(16, 3000.0, 800.0, 48000.0),
            Err(DesignError::InvertedBand { .. })
        ));
    }
}
