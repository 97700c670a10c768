//! Hilbert transform for computing analytic signals.
//!
//! The transform is a windowed discrete quadrature filter. With center tap
//! `c = (taps - 1) / 2`:
//!
//! ```text
//! h[n] = (1 − cos(π(n − c))) / (π(n − c))   for n ≠ c
//! h[c] = 0
//! ```
//!
//! Hamming-windowed and convolved with the input, it yields the imaginary
//! (quadrature) component. The real component is the unmodified input. This
//! is a zero-delay approximation: the quadrature path lags the in-phase path
//! by `c` samples.
//!
//! # Example
//!
//! ```rust
//! use rivulet_dsp::hilbert;
//!
//! let signal: Vec<f32> = (0..256).map(|i| (i as f32 * 0.5).sin()).collect();
//! let analytic = hilbert::transform(&signal, 31);
//! assert_eq!(analytic.re, signal);
//! assert_eq!(analytic.im.len(), signal.len());
//! ```

use std::f64::consts::PI;

use crate::buffer::ComplexBuffer;
use crate::fir::{StreamingFir, convolve, hamming};

/// Quadrature filter taps for a Hilbert transformer of length `taps`.
///
/// Returns an empty vector for `taps == 0`.
pub fn coefficients(taps: usize) -> Vec<f32> {
    if taps == 0 {
        return Vec::new();
    }
    let m = taps - 1;
    let center = m / 2;
    (0..taps)
        .map(|n| {
            if n == center {
                return 0.0;
            }
            let d = n as f64 - center as f64;
            let ideal = (1.0 - (PI * d).cos()) / (PI * d);
            (ideal * hamming(n, m)) as f32
        })
        .collect()
}

/// Stateless Hilbert transform of one buffer.
pub fn transform(input: &[f32], taps: usize) -> ComplexBuffer {
    ComplexBuffer {
        re: input.to_vec(),
        im: convolve(input, &coefficients(taps)),
    }
}

/// Streaming Hilbert transformer.
///
/// Keeps the quadrature filter's history across blocks, so the imaginary
/// lane has no discontinuity at block boundaries.
#[derive(Debug, Clone)]
pub struct HilbertTransform {
    fir: StreamingFir,
}

impl HilbertTransform {
    /// Create a transformer with `taps` quadrature taps.
    pub fn new(taps: usize) -> Self {
        Self {
            fir: StreamingFir::new(coefficients(taps)),
        }
    }

    /// Number of quadrature taps.
    pub fn taps(&self) -> usize {
        self.fir.coefficients().len()
    }

    /// Compute the analytic signal of the next block.
    pub fn process_block(&mut self, input: &[f32]) -> ComplexBuffer {
        ComplexBuffer {
            re: input.to_vec(),
            im: self.fir.process_block(input),
        }
    }

    /// Clear the filter history.
    pub fn reset(&mut self) {
        self.fir.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI as PI32;

    fn rms(x: &[f32]) -> f32 {
        (x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32).sqrt()
    }

    #[test]
    fn taps_are_antisymmetric_with_zero_center() {
        let h = coefficients(31);
        assert_eq!(h[15], 0.0);
        for i in 0..15 {
            assert!((h[i] + h[30 - i]).abs() < 1e-7);
        }
        // Even offsets from the center vanish.
        assert!(h[13].abs() < 1e-7);
        assert!(h[17].abs() < 1e-7);
    }

    #[test]
    fn quadrature_lane_preserves_amplitude_in_band() {
        let fs = 48000.0;
        let signal: Vec<f32> = (0..4096)
            .map(|i| (2.0 * PI32 * 6000.0 * i as f32 / fs).sin())
            .collect();
        let analytic = transform(&signal, 63);
        let steady = &analytic.im[256..];
        let ratio = rms(steady) / rms(&signal[256..]);
        assert!((ratio - 1.0).abs() < 0.1, "ratio {ratio}");
    }

    #[test]
    fn streaming_matches_stateless() {
        let signal: Vec<f32> = (0..200).map(|i| (i as f32 * 0.3).cos()).collect();
        let expected = transform(&signal, 21);
        let mut hilbert = HilbertTransform::new(21);
        let mut im = Vec::new();
        for chunk in signal.chunks(50) {
            im.extend(hilbert.process_block(chunk).im);
        }
        for (a, b) in expected.im.iter().zip(&im) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_taps_produce_silence() {
        let out = transform(&[1.0, 2.0], 0);
        assert_eq!(out.im, vec![0.0, 0.0]);
    }
}
