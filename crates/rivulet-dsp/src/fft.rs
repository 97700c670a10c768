//! FFT wrapper with windowing, power spectrum and dB conversion

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::DB_FLOOR;
use crate::buffer::ComplexBuffer;

/// Tapering applied to a frame before transforming it.
///
/// All windows are periodic: sample `i` of an `n`-point frame uses
/// `x = 2π·i/n`, so consecutive frames tile without a doubled endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// No tapering.
    #[default]
    Rectangular,
    /// `0.5 - 0.5·cos x`
    Hann,
    /// `0.54 - 0.46·cos x`
    Hamming,
    /// `0.42 - 0.5·cos x + 0.08·cos 2x`
    Blackman,
}

impl Window {
    /// Weight of sample `i` in an `n`-point frame.
    #[inline]
    pub fn weight(self, i: usize, n: usize) -> f32 {
        let x = 2.0 * PI * i as f32 / n.max(1) as f32;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 - 0.5 * x.cos(),
            Window::Hamming => 0.54 - 0.46 * x.cos(),
            Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
        }
    }

    /// Multiplies `frame` by the window in place.
    pub fn apply(self, frame: &mut [f32]) {
        if self == Window::Rectangular {
            return;
        }
        let n = frame.len();
        for (i, sample) in frame.iter_mut().enumerate() {
            *sample *= self.weight(i, n);
        }
    }

    /// The `size` window weights.
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        (0..size).map(|i| self.weight(i, size)).collect()
    }
}

/// Forward FFT processor with a cached plan.
///
/// The transform size is always a power of two; shorter inputs are
/// zero-padded and longer inputs truncated. Cloning shares the plan.
#[derive(Clone)]
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create a processor for at least `size` points (rounded up to a power of two).
    pub fn new(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        Self {
            fft: FftPlanner::new().plan_fft_forward(size),
            size,
        }
    }

    /// Transform length in points.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bins returned by [`forward`](Self::forward): DC through Nyquist.
    pub fn bin_count(&self) -> usize {
        self.size / 2 + 1
    }

    /// Transform a real or complex input.
    ///
    /// `imag` may be `None` for purely real input. Returns bins `0..=size/2`.
    pub fn forward(&self, real: &[f32], imag: Option<&[f32]>) -> ComplexBuffer {
        let mut buffer: Vec<Complex<f32>> = (0..self.size)
            .map(|i| {
                let re = real.get(i).copied().unwrap_or(0.0);
                let im = imag.and_then(|im| im.get(i).copied()).unwrap_or(0.0);
                Complex::new(re, im)
            })
            .collect();

        self.fft.process(&mut buffer);
        buffer.truncate(self.bin_count());
        let (re, im): (Vec<f32>, Vec<f32>) = buffer.iter().map(|c| (c.re, c.im)).unzip();
        ComplexBuffer { re, im }
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish_non_exhaustive()
    }
}

/// One-shot FFT sized to the next power of two of the input length.
pub fn fft(real: &[f32], imag: Option<&[f32]>) -> ComplexBuffer {
    let len = imag.map_or(real.len(), |im| real.len().max(im.len()));
    Fft::new(len).forward(real, imag)
}

/// Magnitude of every bin: `sqrt(re² + im²)`.
pub fn power_spectrum(spectrum: &ComplexBuffer) -> Vec<f32> {
    spectrum.magnitudes()
}

/// Convert linear magnitudes to dB relative to `reference`.
///
/// Computes `20·log10(max(value / reference, 1e-10))`. A non-positive
/// reference is treated as 1.0.
pub fn to_db(values: &[f32], reference: f32) -> Vec<f32> {
    let reference = if reference > 0.0 { reference } else { 1.0 };
    values
        .iter()
        .map(|&v| 20.0 * (v / reference).max(DB_FLOOR).log10())
        .collect()
}
