//! Rivulet DSP - the stateless numeric kernel behind every rivulet block
//!
//! Everything here is a pure function over fixed-length buffers. The only
//! stateful type, [`StreamingFir`], keeps its history in a ring buffer owned
//! by the caller so that the execution engine can carry it across cycles.
//!
//! - [`fir`] - windowed-sinc FIR design, one-shot convolution, streaming FIR
//! - [`hilbert`] - quadrature FIR for analytic signals
//! - [`fft`] - FFT wrapper, power spectrum and dB conversion
//! - [`generator`] - phase-continuous sine/cosine generation
//! - [`ops`] - integration, summation, multiplication
//! - [`detect`] - phase, frequency and Goertzel detectors
//! - [`sliding`] - windowed sliding-FFT framing for spectrograms
//!
//! ## Example
//!
//! ```rust
//! use rivulet_dsp::{fir, generator};
//!
//! let tone = generator::sine(1000.0, 1.0, 48000.0, 1024, 0.0);
//! let coeffs = fir::lowpass_coefficients(64, 500.0, 48000.0).unwrap();
//! let filtered = fir::convolve(&tone, &coeffs);
//! assert_eq!(filtered.len(), tone.len());
//! ```

pub mod buffer;
pub mod detect;
pub mod fft;
pub mod fir;
pub mod generator;
pub mod hilbert;
pub mod ops;
pub mod sliding;

pub use buffer::ComplexBuffer;
pub use detect::{frequency, goertzel, goertzel_bin, instantaneous_phase, phase_difference};
pub use fft::{Fft, Window, fft, power_spectrum, to_db};
pub use fir::{DesignError, FilterKind, StreamingFir, bandpass, convolve, design};
pub use generator::{advance_phase, cosine, sine};
pub use hilbert::HilbertTransform;
pub use ops::{integrate, multiply, sum};
pub use sliding::{SlidingFft, SpectralFrame, sliding_fft};

/// Floor applied before taking logarithms so silence maps to -200 dB
/// instead of negative infinity.
pub const DB_FLOOR: f32 = 1e-10;
