//! Phase-continuous sine and cosine generation.
//!
//! The generators are stateless: the caller owns the phase and advances it
//! with [`advance_phase`] after each buffer, which keeps consecutive buffers
//! continuous across the boundary.

use std::f64::consts::TAU;

/// Per-sample phase increment in radians.
#[inline]
fn phase_step(frequency: f32, sample_rate: f32) -> f64 {
    if sample_rate > 0.0 {
        TAU * f64::from(frequency) / f64::from(sample_rate)
    } else {
        0.0
    }
}

/// `n` samples of `amplitude · sin(phase + 2π·f·i/fs)`.
pub fn sine(frequency: f32, amplitude: f32, sample_rate: f32, n: usize, phase: f64) -> Vec<f32> {
    let step = phase_step(frequency, sample_rate);
    (0..n)
        .map(|i| amplitude * (phase + step * i as f64).sin() as f32)
        .collect()
}

/// `n` samples of `amplitude · cos(phase + 2π·f·i/fs)`.
pub fn cosine(frequency: f32, amplitude: f32, sample_rate: f32, n: usize, phase: f64) -> Vec<f32> {
    let step = phase_step(frequency, sample_rate);
    (0..n)
        .map(|i| amplitude * (phase + step * i as f64).cos() as f32)
        .collect()
}

/// Phase after `n` samples at `frequency`, wrapped into `[0, 2π)`.
pub fn advance_phase(phase: f64, frequency: f32, sample_rate: f32, n: usize) -> f64 {
    (phase + phase_step(frequency, sample_rate) * n as f64).rem_euclid(TAU)
}
