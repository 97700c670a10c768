//! Phase, frequency and single-bin (Goertzel) detectors.

use std::f64::consts::{PI, TAU};

use crate::buffer::ComplexBuffer;

/// Wrap an angle into `[-π, π)`.
#[inline]
fn wrap_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Instantaneous phase `atan2(im, re)` of every sample, in radians.
pub fn instantaneous_phase(signal: &ComplexBuffer) -> Vec<f32> {
    signal
        .re
        .iter()
        .zip(&signal.im)
        .map(|(&re, &im)| im.atan2(re))
        .collect()
}

/// Phase of `signal` relative to a linearly advancing reference, in degrees.
///
/// The reference starts at `reference_phase` radians and advances by
/// `2π·reference_frequency/sample_rate` per sample. Differences are wrapped
/// into `[-180, 180)`.
pub fn phase_difference(
    signal: &ComplexBuffer,
    reference_frequency: f32,
    sample_rate: f32,
    reference_phase: f64,
) -> Vec<f32> {
    let step = if sample_rate > 0.0 {
        TAU * f64::from(reference_frequency) / f64::from(sample_rate)
    } else {
        0.0
    };
    instantaneous_phase(signal)
        .into_iter()
        .enumerate()
        .map(|(n, phase)| {
            let reference = reference_phase + step * n as f64;
            wrap_pi(f64::from(phase) - reference).to_degrees() as f32
        })
        .collect()
}

/// Instantaneous frequency in Hz from the derivative of the unwrapped phase.
///
/// Sample `n` holds the frequency between samples `n` and `n + 1`; the final
/// sample repeats the last computable value. A single-sample input yields 0.
pub fn frequency(signal: &ComplexBuffer, sample_rate: f32) -> Vec<f32> {
    let phase = instantaneous_phase(signal);
    match phase.len() {
        0 => return Vec::new(),
        1 => return vec![0.0],
        _ => {}
    }

    let scale = f64::from(sample_rate) / TAU;
    let mut out: Vec<f32> = phase
        .windows(2)
        .map(|w| (wrap_pi(f64::from(w[1]) - f64::from(w[0])) * scale) as f32)
        .collect();
    let last = out[out.len() - 1];
    out.push(last);
    out
}

/// Goertzel magnitude of one block at bin `k = round(N·f/fs)`.
pub fn goertzel_bin(block: &[f32], target_frequency: f32, sample_rate: f32) -> f32 {
    goertzel_with_length(block, target_frequency, sample_rate, block.len())
}

fn goertzel_with_length(
    block: &[f32],
    target_frequency: f32,
    sample_rate: f32,
    n: usize,
) -> f32 {
    if n == 0 || sample_rate <= 0.0 {
        return 0.0;
    }
    let k = (n as f64 * f64::from(target_frequency) / f64::from(sample_rate)).round();
    let coeff = 2.0 * (TAU * k / n as f64).cos();

    let (mut s1, mut s2) = (0.0f64, 0.0f64);
    for &x in block {
        let s0 = f64::from(x) + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    (s1 * s1 + s2 * s2 - coeff * s1 * s2).max(0.0).sqrt() as f32
}

/// Goertzel detector over consecutive blocks of `block_size` samples.
///
/// Each block's magnitude is broadcast across that block, so the output has
/// the input's length. A trailing partial block uses the coefficient of a
/// full block. `block_size == 0` treats the whole input as one block.
pub fn goertzel(
    input: &[f32],
    target_frequency: f32,
    sample_rate: f32,
    block_size: usize,
) -> Vec<f32> {
    let n = if block_size == 0 {
        input.len()
    } else {
        block_size
    };
    if n == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(input.len());
    for block in input.chunks(n) {
        let magnitude = goertzel_with_length(block, target_frequency, sample_rate, n);
        out.extend(std::iter::repeat_n(magnitude, block.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{cosine, sine};

    fn tone(f: f32, fs: f32, n: usize) -> ComplexBuffer {
        ComplexBuffer {
            re: cosine(f, 1.0, fs, n, 0.0),
            im: sine(f, 1.0, fs, n, 0.0),
        }
    }

    #[test]
    fn phase_of_quadrature_pair() {
        let buf = ComplexBuffer::from_parts(vec![1.0, 0.0, -1.0], vec![0.0, 1.0, 0.0]);
        let phase = instantaneous_phase(&buf);
        assert!(phase[0].abs() < 1e-6);
        assert!((phase[1] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((phase[2].abs() - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn phase_difference_locked_to_reference_is_zero() {
        let buf = tone(1000.0, 48000.0, 512);
        for d in phase_difference(&buf, 1000.0, 48000.0, 0.0) {
            assert!(d.abs() < 0.01, "{d}");
        }
    }

    #[test]
    fn phase_difference_reports_offset_in_degrees() {
        let buf = tone(1000.0, 48000.0, 64);
        let out = phase_difference(&buf, 1000.0, 48000.0, -std::f64::consts::FRAC_PI_2);
        for d in out {
            assert!((d - 90.0).abs() < 0.01, "{d}");
        }
    }

    #[test]
    fn frequency_of_rotating_phasor() {
        let out = frequency(&tone(1500.0, 48000.0, 256), 48000.0);
        assert_eq!(out.len(), 256);
        for f in out {
            assert!((f - 1500.0).abs() < 0.5, "{f}");
        }
    }

    #[test]
    fn frequency_handles_short_inputs() {
        assert!(frequency(&ComplexBuffer::default(), 48000.0).is_empty());
        assert_eq!(frequency(&ComplexBuffer::zeros(1), 48000.0), vec![0.0]);
    }

    #[test]
    fn goertzel_on_bin_is_half_amplitude_times_n() {
        // 48 kHz, N = 480: bin spacing 100 Hz, 1 kHz lands on k = 10.
        let x = sine(1000.0, 0.5, 48000.0, 480, 0.0);
        let mag = goertzel_bin(&x, 1000.0, 48000.0);
        assert!((mag - 0.5 * 480.0 / 2.0).abs() < 0.5, "{mag}");
    }

    #[test]
    fn goertzel_broadcasts_per_block() {
        let x = sine(1000.0, 1.0, 48000.0, 1000, 0.0);
        let out = goertzel(&x, 1000.0, 48000.0, 480);
        assert_eq!(out.len(), 1000);
        assert_eq!(out[0], out[479]);
        assert!((out[0] - out[480]).abs() / out[0] < 0.01);
    }
}
