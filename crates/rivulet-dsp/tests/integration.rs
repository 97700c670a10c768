//! Integration tests for rivulet-dsp.
//!
//! Exercises the public kernel API with synthetic signals whose spectra and
//! filter responses are known in closed form.

use std::f32::consts::PI;

use rivulet_dsp::fir::{highpass_coefficients, lowpass_coefficients};
use rivulet_dsp::{
    ComplexBuffer, advance_phase, convolve, fft, goertzel, hilbert, phase_difference,
    power_spectrum, sine, to_db,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// RMS of a signal slice.
fn rms(signal: &[f32]) -> f32 {
    (signal.iter().map(|x| x * x).sum::<f32>() / signal.len() as f32).sqrt()
}

fn peak_bin(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap()
}

// ===========================================================================
// 1. FFT
// ===========================================================================

#[test]
fn bin_centered_tone_peaks_at_its_bin() {
    let n = 1024;
    let sample_rate = 48000.0;
    for k in [1usize, 37, 100, 400] {
        let freq = k as f32 * sample_rate / n as f32;
        let signal = sine(freq, 1.0, sample_rate, n, 0.0);
        let mags = power_spectrum(&fft(&signal, None));
        let db = to_db(&mags, 1.0);

        let peak = peak_bin(&mags);
        assert!(peak.abs_diff(k) <= 1, "peak {peak} for bin {k}");
        for (i, &v) in db.iter().enumerate() {
            if i.abs_diff(k) > 1 {
                assert!(v < db[k] - 20.0, "bin {i} at {v:.1} dB vs peak {:.1}", db[k]);
            }
        }
    }
}

#[test]
fn complex_input_uses_imaginary_lane() {
    // A pure complex exponential at bin 8 concentrates in bin 8 only.
    let n = 64;
    let re: Vec<f32> = (0..n).map(|i| (2.0 * PI * 8.0 * i as f32 / n as f32).cos()).collect();
    let im: Vec<f32> = (0..n).map(|i| (2.0 * PI * 8.0 * i as f32 / n as f32).sin()).collect();
    let mags = power_spectrum(&fft(&re, Some(&im)));
    assert!((mags[8] - n as f32).abs() < 1e-3);
    assert!(mags[0] < 1e-3);
}

// ===========================================================================
// 2. FIR
// ===========================================================================

#[test]
fn lowpass_attenuates_far_stopband_tone() {
    let fs = 48000.0;
    let coeffs = lowpass_coefficients(64, 500.0, fs).unwrap();
    let tone = sine(10000.0, 1.0, fs, 4096, 0.0);
    let out = convolve(&tone, &coeffs);
    assert!(rms(&out[256..]) < 0.01 * rms(&tone[256..]));
}

#[test]
fn lowpass_passes_dc() {
    let coeffs = lowpass_coefficients(64, 500.0, 48000.0).unwrap();
    let out = convolve(&vec![1.0; 512], &coeffs);
    assert!((out[511] - 1.0).abs() < 1e-5);
}

#[test]
fn highpass_dc_response_converges_to_zero() {
    let coeffs = highpass_coefficients(64, 2000.0, 48000.0).unwrap();
    let out = convolve(&vec![0.75; 8192], &coeffs);
    assert!(out[8191].abs() < 1e-5);
    assert!(out[100..].iter().all(|y| y.abs() < 1e-5));
}

// ===========================================================================
// 3. Generators
// ===========================================================================

#[test]
fn generated_sine_has_no_seam_between_cycles() {
    let (f, fs, n) = (440.0, 48000.0, 512);
    let first = sine(f, 1.0, fs, n, 0.0);
    let second = sine(f, 1.0, fs, n, advance_phase(0.0, f, fs, n));

    let interior = first[n - 1] - first[n - 2];
    let seam = second[0] - first[n - 1];
    assert!((seam - interior).abs() < 1e-3, "seam {seam} interior {interior}");
}

// ===========================================================================
// 4. Detectors
// ===========================================================================

#[test]
fn goertzel_tracks_amplitude_and_rejects_octave() {
    let fs = 48000.0;
    let f0 = 1000.0;
    let block = 480;

    let quiet = goertzel(&sine(f0, 0.25, fs, 4 * block, 0.0), f0, fs, block);
    let loud = goertzel(&sine(f0, 1.0, fs, 4 * block, 0.0), f0, fs, block);
    let octave = goertzel(&sine(2.0 * f0, 1.0, fs, 4 * block, 0.0), f0, fs, block);

    // Proportional to amplitude.
    assert!((loud[0] / quiet[0] - 4.0).abs() < 0.01);
    // Stable block to block.
    for b in 1..4 {
        assert!((loud[b * block] - loud[0]).abs() / loud[0] < 0.01);
    }
    // Octave tone at least an order of magnitude smaller.
    assert!(octave[0] * 10.0 < loud[0]);
}

#[test]
fn hilbert_feeds_phase_detector() {
    // 65 taps delay the quadrature lane by 32 samples, four whole periods of
    // a 6 kHz tone at 48 kHz, so the analytic signal lines up with the
    // reference once the filter has filled.
    let fs = 48000.0;
    let x: Vec<f32> = (0..2048)
        .map(|i| (2.0 * PI * 6000.0 * i as f32 / fs).cos())
        .collect();
    let analytic: ComplexBuffer = hilbert::transform(&x, 65);
    let phase = phase_difference(&analytic, 6000.0, fs, 0.0);
    let settled = &phase[512..];
    let spread = settled.iter().cloned().fold(f32::MIN, f32::max)
        - settled.iter().cloned().fold(f32::MAX, f32::min);
    assert!(spread < 20.0, "spread {spread}");
}
