//! Sliding-FFT framing for spectrogram and waterfall consumers
//!
//! The signal is cut into overlapping Hamming-windowed frames, each frame is
//! transformed and converted to dB, and tagged with its start position as a
//! fraction of the signal length.

use crate::fft::{Fft, Window, power_spectrum, to_db};

/// One column of a spectrogram.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFrame {
    /// Frame start divided by signal length, in `[0, 1)`.
    pub time: f32,
    /// Magnitude of bins `0..=fft_size/2`, in dB.
    pub bins_db: Vec<f32>,
}

/// Reusable sliding-FFT analyzer
#[derive(Debug, Clone)]
pub struct SlidingFft {
    window_size: usize,
    hop_size: usize,
    reference: f32,
    fft: Fft,
    window_coeffs: Vec<f32>,
}

impl SlidingFft {
    /// Create an analyzer.
    ///
    /// # Arguments
    /// * `window_size` - Samples per frame (the FFT rounds up to a power of two)
    /// * `overlap` - Samples shared by consecutive frames; the hop is
    ///   `window_size - overlap`, never less than one
    /// * `reference` - Amplitude mapped to 0 dB
    pub fn new(window_size: usize, overlap: usize, reference: f32) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            hop_size: window_size.saturating_sub(overlap).max(1),
            reference,
            fft: Fft::new(window_size),
            window_coeffs: Window::Hamming.coefficients(window_size),
        }
    }

    /// Samples per frame.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Amplitude mapped to 0 dB.
    pub fn reference(&self) -> f32 {
        self.reference
    }

    /// Hop between frame starts, in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Bins per frame.
    pub fn bin_count(&self) -> usize {
        self.fft.bin_count()
    }

    /// Frame the signal and transform every frame.
    ///
    /// A non-empty signal shorter than one window yields a single
    /// zero-padded frame.
    pub fn analyze(&self, signal: &[f32]) -> Vec<SpectralFrame> {
        if signal.is_empty() {
            return Vec::new();
        }
        let num_frames = if signal.len() >= self.window_size {
            (signal.len() - self.window_size) / self.hop_size + 1
        } else {
            1
        };

        (0..num_frames)
            .map(|frame_idx| {
                let start = frame_idx * self.hop_size;
                let end = (start + self.window_size).min(signal.len());

                let mut frame = signal[start..end].to_vec();
                frame.resize(self.window_size, 0.0);
                for (sample, &coeff) in frame.iter_mut().zip(&self.window_coeffs) {
                    *sample *= coeff;
                }

                let magnitudes = power_spectrum(&self.fft.forward(&frame, None));
                SpectralFrame {
                    time: start as f32 / signal.len() as f32,
                    bins_db: to_db(&magnitudes, self.reference),
                }
            })
            .collect()
    }
}

/// One-shot sliding FFT; see [`SlidingFft::analyze`].
pub fn sliding_fft(
    signal: &[f32],
    window_size: usize,
    overlap: usize,
    reference: f32,
) -> Vec<SpectralFrame> {
    SlidingFft::new(window_size, overlap, reference).analyze(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sine;

    #[test]
    fn frame_count_and_times() {
        let signal = vec![0.5; 1024];
        let frames = sliding_fft(&signal, 256, 128, 1.0);
        // (1024 - 256) / 128 + 1
        assert_eq!(frames.len(), 7);
        assert_eq!(frames[0].time, 0.0);
        assert_eq!(frames[1].time, 0.125);
        assert_eq!(frames[0].bins_db.len(), 129);
    }

    #[test]
    fn short_signal_yields_one_padded_frame() {
        let frames = sliding_fft(&[1.0; 10], 64, 0, 1.0);
        assert_eq!(frames.len(), 1);
        assert!(sliding_fft(&[], 64, 0, 1.0).is_empty());
    }

    #[test]
    fn overlap_not_smaller_than_window_hops_by_one() {
        let analyzer = SlidingFft::new(32, 40, 1.0);
        assert_eq!(analyzer.hop_size(), 1);
    }

    #[test]
    fn tone_peaks_in_expected_bin() {
        // 256-point frames at 48 kHz: bin spacing 187.5 Hz, 3 kHz is bin 16.
        let signal = sine(3000.0, 1.0, 48000.0, 2048, 0.0);
        for frame in sliding_fft(&signal, 256, 64, 1.0) {
            let peak = frame
                .bins_db
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap();
            assert_eq!(peak, 16);
        }
    }
}
