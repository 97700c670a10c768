//! Sample sources: the seam between the kernel and audio decoding.
//!
//! Playback blocks pull frames from a [`SampleSource`] attached to their node.
//! The core only ships the in-memory implementation; file-backed sources live
//! in `rivulet-io`.

/// A random-access mono sample provider.
pub trait SampleSource: Send {
    /// Native sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Total number of frames.
    fn len(&self) -> usize;

    /// Copies frames starting at `offset` into `out`.
    ///
    /// Returns the number of frames written, which is less than `out.len()`
    /// only at the end of the source.
    fn read(&self, offset: usize, out: &mut [f32]) -> usize;

    /// Returns true if the source holds no frames.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds.
    fn duration_secs(&self) -> f64 {
        let rate = self.sample_rate();
        if rate > 0.0 {
            self.len() as f64 / f64::from(rate)
        } else {
            0.0
        }
    }
}

/// A source backed by a sample vector.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySource {
    samples: Vec<f32>,
    sample_rate: f32,
}

impl MemorySource {
    /// Wraps `samples` recorded at `sample_rate`.
    pub fn new(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The underlying samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl SampleSource for MemorySource {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn read(&self, offset: usize, out: &mut [f32]) -> usize {
        let available = self.samples.get(offset..).unwrap_or(&[]);
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        n
    }
}
