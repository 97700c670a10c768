//! File-backed sample source.

use std::path::{Path, PathBuf};

use rivulet_core::SampleSource;

use crate::Result;
use crate::wav::read_wav;

/// A WAV file decoded to mono and held in memory.
///
/// Decoding happens once in [`open`](Self::open), so `read` during a cycle
/// is a plain copy.
#[derive(Debug, Clone)]
pub struct WavSource {
    path: PathBuf,
    samples: Vec<f32>,
    sample_rate: f32,
}

impl WavSource {
    /// Decodes `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (samples, spec) = read_wav(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            samples,
            sample_rate: spec.sample_rate as f32,
        })
    }

    /// File the samples were decoded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The decoded mono samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl SampleSource for WavSource {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn read(&self, offset: usize, out: &mut [f32]) -> usize {
        let Some(rest) = self.samples.get(offset..) else {
            return 0;
        };
        let n = rest.len().min(out.len());
        out[..n].copy_from_slice(&rest[..n]);
        n
    }
}
