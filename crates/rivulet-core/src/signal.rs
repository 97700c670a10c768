//! Signal shapes carried along graph edges.

use std::fmt;

use rivulet_dsp::{ComplexBuffer, SpectralFrame};
use serde::{Deserialize, Serialize};

/// Numeric shape of a block port.
///
/// An edge is valid only when the source's output type equals the target's
/// input type exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    /// One real sample per time step.
    Real,
    /// An in-phase/quadrature pair per time step.
    Complex,
}

impl SignalType {
    /// Lowercase name used in documents and error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node's output for one cycle.
///
/// Every block allocates a fresh signal; consumers only ever borrow it, so a
/// fan-out never lets one consumer observe another's changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Real-valued samples.
    Real(Vec<f32>),
    /// Complex samples as separate lanes.
    Complex(ComplexBuffer),
    /// Sliding-FFT frames produced by spectrogram sinks.
    Frames(Vec<SpectralFrame>),
}

impl Signal {
    /// A real buffer of `len` zeros.
    pub fn silence(len: usize) -> Self {
        Self::Real(vec![0.0; len])
    }

    /// The port type this signal travels on, if it has one.
    ///
    /// Frames only ever leave sinks and have no port type.
    pub fn signal_type(&self) -> Option<SignalType> {
        match self {
            Self::Real(_) => Some(SignalType::Real),
            Self::Complex(_) => Some(SignalType::Complex),
            Self::Frames(_) => None,
        }
    }

    /// Borrows the samples of a real signal.
    pub fn as_real(&self) -> Option<&[f32]> {
        match self {
            Self::Real(samples) => Some(samples),
            _ => None,
        }
    }

    /// Borrows the lanes of a complex signal.
    pub fn as_complex(&self) -> Option<&ComplexBuffer> {
        match self {
            Self::Complex(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Borrows the frames of a spectrogram signal.
    pub fn as_frames(&self) -> Option<&[SpectralFrame]> {
        match self {
            Self::Frames(frames) => Some(frames),
            _ => None,
        }
    }

    /// Number of samples, or of frames for [`Signal::Frames`].
    pub fn len(&self) -> usize {
        match self {
            Self::Real(samples) => samples.len(),
            Self::Complex(buffer) => buffer.len(),
            Self::Frames(frames) => frames.len(),
        }
    }

    /// Returns true if the signal holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short shape name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Real(_) => "real",
            Self::Complex(_) => "complex",
            Self::Frames(_) => "frames",
        }
    }
}
