//! Audio file I/O for rivulet.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for loading and saving
//!   mono buffers, [`read_wav_info`] for header-only inspection
//! - **Sample sources**: [`WavSource`], a decoded file that plugs into the
//!   engine's `file-player` nodes through [`rivulet_core::SampleSource`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivulet_io::{WavSource, WavSpec, write_wav};
//!
//! let source = WavSource::open("input.wav")?;
//! engine.attach_source("player", Box::new(source))?;
//!
//! // ... run cycles, collect a sink's samples ...
//! write_wav("scope.wav", &samples, WavSpec { sample_rate: 48000, ..Default::default() })?;
//! ```

mod source;
mod wav;

pub use source::WavSource;
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file uses a layout this crate cannot decode.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
