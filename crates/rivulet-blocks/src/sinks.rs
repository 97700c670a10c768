//! Terminal blocks whose output is handed to the host each cycle.
//!
//! Sinks have no output port, but their handler still returns the data a
//! view needs: raw samples for scopes, a dB spectrum, or spectrogram frames.

use rivulet_core::{
    BlockDescriptor, BlockGroup, ParamField, Params, ProcessContext, ProcessError, Signal,
    SignalType, Signals,
};
use rivulet_dsp::fft;

const REFERENCE: ParamField = ParamField::number("reference", "Reference", 1.0, 1e-9, 1e9);

/// Time-domain view of a real signal.
pub const OSCILLOSCOPE: BlockDescriptor = BlockDescriptor {
    id: "oscilloscope",
    name: "Oscilloscope",
    icon: "scope",
    group: BlockGroup::Sinks,
    description: "Passes the buffer through for display",
    signals: Signals::sink(SignalType::Real),
    param_fields: &[],
    validate: None,
    process: process_oscilloscope,
};

/// Magnitude spectrum in dB.
pub const SPECTRUM_ANALYZER: BlockDescriptor = BlockDescriptor {
    id: "spectrum-analyzer",
    name: "Spectrum Analyzer",
    icon: "spectrum",
    group: BlockGroup::Sinks,
    description: "FFT magnitude in dB from DC to Nyquist",
    signals: Signals::sink(SignalType::Real),
    param_fields: &[
        ParamField::number("fft_size", "FFT Size", 1024.0, 16.0, 65536.0).with_unit("points"),
        REFERENCE,
    ],
    validate: Some(validate_spectrum),
    process: process_spectrum,
};

/// Scrolling spectrogram frames.
pub const WATERFALL: BlockDescriptor = BlockDescriptor {
    id: "waterfall",
    name: "Waterfall",
    icon: "waterfall",
    group: BlockGroup::Sinks,
    description: "Overlapping Hamming-windowed FFT frames in dB",
    signals: Signals::sink(SignalType::Real),
    param_fields: &[
        ParamField::number("window_size", "Window", 256.0, 8.0, 65536.0).with_unit("samples"),
        ParamField::number("overlap", "Overlap", 128.0, 0.0, 65535.0).with_unit("samples"),
        REFERENCE,
    ],
    validate: Some(validate_waterfall),
    process: process_waterfall,
};

/// I/Q scatter view of a complex signal.
pub const CONSTELLATION: BlockDescriptor = BlockDescriptor {
    id: "constellation",
    name: "Constellation",
    icon: "constellation",
    group: BlockGroup::Sinks,
    description: "Passes the analytic buffer through for an I/Q plot",
    signals: Signals::sink(SignalType::Complex),
    param_fields: &[],
    validate: None,
    process: process_constellation,
};

pub(crate) const BLOCKS: &[BlockDescriptor] =
    &[OSCILLOSCOPE, SPECTRUM_ANALYZER, WATERFALL, CONSTELLATION];

fn validate_spectrum(params: &Params) -> Vec<String> {
    match params.number("fft_size") {
        Some(size) if size.fract() != 0.0 || !(size as u64).is_power_of_two() => {
            vec![format!("fft_size must be a power of two, got {size}")]
        }
        _ => Vec::new(),
    }
}

fn validate_waterfall(params: &Params) -> Vec<String> {
    match (params.number("window_size"), params.number("overlap")) {
        (Some(window), Some(overlap)) if overlap >= window => vec![format!(
            "overlap ({overlap}) must be smaller than window_size ({window})"
        )],
        _ => Vec::new(),
    }
}

fn process_oscilloscope(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    Ok(Signal::Real(ctx.first_real_or_silence()?))
}

fn process_constellation(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    Ok(Signal::Complex(ctx.first_complex_or_silence()?))
}

fn process_spectrum(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let input = ctx.first_real_or_silence()?;
    let size = ctx.count("fft_size")?;
    let reference = ctx.number("reference")? as f32;
    let spectrum = ctx.state.fft_for(size).forward(&input, None);
    Ok(Signal::Real(fft::to_db(
        &fft::power_spectrum(&spectrum),
        reference,
    )))
}

fn process_waterfall(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let window = ctx.count("window_size")?;
    let overlap = ctx.count("overlap")?;
    if overlap >= window {
        return Err(ProcessError::InvalidParam {
            name: "overlap",
            reason: format!("{overlap} must be smaller than window_size {window}"),
        });
    }
    let reference = ctx.number("reference")? as f32;
    let input = ctx.first_real_or_silence()?;
    let analyzer = ctx.state.sliding_fft_for(window, overlap, reference);
    Ok(Signal::Frames(analyzer.analyze(&input)))
}
