//! Phase, frequency and single-tone detectors.

use rivulet_core::{
    BlockDescriptor, BlockGroup, ParamField, ProcessContext, ProcessError, Signal, SignalType,
    Signals,
};
use rivulet_dsp::detect;

/// Phase of an analytic signal against a reference oscillator, in degrees.
pub const PHASE_DETECTOR: BlockDescriptor = BlockDescriptor {
    id: "phase-detector",
    name: "Phase Detector",
    icon: "phase",
    group: BlockGroup::Detectors,
    description: "Wrapped phase difference to a reference tone, in degrees",
    signals: Signals::transform(SignalType::Complex, SignalType::Real),
    param_fields: &[
        ParamField::number("reference_frequency", "Reference", 1000.0, 0.0, 96_000.0)
            .with_unit("Hz"),
    ],
    validate: None,
    process: process_phase,
};

/// Instantaneous frequency of an analytic signal.
pub const FREQUENCY_DETECTOR: BlockDescriptor = BlockDescriptor {
    id: "frequency-detector",
    name: "Frequency Detector",
    icon: "frequency",
    group: BlockGroup::Detectors,
    description: "Instantaneous frequency from the unwrapped phase, in Hz",
    signals: Signals::transform(SignalType::Complex, SignalType::Real),
    param_fields: &[],
    validate: None,
    process: process_frequency,
};

/// Goertzel single-bin magnitude.
pub const GOERTZEL: BlockDescriptor = BlockDescriptor {
    id: "goertzel",
    name: "Goertzel Detector",
    icon: "tone",
    group: BlockGroup::Detectors,
    description: "Tone magnitude per block, broadcast across the block",
    signals: Signals::transform(SignalType::Real, SignalType::Real),
    param_fields: &[
        ParamField::number("target_frequency", "Target", 1000.0, 0.0, 96_000.0).with_unit("Hz"),
        ParamField::number("block_size", "Block Size", 256.0, 1.0, 65536.0).with_unit("samples"),
    ],
    validate: None,
    process: process_goertzel,
};

pub(crate) const BLOCKS: &[BlockDescriptor] = &[PHASE_DETECTOR, FREQUENCY_DETECTOR, GOERTZEL];

/// The node's oscillator state holds the reference phase at the start of
/// the next buffer, so the reference never restarts at a cycle boundary.
fn process_phase(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let input = ctx.first_complex_or_silence()?;
    let reference = ctx.number("reference_frequency")? as f32;
    let sample_rate = ctx.sample_rate;

    let phase = ctx.state.phase_mut(0.0);
    let out = detect::phase_difference(&input, reference, sample_rate, *phase);
    *phase = rivulet_dsp::advance_phase(*phase, reference, sample_rate, input.len());
    Ok(Signal::Real(out))
}

fn process_frequency(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let input = ctx.first_complex_or_silence()?;
    Ok(Signal::Real(detect::frequency(&input, ctx.sample_rate)))
}

fn process_goertzel(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let target = ctx.number("target_frequency")? as f32;
    let nyquist = ctx.sample_rate / 2.0;
    if target > nyquist {
        return Err(ProcessError::InvalidParam {
            name: "target_frequency",
            reason: format!("{target} Hz is above Nyquist ({nyquist} Hz)"),
        });
    }
    let block_size = ctx.count("block_size")?;
    let input = ctx.first_real_or_silence()?;
    Ok(Signal::Real(detect::goertzel(
        &input,
        target,
        ctx.sample_rate,
        block_size,
    )))
}
