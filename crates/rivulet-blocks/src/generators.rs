//! Source blocks: oscillators and sample playback.

use std::f64::consts::TAU;

use rivulet_core::{
    BlockDescriptor, BlockGroup, ParamField, ProcessContext, ProcessError, Signal, SignalType,
    Signals,
};
use rivulet_dsp::generator;

const OSCILLATOR_FIELDS: &[ParamField] = &[
    ParamField::number("frequency", "Frequency", 1000.0, 0.0, 96_000.0).with_unit("Hz"),
    ParamField::number("amplitude", "Amplitude", 1.0, 0.0, 10.0),
    ParamField::number("phase", "Phase", 0.0, -360.0, 360.0).with_unit("deg"),
];

/// Phase-continuous sine oscillator.
pub const SINE: BlockDescriptor = BlockDescriptor {
    id: "sine",
    name: "Sine Wave",
    icon: "sine",
    group: BlockGroup::Generators,
    description: "Sine tone with persistent phase across cycles",
    signals: Signals::generator(SignalType::Real),
    param_fields: OSCILLATOR_FIELDS,
    validate: None,
    process: process_sine,
};

/// Phase-continuous cosine oscillator.
pub const COSINE: BlockDescriptor = BlockDescriptor {
    id: "cosine",
    name: "Cosine Wave",
    icon: "cosine",
    group: BlockGroup::Generators,
    description: "Cosine tone with persistent phase across cycles",
    signals: Signals::generator(SignalType::Real),
    param_fields: OSCILLATOR_FIELDS,
    validate: None,
    process: process_cosine,
};

/// Plays the sample source attached to the node.
pub const FILE_PLAYER: BlockDescriptor = BlockDescriptor {
    id: "file-player",
    name: "File Player",
    icon: "file-audio",
    group: BlockGroup::Generators,
    description: "Streams an attached audio source, optionally looping",
    signals: Signals::generator(SignalType::Real),
    param_fields: &[
        ParamField::number("gain", "Gain", 1.0, 0.0, 4.0),
        ParamField::flag("loop", "Loop", false),
        ParamField::text("path", "File", ""),
    ],
    validate: None,
    process: process_file_player,
};

pub(crate) const BLOCKS: &[BlockDescriptor] = &[SINE, COSINE, FILE_PLAYER];

type Waveform = fn(f32, f32, f32, usize, f64) -> Vec<f32>;

fn process_sine(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    oscillate(ctx, generator::sine)
}

fn process_cosine(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    oscillate(ctx, generator::cosine)
}

/// The `phase` parameter only seeds the first cycle; afterwards the stored
/// phase carries on where the previous buffer ended.
fn oscillate(ctx: &mut ProcessContext<'_>, wave: Waveform) -> Result<Signal, ProcessError> {
    let frequency = ctx.number("frequency")? as f32;
    let amplitude = ctx.number("amplitude")? as f32;
    let initial = ctx.number_or("phase", 0.0).to_radians().rem_euclid(TAU);
    let (sample_rate, n) = (ctx.sample_rate, ctx.buffer_size);

    let phase = ctx.state.phase_mut(initial);
    let out = wave(frequency, amplitude, sample_rate, n, *phase);
    *phase = generator::advance_phase(*phase, frequency, sample_rate, n);
    Ok(Signal::Real(out))
}

fn process_file_player(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let source = ctx.source.ok_or(ProcessError::MissingSource)?;
    let gain = ctx.number("gain")? as f32;
    let looping = ctx.flag_or("loop", false);
    let total = source.len();
    let mut out = ctx.silence();

    let offset = ctx.state.offset_mut();
    let mut filled = 0;
    while filled < out.len() {
        if *offset >= total {
            if !looping || total == 0 {
                break;
            }
            *offset = 0;
        }
        let read = source.read(*offset, &mut out[filled..]);
        if read == 0 {
            break;
        }
        *offset += read;
        filled += read;
    }

    if gain != 1.0 {
        for sample in &mut out {
            *sample *= gain;
        }
    }
    Ok(Signal::Real(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivulet_core::{MemorySource, NodeState, Params};

    fn run(
        desc: &BlockDescriptor,
        params: &Params,
        state: &mut NodeState,
        source: Option<&dyn rivulet_core::SampleSource>,
        n: usize,
    ) -> Result<Signal, ProcessError> {
        let params = desc.default_params().overlay(params);
        let mut ctx = ProcessContext {
            node_id: "n",
            inputs: &[],
            params: &params,
            state,
            source,
            sample_rate: 8.0,
            buffer_size: n,
        };
        (desc.process)(&mut ctx)
    }

    #[test]
    fn sine_continues_across_buffers() {
        let params = Params::new().with("frequency", 1.0);
        let mut state = NodeState::Empty;
        let first = run(&SINE, &params, &mut state, None, 4).unwrap();
        let second = run(&SINE, &params, &mut state, None, 4).unwrap();

        let joined: Vec<f32> = [first.as_real().unwrap(), second.as_real().unwrap()].concat();
        let whole = generator::sine(1.0, 1.0, 8.0, 8, 0.0);
        for (a, b) in joined.iter().zip(&whole) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn phase_parameter_is_in_degrees() {
        let params = Params::new().with("frequency", 0.0).with("phase", 90.0);
        let out = run(&COSINE, &params, &mut NodeState::Empty, None, 2).unwrap();
        for x in out.as_real().unwrap() {
            assert!(x.abs() < 1e-6);
        }
        let out = run(&SINE, &params, &mut NodeState::Empty, None, 2).unwrap();
        assert!((out.as_real().unwrap()[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn player_stops_at_end_without_loop() {
        let source = MemorySource::new(vec![1.0, 2.0, 3.0], 8.0);
        let mut state = NodeState::Empty;
        let params = Params::new();
        let a = run(&FILE_PLAYER, &params, &mut state, Some(&source), 2).unwrap();
        let b = run(&FILE_PLAYER, &params, &mut state, Some(&source), 2).unwrap();
        let c = run(&FILE_PLAYER, &params, &mut state, Some(&source), 2).unwrap();
        assert_eq!(a.as_real().unwrap(), &[1.0, 2.0]);
        assert_eq!(b.as_real().unwrap(), &[3.0, 0.0]);
        assert_eq!(c.as_real().unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn player_wraps_when_looping() {
        let source = MemorySource::new(vec![1.0, 2.0, 3.0], 8.0);
        let params = Params::new().with("loop", true).with("gain", 2.0);
        let out = run(&FILE_PLAYER, &params, &mut NodeState::Empty, Some(&source), 7).unwrap();
        assert_eq!(
            out.as_real().unwrap(),
            &[2.0, 4.0, 6.0, 2.0, 4.0, 6.0, 2.0]
        );
    }

    #[test]
    fn player_without_source_fails() {
        let err = run(&FILE_PLAYER, &Params::new(), &mut NodeState::Empty, None, 4).unwrap_err();
        assert_eq!(err, ProcessError::MissingSource);
    }
}
