//! Arithmetic and domain-changing transforms.

use rivulet_core::{
    BlockDescriptor, BlockGroup, ParamField, Params, ProcessContext, ProcessError, Signal,
    SignalType, Signals,
};
use rivulet_dsp::ops;

/// Running integral scaled by a gain.
pub const INTEGRATOR: BlockDescriptor = BlockDescriptor {
    id: "integrator",
    name: "Integrator",
    icon: "integral",
    group: BlockGroup::Transforms,
    description: "Accumulates x/fs across cycles",
    signals: Signals::transform(SignalType::Real, SignalType::Real),
    param_fields: &[ParamField::number("gain", "Gain", 1.0, -1000.0, 1000.0)],
    validate: None,
    process: process_integrator,
};

/// Elementwise sum of every connected input.
pub const ADDER: BlockDescriptor = BlockDescriptor {
    id: "adder",
    name: "Adder",
    icon: "plus",
    group: BlockGroup::Transforms,
    description: "Sums all inputs sample by sample",
    signals: Signals::transform(SignalType::Real, SignalType::Real),
    param_fields: &[],
    validate: None,
    process: process_adder,
};

/// Elementwise product of every connected input.
pub const MULTIPLIER: BlockDescriptor = BlockDescriptor {
    id: "multiplier",
    name: "Multiplier",
    icon: "times",
    group: BlockGroup::Transforms,
    description: "Multiplies all inputs sample by sample",
    signals: Signals::transform(SignalType::Real, SignalType::Real),
    param_fields: &[],
    validate: None,
    process: process_multiplier,
};

/// Real to analytic signal.
pub const HILBERT: BlockDescriptor = BlockDescriptor {
    id: "hilbert",
    name: "Hilbert Transform",
    icon: "hilbert",
    group: BlockGroup::Transforms,
    description: "Builds an analytic signal from a quadrature FIR",
    signals: Signals::transform(SignalType::Real, SignalType::Complex),
    param_fields: &[ParamField::number("taps", "Taps", 31.0, 3.0, 1025.0).with_unit("taps")],
    validate: Some(validate_hilbert),
    process: process_hilbert,
};

pub(crate) const BLOCKS: &[BlockDescriptor] = &[INTEGRATOR, ADDER, MULTIPLIER, HILBERT];

fn validate_hilbert(params: &Params) -> Vec<String> {
    match params.number("taps") {
        Some(taps) if taps.fract() != 0.0 || (taps as i64) % 2 == 0 => {
            vec![format!("taps must be an odd integer, got {taps}")]
        }
        _ => Vec::new(),
    }
}

fn process_integrator(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let input = ctx.first_real_or_silence()?;
    let gain = ctx.number("gain")? as f32;
    let sample_rate = ctx.sample_rate;

    let acc = ctx.state.accumulator_mut();
    let (mut out, next) = ops::integrate(&input, sample_rate, *acc);
    *acc = next;

    if gain != 1.0 {
        for y in &mut out {
            *y *= gain;
        }
    }
    Ok(Signal::Real(out))
}

fn process_adder(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let inputs = ctx.real_inputs()?;
    if inputs.is_empty() {
        return Ok(Signal::Real(ctx.silence()));
    }
    Ok(Signal::Real(ops::sum(&inputs)))
}

fn process_multiplier(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let inputs = ctx.real_inputs()?;
    if inputs.is_empty() {
        return Ok(Signal::Real(ctx.silence()));
    }
    Ok(Signal::Real(ops::multiply(&inputs)))
}

fn process_hilbert(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let taps = ctx.count("taps")?;
    if taps % 2 == 0 {
        return Err(ProcessError::InvalidParam {
            name: "taps",
            reason: format!("must be odd, got {taps}"),
        });
    }
    let input = ctx.first_real_or_silence()?;
    Ok(Signal::Complex(
        ctx.state.hilbert_mut(taps).process_block(&input),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivulet_core::NodeState;

    fn run(
        desc: &BlockDescriptor,
        params: &Params,
        state: &mut NodeState,
        inputs: &[&Signal],
    ) -> Result<Signal, ProcessError> {
        let params = desc.default_params().overlay(params);
        let mut ctx = ProcessContext {
            node_id: "t",
            inputs,
            params: &params,
            state,
            source: None,
            sample_rate: 4.0,
            buffer_size: 4,
        };
        (desc.process)(&mut ctx)
    }

    #[test]
    fn integrator_carries_accumulator() {
        let ones = Signal::Real(vec![1.0; 4]);
        let mut state = NodeState::Empty;
        let a = run(&INTEGRATOR, &Params::new(), &mut state, &[&ones]).unwrap();
        let b = run(&INTEGRATOR, &Params::new(), &mut state, &[&ones]).unwrap();
        assert_eq!(a.as_real().unwrap(), &[0.25, 0.5, 0.75, 1.0]);
        assert_eq!(b.as_real().unwrap(), &[1.25, 1.5, 1.75, 2.0]);

        let doubled = run(
            &INTEGRATOR,
            &Params::new().with("gain", 2.0),
            &mut NodeState::Empty,
            &[&ones],
        )
        .unwrap();
        assert_eq!(doubled.as_real().unwrap(), &[0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn adder_and_multiplier_are_n_ary() {
        let a = Signal::Real(vec![1.0, 2.0, 3.0, 4.0]);
        let b = Signal::Real(vec![2.0; 4]);
        let c = Signal::Real(vec![0.5; 4]);
        let empty = NodeState::Empty;

        let sum = run(&ADDER, &Params::new(), &mut empty.clone(), &[&a, &b, &c]).unwrap();
        assert_eq!(sum.as_real().unwrap(), &[3.5, 4.5, 5.5, 6.5]);

        let product = run(&MULTIPLIER, &Params::new(), &mut empty.clone(), &[&a, &b, &c]).unwrap();
        assert_eq!(product.as_real().unwrap(), &[1.0, 2.0, 3.0, 4.0]);

        let silent = run(&ADDER, &Params::new(), &mut empty.clone(), &[]).unwrap();
        assert_eq!(silent.as_real().unwrap(), &[0.0; 4]);
    }

    #[test]
    fn hilbert_outputs_complex_and_requires_odd_taps() {
        let x = Signal::Real(vec![1.0, 0.0, -1.0, 0.0]);
        let out = run(&HILBERT, &Params::new(), &mut NodeState::Empty, &[&x]).unwrap();
        let analytic = out.as_complex().unwrap();
        assert_eq!(analytic.re, [1.0, 0.0, -1.0, 0.0]);
        assert_eq!(analytic.im.len(), 4);

        assert_eq!(HILBERT.validate_params(&Params::new().with("taps", 32)).len(), 1);
        assert!(HILBERT.validate_params(&Params::new().with("taps", 33)).is_empty());

        let err = run(
            &HILBERT,
            &Params::new().with("taps", 32),
            &mut NodeState::Empty,
            &[&x],
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidParam { name: "taps", .. }));
    }
}
