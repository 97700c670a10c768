//! Windowed-sinc FIR filter blocks.
//!
//! Each node runs its input through a [`StreamingFir`] kept in its state, so
//! the output never depends on where buffer boundaries fall. Taps are
//! designed on the first cycle and again only when the order, a cutoff or
//! the sample rate changes.
//!
//! A cutoff at or above Nyquist is a run-time error: the block's validator
//! cannot know the sample rate the engine will use.
//!
//! [`StreamingFir`]: rivulet_dsp::StreamingFir

use rivulet_core::{
    BlockDescriptor, BlockGroup, FirDesign, ParamField, Params, ProcessContext, ProcessError,
    Signal, SignalType, Signals,
};
use rivulet_dsp::{DesignError, fir};

const ORDER: ParamField = ParamField::number("order", "Order", 64.0, 2.0, 1024.0).with_unit("taps");

/// Lowpass FIR.
pub const FIR_LOWPASS: BlockDescriptor = BlockDescriptor {
    id: "fir-lowpass",
    name: "FIR Lowpass",
    icon: "filter-low",
    group: BlockGroup::Filters,
    description: "Hamming-windowed sinc lowpass with unity DC gain",
    signals: Signals::transform(SignalType::Real, SignalType::Real),
    param_fields: &[
        ORDER,
        ParamField::number("cutoff", "Cutoff", 1000.0, 1.0, 96_000.0).with_unit("Hz"),
    ],
    validate: None,
    process: process_lowpass,
};

/// Highpass FIR by spectral inversion.
pub const FIR_HIGHPASS: BlockDescriptor = BlockDescriptor {
    id: "fir-highpass",
    name: "FIR Highpass",
    icon: "filter-high",
    group: BlockGroup::Filters,
    description: "Spectrally inverted windowed-sinc highpass",
    signals: Signals::transform(SignalType::Real, SignalType::Real),
    param_fields: &[
        ORDER,
        ParamField::number("cutoff", "Cutoff", 1000.0, 1.0, 96_000.0).with_unit("Hz"),
    ],
    validate: None,
    process: process_highpass,
};

/// Bandpass FIR as the difference of two lowpass designs.
pub const FIR_BANDPASS: BlockDescriptor = BlockDescriptor {
    id: "fir-bandpass",
    name: "FIR Bandpass",
    icon: "filter-band",
    group: BlockGroup::Filters,
    description: "Passes the band between two cutoffs",
    signals: Signals::transform(SignalType::Real, SignalType::Real),
    param_fields: &[
        ORDER,
        ParamField::number("low_cutoff", "Low Cutoff", 500.0, 1.0, 96_000.0).with_unit("Hz"),
        ParamField::number("high_cutoff", "High Cutoff", 2000.0, 1.0, 96_000.0).with_unit("Hz"),
    ],
    validate: Some(validate_bandpass),
    process: process_bandpass,
};

pub(crate) const BLOCKS: &[BlockDescriptor] = &[FIR_LOWPASS, FIR_HIGHPASS, FIR_BANDPASS];

fn validate_bandpass(params: &Params) -> Vec<String> {
    match (params.number("low_cutoff"), params.number("high_cutoff")) {
        (Some(low), Some(high)) if low >= high => vec![format!(
            "low_cutoff ({low} Hz) must be below high_cutoff ({high} Hz)"
        )],
        _ => Vec::new(),
    }
}

fn process_lowpass(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let order = ctx.count("order")?;
    let cutoff = ctx.number("cutoff")?;
    let design = design_of(ctx, order, cutoff, cutoff);
    filter(ctx, design, |fs| fir::lowpass_coefficients(order, cutoff as f32, fs))
}

fn process_highpass(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let order = ctx.count("order")?;
    let cutoff = ctx.number("cutoff")?;
    let design = design_of(ctx, order, cutoff, cutoff);
    filter(ctx, design, |fs| fir::highpass_coefficients(order, cutoff as f32, fs))
}

fn process_bandpass(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    let order = ctx.count("order")?;
    let low = ctx.number("low_cutoff")?;
    let high = ctx.number("high_cutoff")?;
    let design = design_of(ctx, order, low, high);
    filter(ctx, design, |fs| {
        fir::bandpass_coefficients(order, low as f32, high as f32, fs)
    })
}

fn design_of(ctx: &ProcessContext<'_>, order: usize, low: f64, high: f64) -> FirDesign {
    FirDesign {
        order,
        low,
        high,
        sample_rate: ctx.sample_rate,
    }
}

fn filter(
    ctx: &mut ProcessContext<'_>,
    design: FirDesign,
    coefficients: impl FnOnce(f32) -> Result<Vec<f32>, DesignError>,
) -> Result<Signal, ProcessError> {
    let input = ctx.first_real_or_silence()?;
    let fir = ctx
        .state
        .fir_for(design, || coefficients(design.sample_rate))?;
    Ok(Signal::Real(fir.process_block(&input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivulet_core::NodeState;

    fn run(
        desc: &BlockDescriptor,
        params: &Params,
        state: &mut NodeState,
        input: &Signal,
    ) -> Result<Signal, ProcessError> {
        let params = desc.default_params().overlay(params);
        let inputs = [input];
        let mut ctx = ProcessContext {
            node_id: "f",
            inputs: &inputs,
            params: &params,
            state,
            source: None,
            sample_rate: 48000.0,
            buffer_size: input.len(),
        };
        (desc.process)(&mut ctx)
    }

    #[test]
    fn block_boundaries_do_not_change_output() {
        let signal = rivulet_dsp::generator::sine(3000.0, 1.0, 48000.0, 256, 0.0);
        let params = Params::new().with("order", 31).with("cutoff", 2000.0);
        let coeffs = fir::lowpass_coefficients(31, 2000.0, 48000.0).unwrap();
        let expected = fir::convolve(&signal, &coeffs);

        let mut state = NodeState::Empty;
        let mut streamed = Vec::new();
        for chunk in signal.chunks(64) {
            let out = run(&FIR_LOWPASS, &params, &mut state, &Signal::Real(chunk.to_vec())).unwrap();
            streamed.extend_from_slice(out.as_real().unwrap());
        }
        for (a, b) in streamed.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn taps_follow_parameter_changes() {
        let input = Signal::Real(vec![1.0; 16]);
        let mut state = NodeState::Empty;
        let params = Params::new().with("order", 16).with("cutoff", 1000.0);
        run(&FIR_LOWPASS, &params, &mut state, &input).unwrap();
        let NodeState::Fir { design, filter } = &state else {
            panic!("expected FIR state, got {state:?}");
        };
        assert_eq!(design.order, 16);
        assert_eq!(design.sample_rate, 48000.0);
        let first = filter.coefficients().to_vec();

        run(&FIR_LOWPASS, &params, &mut state, &input).unwrap();
        let NodeState::Fir { filter, .. } = &state else {
            panic!("expected FIR state");
        };
        assert_eq!(filter.coefficients(), first.as_slice());

        let params = params.with("cutoff", 4000.0);
        run(&FIR_LOWPASS, &params, &mut state, &input).unwrap();
        let NodeState::Fir { design, filter } = &state else {
            panic!("expected FIR state");
        };
        assert_eq!(design.low, 4000.0);
        assert_ne!(filter.coefficients(), first.as_slice());
    }

    #[test]
    fn cutoff_above_nyquist_is_a_design_error() {
        let params = Params::new().with("cutoff", 30000.0);
        let err = run(
            &FIR_HIGHPASS,
            &params,
            &mut NodeState::Empty,
            &Signal::Real(vec![0.0; 8]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Design(DesignError::CutoffOutOfRange { .. })
        ));
    }

    #[test]
    fn bandpass_rejects_inverted_band() {
        let bad = Params::new().with("low_cutoff", 3000.0).with("high_cutoff", 1000.0);
        let errors = FIR_BANDPASS.validate_params(&bad);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must be below"));
        assert!(FIR_BANDPASS.validate_params(&Params::new()).is_empty());
    }

    #[test]
    fn complex_input_is_rejected() {
        let input = Signal::Complex(rivulet_dsp::ComplexBuffer::zeros(4));
        let err = run(&FIR_LOWPASS, &Params::new(), &mut NodeState::Empty, &input).unwrap_err();
        assert!(matches!(err, ProcessError::InputType { index: 0, .. }));
    }
}
