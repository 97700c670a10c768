//! Typed per-node runtime state.
//!
//! The engine keeps one [`NodeState`] per planned node in an arena indexed by
//! plan slot. Slots start out [`NodeState::Empty`] and are initialized lazily
//! by the handler on first use through the accessors below. This is the only
//! memory that survives from one cycle to the next.

use rivulet_dsp::{Fft, HilbertTransform, SlidingFft, StreamingFir};

/// Inputs a FIR's taps were designed from.
///
/// Single-edge filters store their cutoff in both `low` and `high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirDesign {
    /// Tap count.
    pub order: usize,
    /// Lower band edge in Hz.
    pub low: f64,
    /// Upper band edge in Hz.
    pub high: f64,
    /// Sample rate the taps were designed for.
    pub sample_rate: f32,
}

/// Persistent state of one node.
#[derive(Debug, Clone, Default)]
pub enum NodeState {
    /// Not yet touched, or a stateless block.
    #[default]
    Empty,
    /// Phase accumulator in radians, kept in `[0, 2π)`.
    Oscillator {
        /// Phase at the start of the next cycle.
        phase: f64,
    },
    /// FIR ring buffer and the design its taps came from.
    Fir {
        /// Design inputs of `filter`.
        design: FirDesign,
        /// Taps plus history.
        filter: StreamingFir,
    },
    /// Quadrature FIR ring buffer of a Hilbert transformer.
    Hilbert(HilbertTransform),
    /// Planned FFT of a spectrum view.
    Spectrum(Fft),
    /// Planned sliding FFT of a spectrogram view.
    Waterfall(SlidingFft),
    /// Running integral.
    Integrator {
        /// Accumulator value after the last sample.
        accumulator: f64,
    },
    /// Read position of a sample source.
    Playback {
        /// Next frame to read.
        offset: usize,
    },
}

impl NodeState {
    /// The oscillator phase, initializing it to `initial` on first use.
    pub fn phase_mut(&mut self, initial: f64) -> &mut f64 {
        if !matches!(self, NodeState::Oscillator { .. }) {
            *self = NodeState::Oscillator { phase: initial };
        }
        match self {
            NodeState::Oscillator { phase } => phase,
            _ => unreachable!("state was just set to Oscillator"),
        }
    }

    /// The FIR filter for `design`, with zeroed history on first use.
    ///
    /// `coefficients` only runs when the slot holds no filter or one built
    /// from a different design, so a parameter change never runs new taps
    /// over stale history and an unchanged design costs one comparison.
    pub fn fir_for<E>(
        &mut self,
        design: FirDesign,
        coefficients: impl FnOnce() -> Result<Vec<f32>, E>,
    ) -> Result<&mut StreamingFir, E> {
        let current = matches!(self, NodeState::Fir { design: d, .. } if *d == design);
        if !current {
            let filter = StreamingFir::new(coefficients()?);
            *self = NodeState::Fir { design, filter };
        }
        match self {
            NodeState::Fir { filter, .. } => Ok(filter),
            _ => unreachable!("state was just set to Fir"),
        }
    }

    /// The FFT for `size` points, planned on first use or on a size change.
    pub fn fft_for(&mut self, size: usize) -> &Fft {
        let planned = size.max(1).next_power_of_two();
        let current = matches!(self, NodeState::Spectrum(fft) if fft.size() == planned);
        if !current {
            *self = NodeState::Spectrum(Fft::new(size));
        }
        match self {
            NodeState::Spectrum(fft) => fft,
            _ => unreachable!("state was just set to Spectrum"),
        }
    }

    /// The sliding-FFT analyzer, rebuilt when its framing changes.
    pub fn sliding_fft_for(
        &mut self,
        window: usize,
        overlap: usize,
        reference: f32,
    ) -> &SlidingFft {
        let current = matches!(
            self,
            NodeState::Waterfall(sf)
                if sf.window_size() == window.max(1)
                    && sf.hop_size() == window.saturating_sub(overlap).max(1)
                    && sf.reference() == reference
        );
        if !current {
            *self = NodeState::Waterfall(SlidingFft::new(window, overlap, reference));
        }
        match self {
            NodeState::Waterfall(sf) => sf,
            _ => unreachable!("state was just set to Waterfall"),
        }
    }

    /// The Hilbert transformer, rebuilt when the tap count changes.
    pub fn hilbert_mut(&mut self, taps: usize) -> &mut HilbertTransform {
        let stale = match self {
            NodeState::Hilbert(h) => h.taps() != taps,
            _ => true,
        };
        if stale {
            *self = NodeState::Hilbert(HilbertTransform::new(taps));
        }
        match self {
            NodeState::Hilbert(h) => h,
            _ => unreachable!("state was just set to Hilbert"),
        }
    }

    /// The integrator accumulator, starting from zero.
    pub fn accumulator_mut(&mut self) -> &mut f64 {
        if !matches!(self, NodeState::Integrator { .. }) {
            *self = NodeState::Integrator { accumulator: 0.0 };
        }
        match self {
            NodeState::Integrator { accumulator } => accumulator,
            _ => unreachable!("state was just set to Integrator"),
        }
    }

    /// The playback offset, starting from zero.
    pub fn offset_mut(&mut self) -> &mut usize {
        if !matches!(self, NodeState::Playback { .. }) {
            *self = NodeState::Playback { offset: 0 };
        }
        match self {
            NodeState::Playback { offset } => offset,
            _ => unreachable!("state was just set to Playback"),
        }
    }

    /// Returns true if the slot has not been initialized.
    pub fn is_empty(&self) -> bool {
        matches!(self, NodeState::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazily_initialized_and_persistent() {
        let mut s = NodeState::Empty;
        *s.phase_mut(1.5) += 0.5;
        assert_eq!(*s.phase_mut(0.0), 2.0);
    }

    #[test]
    fn kind_change_reinitializes() {
        let mut s = NodeState::Integrator { accumulator: 3.0 };
        assert_eq!(*s.offset_mut(), 0);
        assert_eq!(*s.accumulator_mut(), 0.0);
    }

    fn design(order: usize, cutoff: f64) -> FirDesign {
        FirDesign {
            order,
            low: cutoff,
            high: cutoff,
            sample_rate: 1000.0,
        }
    }

    #[test]
    fn fir_redesigned_only_when_design_changes() {
        let mut s = NodeState::Empty;
        let mut designs = 0;
        let mut taps = |c: Vec<f32>| {
            designs += 1;
            Ok::<_, ()>(c)
        };
        s.fir_for(design(2, 100.0), || taps(vec![0.5, 0.5]))
            .unwrap()
            .process(1.0);
        // Same design: history kept, taps not recomputed.
        let fir = s.fir_for(design(2, 100.0), || taps(vec![9.0, 9.0])).unwrap();
        assert_eq!(fir.process(0.0), 0.5);
        // New design: history dropped.
        let fir = s.fir_for(design(1, 100.0), || taps(vec![1.0])).unwrap();
        assert_eq!(fir.process(0.0), 0.0);
        assert_eq!(designs, 2);
    }

    #[test]
    fn failed_design_keeps_previous_filter() {
        let mut s = NodeState::Empty;
        s.fir_for(design(1, 100.0), || Ok::<_, ()>(vec![2.0])).unwrap();
        assert!(s.fir_for(design(1, 900.0), || Err(())).is_err());
        let fir = s.fir_for(design(1, 100.0), || Err(())).unwrap();
        assert_eq!(fir.coefficients(), &[2.0]);
    }

    #[test]
    fn fft_plan_cached_per_size() {
        let mut s = NodeState::Empty;
        assert_eq!(s.fft_for(1000).size(), 1024);
        assert!(matches!(s, NodeState::Spectrum(_)));
        assert_eq!(s.fft_for(1024).size(), 1024);
        assert_eq!(s.fft_for(64).size(), 64);

        assert_eq!(s.sliding_fft_for(256, 128, 1.0).hop_size(), 128);
        assert_eq!(s.sliding_fft_for(256, 192, 1.0).hop_size(), 64);
    }

    #[test]
    fn hilbert_tracks_tap_count() {
        let mut s = NodeState::Empty;
        assert_eq!(s.hilbert_mut(31).taps(), 31);
        assert_eq!(s.hilbert_mut(63).taps(), 63);
        assert!(!s.is_empty());
    }
}
