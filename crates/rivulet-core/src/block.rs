//! The block contract: what a catalog entry declares and how it is invoked.
//!
//! A block is plain data plus two function pointers. The compiler reads the
//! declared [`Signals`] to type-check edges; the engine calls
//! [`BlockDescriptor::process`] once per node per cycle with a
//! [`ProcessContext`] that owns nothing but borrows everything the handler
//! needs.

use std::fmt;

use rivulet_dsp::ComplexBuffer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::{ParamValue, Params};
use crate::signal::{Signal, SignalType};
use crate::source::SampleSource;
use crate::state::NodeState;

/// Palette group a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockGroup {
    /// Blocks with no input.
    Generators,
    /// Frequency-selective filters.
    Filters,
    /// Arithmetic and domain transforms.
    Transforms,
    /// Phase, frequency and tone detectors.
    Detectors,
    /// Terminal visualization blocks.
    Sinks,
}

impl BlockGroup {
    /// Every group, in palette order.
    pub const ALL: [BlockGroup; 5] = [
        BlockGroup::Generators,
        BlockGroup::Filters,
        BlockGroup::Transforms,
        BlockGroup::Detectors,
        BlockGroup::Sinks,
    ];

    /// Lowercase identifier.
    pub const fn id(self) -> &'static str {
        match self {
            BlockGroup::Generators => "generators",
            BlockGroup::Filters => "filters",
            BlockGroup::Transforms => "transforms",
            BlockGroup::Detectors => "detectors",
            BlockGroup::Sinks => "sinks",
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            BlockGroup::Generators => "Generators",
            BlockGroup::Filters => "Filters",
            BlockGroup::Transforms => "Transforms",
            BlockGroup::Detectors => "Detectors",
            BlockGroup::Sinks => "Sinks",
        }
    }

    /// Parses a group from its identifier, case-insensitively.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for BlockGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared input and output port types.
///
/// `input == None` marks a generator, `output == None` a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    /// Type accepted on the input port.
    pub input: Option<SignalType>,
    /// Type produced on the output port.
    pub output: Option<SignalType>,
}

impl Signals {
    /// A generator producing `output`.
    pub const fn generator(output: SignalType) -> Self {
        Self {
            input: None,
            output: Some(output),
        }
    }

    /// A block mapping `input` to `output`.
    pub const fn transform(input: SignalType, output: SignalType) -> Self {
        Self {
            input: Some(input),
            output: Some(output),
        }
    }

    /// A sink accepting `input`.
    pub const fn sink(input: SignalType) -> Self {
        Self {
            input: Some(input),
            output: None,
        }
    }
}

/// Default value of a parameter field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    /// Numeric default.
    Number(f64),
    /// Boolean default.
    Bool(bool),
    /// Text default.
    Text(&'static str),
}

impl ParamDefault {
    /// Converts to an owned parameter value.
    pub fn to_value(self) -> ParamValue {
        match self {
            ParamDefault::Number(v) => ParamValue::Number(v),
            ParamDefault::Bool(v) => ParamValue::Bool(v),
            ParamDefault::Text(v) => ParamValue::Text(v.to_owned()),
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            ParamDefault::Number(_) => "number",
            ParamDefault::Bool(_) => "bool",
            ParamDefault::Text(_) => "text",
        }
    }
}

/// Description of one editable parameter, used for defaults, range checks
/// and UI generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamField {
    /// Key in the node's parameter map.
    pub name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Default value; also fixes the expected type.
    pub default: ParamDefault,
    /// Inclusive lower bound for numbers.
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers.
    pub max: Option<f64>,
    /// Unit suffix for display ("Hz", "taps").
    pub unit: &'static str,
}

impl ParamField {
    /// A bounded numeric field.
    pub const fn number(
        name: &'static str,
        label: &'static str,
        default: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name,
            label,
            default: ParamDefault::Number(default),
            min: Some(min),
            max: Some(max),
            unit: "",
        }
    }

    /// A boolean field.
    pub const fn flag(name: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            name,
            label,
            default: ParamDefault::Bool(default),
            min: None,
            max: None,
            unit: "",
        }
    }

    /// A free text field.
    pub const fn text(name: &'static str, label: &'static str, default: &'static str) -> Self {
        Self {
            name,
            label,
            default: ParamDefault::Text(default),
            min: None,
            max: None,
            unit: "",
        }
    }

    /// Sets the display unit.
    #[must_use]
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Checks one value against this field's type and range.
    pub fn check(&self, value: &ParamValue) -> Option<String> {
        match (self.default, value) {
            (ParamDefault::Number(_), ParamValue::Number(v)) => {
                if !v.is_finite() {
                    return Some(format!("{} must be a finite number", self.name));
                }
                if let Some(min) = self.min
                    && *v < min
                {
                    return Some(format!("{} must be at least {min}, got {v}", self.name));
                }
                if let Some(max) = self.max
                    && *v > max
                {
                    return Some(format!("{} must be at most {max}, got {v}", self.name));
                }
                None
            }
            (ParamDefault::Bool(_), ParamValue::Bool(_))
            | (ParamDefault::Text(_), ParamValue::Text(_)) => None,
            (expected, got) => Some(format!(
                "{} must be a {}, got {}",
                self.name,
                expected.type_name(),
                got.type_name()
            )),
        }
    }
}

/// Block-specific validation beyond per-field range checks.
pub type ValidateFn = fn(&Params) -> Vec<String>;

/// A block's per-cycle handler.
pub type ProcessFn = fn(&mut ProcessContext<'_>) -> Result<Signal, ProcessError>;

/// Catalog entry for one block type.
#[derive(Clone, Copy)]
pub struct BlockDescriptor {
    /// Stable identifier used as `blockType` in node records.
    pub id: &'static str,
    /// Unique display name.
    pub name: &'static str,
    /// Icon key for the palette.
    pub icon: &'static str,
    /// Palette group.
    pub group: BlockGroup,
    /// One-line description.
    pub description: &'static str,
    /// Declared port types.
    pub signals: Signals,
    /// Editable parameters and their defaults.
    pub param_fields: &'static [ParamField],
    /// Optional cross-field validator.
    pub validate: Option<ValidateFn>,
    /// Per-cycle handler.
    pub process: ProcessFn,
}

impl BlockDescriptor {
    /// Returns true if the block has no input port.
    pub fn is_generator(&self) -> bool {
        self.signals.input.is_none()
    }

    /// Returns true if the block has no output port.
    pub fn is_sink(&self) -> bool {
        self.signals.output.is_none()
    }

    /// Defaults of every declared field.
    pub fn default_params(&self) -> Params {
        self.param_fields
            .iter()
            .map(|f| (f.name, f.default.to_value()))
            .collect()
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&ParamField> {
        self.param_fields.iter().find(|f| f.name == name)
    }

    /// Runs the field checks followed by the block validator over the
    /// effective parameters (defaults overlaid with `params`).
    pub fn validate_params(&self, params: &Params) -> Vec<String> {
        let effective = self.default_params().overlay(params);
        let mut errors: Vec<String> = self
            .param_fields
            .iter()
            .filter_map(|field| effective.get(field.name).and_then(|v| field.check(v)))
            .collect();
        if errors.is_empty()
            && let Some(validate) = self.validate
        {
            errors.extend(validate(&effective));
        }
        errors
    }
}

impl fmt::Debug for BlockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("group", &self.group)
            .field("signals", &self.signals)
            .finish_non_exhaustive()
    }
}

/// Errors raised by block handlers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProcessError {
    /// An input carried a signal of the wrong shape.
    #[error("input {index} must be {expected}, got {got}")]
    InputType {
        /// Position of the input in dependency order.
        index: usize,
        /// Shape the block expects.
        expected: &'static str,
        /// Shape that arrived.
        got: &'static str,
    },

    /// A required parameter is missing or has the wrong type.
    #[error("parameter '{0}' is missing or not a number")]
    MissingParam(&'static str),

    /// A parameter is outside the range the handler can work with.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The block needs a sample source that was never attached.
    #[error("no sample source attached")]
    MissingSource,

    /// Filter design failed for the current parameters.
    #[error(transparent)]
    Design(#[from] rivulet_dsp::DesignError),
}

/// Everything a handler may read or mutate during one invocation.
pub struct ProcessContext<'a> {
    /// Id of the node being processed.
    pub node_id: &'a str,
    /// Outputs of this node's dependencies, in edge order.
    pub inputs: &'a [&'a Signal],
    /// Effective parameters.
    pub params: &'a Params,
    /// The node's persistent state slot.
    pub state: &'a mut NodeState,
    /// Sample source attached to this node, if any.
    pub source: Option<&'a dyn SampleSource>,
    /// Engine sample rate in Hz.
    pub sample_rate: f32,
    /// Samples per cycle.
    pub buffer_size: usize,
}

impl ProcessContext<'_> {
    /// A zero buffer of the cycle length.
    pub fn silence(&self) -> Vec<f32> {
        vec![0.0; self.buffer_size]
    }

    /// Samples of real input `index`.
    ///
    /// Returns `Ok(None)` when the input is not connected.
    pub fn real_input(&self, index: usize) -> Result<Option<&[f32]>, ProcessError> {
        match self.inputs.get(index) {
            None => Ok(None),
            Some(Signal::Real(samples)) => Ok(Some(samples)),
            Some(other) => Err(ProcessError::InputType {
                index,
                expected: "real",
                got: other.kind_name(),
            }),
        }
    }

    /// The first real input, or a silent buffer when nothing is connected.
    pub fn first_real_or_silence(&self) -> Result<Vec<f32>, ProcessError> {
        Ok(match self.real_input(0)? {
            Some(samples) => samples.to_vec(),
            None => self.silence(),
        })
    }

    /// All inputs as real sample slices.
    pub fn real_inputs(&self) -> Result<Vec<&[f32]>, ProcessError> {
        (0..self.inputs.len())
            .filter_map(|i| self.real_input(i).transpose())
            .collect()
    }

    /// Complex input `index`.
    ///
    /// Returns `Ok(None)` when the input is not connected.
    pub fn complex_input(&self, index: usize) -> Result<Option<&ComplexBuffer>, ProcessError> {
        match self.inputs.get(index) {
            None => Ok(None),
            Some(Signal::Complex(buffer)) => Ok(Some(buffer)),
            Some(other) => Err(ProcessError::InputType {
                index,
                expected: "complex",
                got: other.kind_name(),
            }),
        }
    }

    /// The first complex input, or a silent buffer when nothing is connected.
    pub fn first_complex_or_silence(&self) -> Result<ComplexBuffer, ProcessError> {
        Ok(match self.complex_input(0)? {
            Some(buffer) => buffer.clone(),
            None => ComplexBuffer::zeros(self.buffer_size),
        })
    }

    /// A required numeric parameter.
    pub fn number(&self, name: &'static str) -> Result<f64, ProcessError> {
        self.params
            .number(name)
            .ok_or(ProcessError::MissingParam(name))
    }

    /// A numeric parameter with a fallback.
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.params.number(name).unwrap_or(default)
    }

    /// A required numeric parameter rounded to a non-negative count.
    pub fn count(&self, name: &'static str) -> Result<usize, ProcessError> {
        let value = self.number(name)?;
        if !(value.is_finite() && value >= 0.0) {
            return Err(ProcessError::InvalidParam {
                name,
                reason: format!("expected a non-negative count, got {value}"),
            });
        }
        Ok(value.round() as usize)
    }

    /// A flag parameter with a fallback.
    pub fn flag_or(&self, name: &str, default: bool) -> bool {
        self.params.flag(name).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[ParamField] = &[
        ParamField::number("cutoff", "Cutoff", 1000.0, 1.0, 20000.0).with_unit("Hz"),
        ParamField::flag("loop", "Loop", false),
    ];

    fn noop(_: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
        Ok(Signal::silence(0))
    }

    fn descriptor() -> BlockDescriptor {
        BlockDescriptor {
            id: "test",
            name: "Test",
            icon: "t",
            group: BlockGroup::Filters,
            description: "",
            signals: Signals::transform(SignalType::Real, SignalType::Real),
            param_fields: FIELDS,
            validate: None,
            process: noop,
        }
    }

    #[test]
    fn defaults_come_from_fields() {
        let d = descriptor().default_params();
        assert_eq!(d.number("cutoff"), Some(1000.0));
        assert_eq!(d.flag("loop"), Some(false));
        assert_eq!(descriptor().field("cutoff").map(|f| f.unit), Some("Hz"));
    }

    #[test]
    fn field_checks_range_and_type() {
        let desc = descriptor();
        assert!(desc.validate_params(&Params::new()).is_empty());

        let errs = desc.validate_params(&Params::new().with("cutoff", 0.5));
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("at least"));

        let errs = desc.validate_params(&Params::new().with("loop", 3.0));
        assert!(errs[0].contains("must be a bool"));
    }

    #[test]
    fn group_round_trips_through_id() {
        for g in BlockGroup::ALL {
            assert_eq!(BlockGroup::from_id(g.id()), Some(g));
        }
        assert_eq!(BlockGroup::from_id("FILTERS"), Some(BlockGroup::Filters));
        assert_eq!(BlockGroup::from_id("nope"), None);
    }

    #[test]
    fn context_input_helpers() {
        let real = Signal::Real(vec![1.0, 2.0]);
        let complex = Signal::Complex(ComplexBuffer::zeros(2));
        let inputs = [&real, &complex];
        let params = Params::new().with("taps", 31);
        let mut state = NodeState::Empty;
        let ctx = ProcessContext {
            node_id: "n",
            inputs: &inputs,
            params: &params,
            state: &mut state,
            source: None,
            sample_rate: 48000.0,
            buffer_size: 4,
        };

        assert_eq!(ctx.real_input(0).unwrap(), Some(&[1.0, 2.0][..]));
        assert!(matches!(
            ctx.real_input(1),
            Err(ProcessError::InputType { index: 1, .. })
        ));
        assert_eq!(ctx.real_input(2).unwrap(), None);
        assert!(ctx.complex_input(1).unwrap().is_some());
        assert_eq!(ctx.count("taps").unwrap(), 31);
        assert_eq!(ctx.number("missing"), Err(ProcessError::MissingParam("missing")));
        assert_eq!(ctx.number_or("missing", 2.5), 2.5);
    }
}
