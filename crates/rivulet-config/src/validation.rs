//! Settings and graph document validation.
//!
//! Structural graph checks (connections, types, cycles) belong to the
//! compiler. This module covers what the compiler deliberately ignores:
//! engine settings ranges, and whether each node names a known block with
//! parameters its block accepts.

use rivulet_core::Catalog;
use thiserror::Error;

use crate::document::GraphDocument;
use crate::settings::EngineSettings;

/// Largest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// Largest accepted cycle buffer in samples.
pub const MAX_BUFFER_SIZE: usize = 1 << 16;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A numeric setting outside its accepted range.
    #[error("setting '{name}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },

    /// A node names a block the catalog does not know.
    #[error("node '{node}' uses unknown block type '{block_type}'")]
    UnknownBlock {
        /// Node id.
        node: String,
        /// Requested block type.
        block_type: String,
    },

    /// A node's parameters fail its block's checks.
    #[error("node '{node}': {}", .messages.join("; "))]
    InvalidParams {
        /// Node id.
        node: String,
        /// Messages reported by the block.
        messages: Vec<String>,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Folds a list of errors into one, or `Ok` when empty.
    pub fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(name: &'static str, value: u64, min: u64, max: u64) -> Option<ValidationError> {
    (value < min || value > max).then_some(ValidationError::OutOfRange {
        name,
        value,
        min,
        max,
    })
}

/// Validate engine settings.
///
/// `cycles == 0` is accepted and means "run until cancelled".
pub fn validate_settings(settings: &EngineSettings) -> ValidationResult<()> {
    let errors = [
        check_range(
            "sample_rate",
            u64::from(settings.sample_rate),
            1,
            u64::from(MAX_SAMPLE_RATE),
        ),
        check_range(
            "buffer_size",
            settings.buffer_size as u64,
            1,
            MAX_BUFFER_SIZE as u64,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();
    ValidationError::collect(errors)
}

/// Check every node of `document` against `catalog`.
///
/// Unknown block types are reported here even though the engine tolerates
/// them, so hosts can warn before running.
pub fn validate_document(document: &GraphDocument, catalog: &Catalog) -> ValidationResult<()> {
    let errors = document
        .nodes
        .iter()
        .filter_map(|node| {
            if catalog.get(&node.block_type).is_none() {
                return Some(ValidationError::UnknownBlock {
                    node: node.id.clone(),
                    block_type: node.block_type.clone(),
                });
            }
            let messages = catalog.validate_params(&node.block_type, &node.params);
            (!messages.is_empty()).then(|| ValidationError::InvalidParams {
                node: node.id.clone(),
                messages,
            })
        })
        .collect();
    ValidationError::collect(errors)
}
