//! Built-in blocks for rivulet graphs.
//!
//! This crate provides the standard block set and builds a frozen
//! [`Catalog`] from it. Every block is a `const` [`BlockDescriptor`], so
//! hosts can also pick individual blocks into catalogs of their own.
//!
//! # Blocks
//!
//! - **Generators**: `sine`, `cosine`, `file-player`
//! - **Filters**: `fir-lowpass`, `fir-highpass`, `fir-bandpass`
//! - **Transforms**: `integrator`, `adder`, `multiplier`, `hilbert`
//! - **Detectors**: `phase-detector`, `frequency-detector`, `goertzel`
//! - **Sinks**: `oscilloscope`, `spectrum-analyzer`, `waterfall`, `constellation`
//!
//! # Example
//!
//! ```rust
//! use rivulet_blocks::standard_catalog;
//! use rivulet_core::{BlockGroup, EdgeDescriptor, NodeDescriptor, compile};
//!
//! let catalog = standard_catalog();
//! for block in catalog.blocks_in_group(BlockGroup::Filters) {
//!     println!("{}: {}", block.name, block.description);
//! }
//!
//! let nodes = [
//!     NodeDescriptor::new("osc", "sine"),
//!     NodeDescriptor::new("scope", "oscilloscope"),
//! ];
//! let edges = [EdgeDescriptor::new("e1", "osc", "scope")];
//! let compiled = compile(&catalog, &nodes, &edges).unwrap();
//! assert_eq!(compiled.graph.order_ids(), ["osc", "scope"]);
//! ```

use std::sync::Arc;

use rivulet_core::{BlockDescriptor, Catalog, CatalogError};

pub mod detectors;
pub mod filters;
pub mod generators;
pub mod sinks;
pub mod transforms;

pub use detectors::{FREQUENCY_DETECTOR, GOERTZEL, PHASE_DETECTOR};
pub use filters::{FIR_BANDPASS, FIR_HIGHPASS, FIR_LOWPASS};
pub use generators::{COSINE, FILE_PLAYER, SINE};
pub use sinks::{CONSTELLATION, OSCILLOSCOPE, SPECTRUM_ANALYZER, WATERFALL};
pub use transforms::{ADDER, HILBERT, INTEGRATOR, MULTIPLIER};

/// Every built-in block, in palette order.
pub fn builtin_blocks() -> impl Iterator<Item = &'static BlockDescriptor> {
    generators::BLOCKS
        .iter()
        .chain(filters::BLOCKS)
        .chain(transforms::BLOCKS)
        .chain(detectors::BLOCKS)
        .chain(sinks::BLOCKS)
}

/// Registers every built-in block into `catalog`.
///
/// Use this to extend the standard set with host blocks before freezing.
pub fn register_builtins(catalog: &mut Catalog) -> Result<(), CatalogError> {
    for block in builtin_blocks() {
        catalog.register(*block)?;
    }
    Ok(())
}

/// A frozen catalog holding the built-in blocks.
pub fn standard_catalog() -> Arc<Catalog> {
    let mut catalog = Catalog::new();
    if let Err(e) = register_builtins(&mut catalog) {
        tracing::error!("standard_catalog: {e}");
    }
    catalog.freeze();
    tracing::debug!("standard_catalog: {} blocks", catalog.len());
    Arc::new(catalog)
}
