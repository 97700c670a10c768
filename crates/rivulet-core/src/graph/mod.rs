//! Graph compiler for rivulet dataflow graphs.
//!
//! Hosts describe a graph as plain [`NodeDescriptor`] and [`EdgeDescriptor`]
//! records and hand them to [`compile`] together with a [`Catalog`]. Every
//! structural edit recompiles from scratch; a successful compile replaces the
//! previous [`CompiledGraph`] wholesale, and a failed one leaves nothing
//! runnable.
//!
//! # Example
//!
//! ```rust,ignore
//! use rivulet_core::graph::{compile, EdgeDescriptor, NodeDescriptor};
//!
//! let nodes = vec![
//!     NodeDescriptor::new("osc", "sine"),
//!     NodeDescriptor::new("lp", "fir-lowpass"),
//!     NodeDescriptor::new("scope", "oscilloscope"),
//! ];
//! let edges = vec![
//!     EdgeDescriptor::new("e1", "osc", "lp"),
//!     EdgeDescriptor::new("e2", "lp", "scope"),
//! ];
//! let compiled = compile(&catalog, &nodes, &edges)?;
//! assert_eq!(compiled.graph.order_ids(), ["osc", "lp", "scope"]);
//! ```
//!
//! [`Catalog`]: crate::Catalog

mod compile;
pub mod node;
pub mod plan;

pub use compile::{Compilation, CompileError, CompileErrors, compile};
pub use node::{EdgeDescriptor, NodeDescriptor};
pub use plan::{CompileStats, CompiledGraph};
