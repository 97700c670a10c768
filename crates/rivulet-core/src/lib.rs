//! Rivulet core: dataflow graph compiler and streaming execution engine.
//!
//! A host describes a graph of typed signal-processing blocks as plain node
//! and edge records. This crate validates and schedules that graph, then runs
//! it one fixed-size buffer at a time while carrying per-node state (phases,
//! filter histories, accumulators, playback offsets) from cycle to cycle.
//!
//! # Pipeline
//!
//! ```text
//! NodeDescriptor/EdgeDescriptor ──compile──▶ CompiledGraph ──initialize──▶ Engine
//!                                  ▲                                         │
//!                               Catalog ◀──────── dispatch by BlockKey ──────┘
//! ```
//!
//! - [`catalog`] - block registry, frozen and shared as `Arc<Catalog>`
//! - [`block`] - the block contract: descriptors, parameter fields, handler context
//! - [`graph`] - node/edge records and the compiler
//! - [`engine`] - the cycle executor and its statistics
//! - [`driver`] - bounded run loop with a cancel flag
//! - [`state`] - typed per-node runtime state
//! - [`source`] - the sample-source seam used by playback blocks
//!
//! The built-in blocks live in `rivulet-blocks`; this crate only knows the
//! contract, so tests and hosts can build catalogs of their own.

pub mod block;
pub mod catalog;
pub mod driver;
pub mod engine;
pub mod graph;
pub mod params;
pub mod signal;
pub mod source;
pub mod state;

pub use block::{
    BlockDescriptor, BlockGroup, ParamDefault, ParamField, ProcessContext, ProcessError,
    ProcessFn, Signals, ValidateFn,
};
pub use catalog::{BlockKey, Catalog, CatalogError};
pub use driver::{CycleDriver, DriverReport, StopReason};
pub use engine::{
    Engine, EngineConfig, EngineError, EngineState, EngineStats, SinkOutput, SinkOutputs,
};
pub use graph::{
    Compilation, CompileError, CompileErrors, CompileStats, CompiledGraph, EdgeDescriptor,
    NodeDescriptor, compile,
};
pub use params::{ParamValue, Params};
pub use signal::{Signal, SignalType};
pub use source::{MemorySource, SampleSource};
pub use state::{FirDesign, NodeState};

pub use rivulet_dsp::{ComplexBuffer, SpectralFrame};
