//! Streaming execution engine.
//!
//! [`Engine`] runs a [`CompiledGraph`] one cycle at a time. Each cycle walks
//! the plan in topological order, hands every node the outputs its
//! dependencies produced earlier in the same cycle, and keeps nothing between
//! cycles except the per-node [`NodeState`] arena.
//!
//! # States
//!
//! ```text
//!   Idle ──initialize──▶ Ready ──start──▶ Running
//!                          ▲                 │
//!                          └──stop / error───┘
//! ```
//!
//! `initialize` may be called again from `Ready` or `Running`; it installs the
//! new plan, drops all runtime state and lands in `Ready`. `start` also drops
//! runtime state, so every run begins with fresh oscillator phases and empty
//! filter histories.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut engine = Engine::new(catalog);
//! engine.initialize(compiled.graph, EngineConfig::default())?;
//! engine.start();
//! while let Some(sinks) = engine.execute_one_cycle()? {
//!     render(&sinks);
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::block::{ProcessContext, ProcessError};
use crate::catalog::Catalog;
use crate::graph::{CompiledGraph, NodeDescriptor};
use crate::params::Params;
use crate::signal::Signal;
use crate::source::SampleSource;
use crate::state::NodeState;

/// Sample rate and cycle length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Samples produced per node per cycle.
    pub buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            buffer_size: 1024,
        }
    }
}

/// Lifecycle state of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No graph installed.
    Idle,
    /// Graph installed, not producing cycles.
    Ready,
    /// Producing cycles.
    Running,
}

/// Cumulative counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStats {
    /// Successful cycles since the last `initialize`.
    pub cycles_executed: u64,
    /// `cycles_executed * buffer_size`.
    pub total_samples: u64,
    /// Wall time of the last successful cycle.
    pub execution_time: Duration,
    /// Whether the engine is in [`EngineState::Running`].
    pub is_running: bool,
    /// Configured sample rate.
    pub sample_rate: f32,
    /// Configured buffer size.
    pub buffer_size: usize,
}

/// One sink's output for a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkOutput {
    /// The sink node's record.
    pub node: NodeDescriptor,
    /// What the sink produced.
    pub data: Signal,
}

/// Sink outputs of one cycle keyed by node id.
pub type SinkOutputs = BTreeMap<String, SinkOutput>;

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A block handler failed; the cycle was discarded and the engine stopped.
    #[error("node '{node_id}' ({block_type}) failed: {source}")]
    Process {
        /// Failing node.
        node_id: String,
        /// Its block type.
        block_type: String,
        /// The handler's error.
        #[source]
        source: ProcessError,
    },

    /// Sample rate or buffer size out of range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// A node's parameters fail its block's checks.
    #[error("node '{node_id}' ({block_type}) has invalid parameters: {}", .messages.join("; "))]
    InvalidParams {
        /// Offending node.
        node_id: String,
        /// Its block type.
        block_type: String,
        /// Messages reported by the block.
        messages: Vec<String>,
    },

    /// The node id is not part of the installed graph.
    #[error("node '{0}' is not part of the initialized graph")]
    UnknownNode(String),
}

/// Single-threaded, buffer-synchronous graph executor.
pub struct Engine {
    catalog: Arc<Catalog>,
    state: EngineState,
    config: EngineConfig,
    graph: Option<CompiledGraph>,
    /// Effective parameters per plan slot.
    params: Vec<Params>,
    /// This cycle's outputs per plan slot.
    outputs: Vec<Option<Signal>>,
    /// Persistent runtime state per plan slot.
    states: Vec<NodeState>,
    /// Attached sample sources per plan slot.
    sources: Vec<Option<Box<dyn SampleSource>>>,
    /// Slots already warned about for an unknown block type.
    warned: Vec<bool>,
    cycles_executed: u64,
    total_samples: u64,
    execution_time: Duration,
}

impl Engine {
    /// Creates an idle engine dispatching through `catalog`.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            state: EngineState::Idle,
            config: EngineConfig::default(),
            graph: None,
            params: Vec::new(),
            outputs: Vec::new(),
            states: Vec::new(),
            sources: Vec::new(),
            warned: Vec::new(),
            cycles_executed: 0,
            total_samples: 0,
            execution_time: Duration::ZERO,
        }
    }

    /// Installs a compiled graph and moves to [`EngineState::Ready`].
    ///
    /// Clears node outputs, runtime state and statistics. Sample sources
    /// attached to node ids that survive into the new graph stay attached.
    ///
    /// Every node is bound to this engine's catalog by block type, so a graph
    /// compiled against another catalog still dispatches to the right
    /// handlers.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive sample rate, a zero buffer size, or a node
    /// whose parameters its block rejects; the engine is left unchanged.
    pub fn initialize(
        &mut self,
        mut graph: CompiledGraph,
        config: EngineConfig,
    ) -> Result<(), EngineError> {
        if !(config.sample_rate.is_finite() && config.sample_rate > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                config.sample_rate
            )));
        }
        if config.buffer_size == 0 {
            return Err(EngineError::InvalidConfig(
                "buffer size must be at least 1".into(),
            ));
        }

        self.bind(&mut graph)?;

        let mut previous: HashMap<String, Box<dyn SampleSource>> = HashMap::new();
        if let Some(old) = self.graph.take() {
            for (node, source) in old.execution_order.iter().zip(self.sources.drain(..)) {
                if let Some(source) = source {
                    previous.insert(node.id.clone(), source);
                }
            }
        }

        let n = graph.len();
        self.params = graph
            .execution_order
            .iter()
            .map(|node| self.catalog.default_params(&node.block_type).overlay(&node.params))
            .collect();
        self.sources = graph
            .execution_order
            .iter()
            .map(|node| previous.remove(&node.id))
            .collect();
        self.outputs = vec![None; n];
        self.states = vec![NodeState::Empty; n];
        self.warned = vec![false; n];
        self.config = config;
        self.cycles_executed = 0;
        self.total_samples = 0;
        self.execution_time = Duration::ZERO;
        self.graph = Some(graph);
        self.state = EngineState::Ready;

        tracing::debug!(
            "engine_init: {n} nodes at {} Hz, {} samples per cycle",
            config.sample_rate,
            config.buffer_size
        );
        Ok(())
    }

    /// Resolves each step's block key in this engine's catalog and checks the
    /// node's parameters against it.
    fn bind(&self, graph: &mut CompiledGraph) -> Result<(), EngineError> {
        for (node, step) in graph.execution_order.iter().zip(graph.steps.iter_mut()) {
            let key = self.catalog.key_of(&node.block_type);
            if key != step.block {
                tracing::debug!(
                    "engine_bind: rebinding '{}' on node '{}' to this engine's catalog",
                    node.block_type,
                    node.id
                );
                step.block = key;
            }
            let Some(descriptor) = key.and_then(|k| self.catalog.descriptor(k)) else {
                continue;
            };
            let messages = descriptor.validate_params(&node.params);
            if !messages.is_empty() {
                return Err(EngineError::InvalidParams {
                    node_id: node.id.clone(),
                    block_type: node.block_type.clone(),
                    messages,
                });
            }
        }
        Ok(())
    }

    /// Moves to [`EngineState::Running`] with fresh runtime state.
    ///
    /// Returns false if no graph is installed.
    pub fn start(&mut self) -> bool {
        if self.state == EngineState::Idle {
            return false;
        }
        self.states.fill(NodeState::Empty);
        self.state = EngineState::Running;
        tracing::debug!("engine_start");
        true
    }

    /// Stops producing cycles. Always succeeds.
    ///
    /// An idle engine stays idle; otherwise the engine returns to
    /// [`EngineState::Ready`].
    pub fn stop(&mut self) -> bool {
        if self.state == EngineState::Running {
            self.state = EngineState::Ready;
            tracing::debug!("engine_stop: after {} cycles", self.cycles_executed);
        }
        true
    }

    /// Attaches a sample source to a node of the installed graph, replacing
    /// any previous one.
    ///
    /// # Errors
    ///
    /// Fails if the node is not in the installed graph.
    pub fn attach_source(
        &mut self,
        node_id: &str,
        source: Box<dyn SampleSource>,
    ) -> Result<(), EngineError> {
        let slot = self
            .graph
            .as_ref()
            .and_then(|g| g.slot_of(node_id))
            .ok_or_else(|| EngineError::UnknownNode(node_id.to_owned()))?;
        self.sources[slot] = Some(source);
        Ok(())
    }

    /// Runs one cycle.
    ///
    /// Returns `Ok(None)` unless the engine is running. On success returns the
    /// output of every sink node.
    ///
    /// # Errors
    ///
    /// A handler error discards the cycle's outputs, stops the engine and is
    /// returned as [`EngineError::Process`].
    pub fn execute_one_cycle(&mut self) -> Result<Option<SinkOutputs>, EngineError> {
        if self.state != EngineState::Running {
            return Ok(None);
        }

        let started = Instant::now();
        if let Err(e) = self.run_nodes() {
            self.outputs.fill(None);
            self.stop();
            tracing::warn!("engine_cycle: {e}");
            return Err(e);
        }

        self.execution_time = started.elapsed();
        self.cycles_executed += 1;
        self.total_samples += self.config.buffer_size as u64;

        Ok(Some(self.collect_sinks()))
    }

    fn run_nodes(&mut self) -> Result<(), EngineError> {
        let Some(graph) = self.graph.as_ref() else {
            return Ok(());
        };
        self.outputs.fill(None);

        for (slot, step) in graph.steps.iter().enumerate() {
            let node = &graph.execution_order[slot];
            let result = {
                let inputs: Vec<&Signal> = step
                    .inputs
                    .iter()
                    .filter_map(|&i| self.outputs[i].as_ref())
                    .collect();

                match step.block.and_then(|key| self.catalog.process_fn(key)) {
                    Some(process) => {
                        let mut ctx = ProcessContext {
                            node_id: &node.id,
                            inputs: &inputs,
                            params: &self.params[slot],
                            state: &mut self.states[slot],
                            source: self.sources[slot].as_deref(),
                            sample_rate: self.config.sample_rate,
                            buffer_size: self.config.buffer_size,
                        };
                        process(&mut ctx)
                    }
                    None => {
                        if !self.warned[slot] {
                            self.warned[slot] = true;
                            tracing::warn!(
                                "engine_dispatch: no handler for '{}' on node '{}', passing through",
                                node.block_type,
                                node.id
                            );
                        }
                        Ok(inputs
                            .first()
                            .map_or_else(|| Signal::silence(self.config.buffer_size), |s| (*s).clone()))
                    }
                }
            };

            match result {
                Ok(signal) => self.outputs[slot] = Some(signal),
                Err(source) => {
                    return Err(EngineError::Process {
                        node_id: node.id.clone(),
                        block_type: node.block_type.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    fn collect_sinks(&self) -> SinkOutputs {
        let Some(graph) = self.graph.as_ref() else {
            return SinkOutputs::new();
        };
        graph
            .sink_nodes
            .iter()
            .filter_map(|id| {
                let slot = graph.slot_of(id)?;
                let data = self.outputs[slot].clone()?;
                Some((
                    id.clone(),
                    SinkOutput {
                        node: graph.execution_order[slot].clone(),
                        data,
                    },
                ))
            })
            .collect()
    }

    /// This cycle's output of a node, if it has run.
    pub fn node_output(&self, node_id: &str) -> Option<&Signal> {
        let slot = self.graph.as_ref()?.slot_of(node_id)?;
        self.outputs[slot].as_ref()
    }

    /// Runtime state of a node.
    pub fn node_state(&self, node_id: &str) -> Option<&NodeState> {
        let slot = self.graph.as_ref()?.slot_of(node_id)?;
        self.states.get(slot)
    }

    /// Effective parameters of a node.
    pub fn node_params(&self, node_id: &str) -> Option<&Params> {
        let slot = self.graph.as_ref()?.slot_of(node_id)?;
        self.params.get(slot)
    }

    /// Current counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cycles_executed: self.cycles_executed,
            total_samples: self.total_samples,
            execution_time: self.execution_time,
            is_running: self.is_running(),
            sample_rate: self.config.sample_rate,
            buffer_size: self.config.buffer_size,
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns true while cycles are being produced.
    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// The installed graph.
    pub fn graph(&self) -> Option<&CompiledGraph> {
        self.graph.as_ref()
    }

    /// Active configuration.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// The catalog used for dispatch.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("nodes", &self.outputs.len())
            .field("cycles_executed", &self.cycles_executed)
            .finish_non_exhaustive()
    }
}
