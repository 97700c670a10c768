//! Graph compiler: validation, cycle detection, ordering and plan emission.
//!
//! [`compile`] runs five steps, each of which can end compilation:
//!
//! 1. Index nodes by id and edges by endpoint (linear in nodes plus edges).
//! 2. Validate every edge: both endpoints must exist and the source's output
//!    type must equal the target's input type. All edge errors are collected
//!    before returning.
//! 3. Depth-first cycle detection from every unvisited node, in input order.
//!    Every back edge is reported with the path it closes.
//! 4. Kahn's topological sort with a FIFO queue seeded in input order, so
//!    independent nodes keep their input order.
//! 5. Build dependency/consumer maps, source/sink sets and the slot-indexed
//!    plan the engine executes.
//!
//! Compilation is pure: inputs are only read, and the result is either a
//! complete [`CompiledGraph`] or a non-empty error list.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::signal::SignalType;

use super::node::{EdgeDescriptor, NodeDescriptor};
use super::plan::{CompileStats, CompiledGraph, PlanStep};

fn type_label(t: &Option<SignalType>) -> &'static str {
    t.map_or("nothing", SignalType::name)
}

/// A single compile failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Two nodes share an id.
    #[error("duplicate node id '{node_id}'")]
    DuplicateNode {
        /// The repeated id.
        node_id: String,
    },

    /// An edge endpoint does not name any node.
    #[error("edge '{edge_id}' ({from} -> {to}) references missing node '{missing}'")]
    InvalidConnection {
        /// Offending edge.
        edge_id: String,
        /// Edge source id as given.
        from: String,
        /// Edge target id as given.
        to: String,
        /// The endpoint that was not found.
        missing: String,
    },

    /// The source's output type differs from the target's input type.
    #[error(
        "edge '{edge_id}': {from} outputs {} but {to} accepts {}",
        type_label(.from_type),
        type_label(.to_type)
    )]
    TypeMismatch {
        /// Offending edge.
        edge_id: String,
        /// Source node id.
        from: String,
        /// Declared output of the source block.
        from_type: Option<SignalType>,
        /// Target node id.
        to: String,
        /// Declared input of the target block.
        to_type: Option<SignalType>,
    },

    /// A back edge closes a cycle.
    #[error("cycle detected: {}", .path.join(" -> "))]
    CycleDetected {
        /// Node ids from the re-entered node around to itself.
        path: Vec<String>,
    },

    /// The sort did not place every node.
    #[error("topological sort placed {sorted} of {total} nodes")]
    TopologicalSortFailed {
        /// Nodes placed.
        sorted: usize,
        /// Nodes in the graph.
        total: usize,
    },
}

impl CompileError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::DuplicateNode { .. } => "DUPLICATE_NODE",
            CompileError::InvalidConnection { .. } => "INVALID_CONNECTION",
            CompileError::TypeMismatch { .. } => "TYPE_MISMATCH",
            CompileError::CycleDetected { .. } => "CYCLE_DETECTED",
            CompileError::TopologicalSortFailed { .. } => "TOPOLOGICAL_SORT_FAILED",
        }
    }
}

/// Every error found by a failed compile. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileErrors(Vec<CompileError>);

impl CompileErrors {
    /// The individual errors, in discovery order.
    pub fn errors(&self) -> &[CompileError] {
        &self.0
    }

    /// Returns true if any error carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.0.iter().any(|e| e.code() == code)
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwraps the error list.
    pub fn into_vec(self) -> Vec<CompileError> {
        self.0
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph failed to compile with {} error(s)", self.0.len())?;
        for e in &self.0 {
            write!(f, "\n  [{}] {e}", e.code())?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

impl<'a> IntoIterator for &'a CompileErrors {
    type Item = &'a CompileError;
    type IntoIter = std::slice::Iter<'a, CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A compiled graph with its summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    /// The execution plan.
    pub graph: CompiledGraph,
    /// Node, edge, source and sink counts.
    pub stats: CompileStats,
}

/// Adjacency built in step 1. Edge lists hold edge indices.
struct Index<'a> {
    position: HashMap<&'a str, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    /// Resolved `(source, target)` positions per edge; `None` if an endpoint
    /// is missing.
    endpoints: Vec<Option<(usize, usize)>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Compiles a node/edge graph against `catalog`.
///
/// # Errors
///
/// Returns every error found by the first failing step; see the module docs
/// for the step order.
pub fn compile(
    catalog: &Catalog,
    nodes: &[NodeDescriptor],
    edges: &[EdgeDescriptor],
) -> Result<Compilation, CompileErrors> {
    tracing::debug!(
        "graph_compile: {} nodes, {} edges",
        nodes.len(),
        edges.len()
    );

    let (index, mut errors) = build_index(nodes, edges);
    errors.extend(validate_connections(catalog, nodes, edges, &index));
    if !errors.is_empty() {
        return Err(CompileErrors(errors));
    }

    let cycles = detect_cycles(nodes.len(), &index);
    if !cycles.is_empty() {
        return Err(CompileErrors(
            cycles
                .into_iter()
                .map(|path| CompileError::CycleDetected {
                    path: path.into_iter().map(|i| nodes[i].id.clone()).collect(),
                })
                .collect(),
        ));
    }

    let sorted = kahn_sort(nodes.len(), &index);
    if sorted.len() != nodes.len() {
        return Err(CompileErrors(vec![CompileError::TopologicalSortFailed {
            sorted: sorted.len(),
            total: nodes.len(),
        }]));
    }
    tracing::debug!(
        "graph_sort: [{}]",
        sorted
            .iter()
            .map(|&i| nodes[i].id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let graph = emit_plan(catalog, nodes, edges, &index, &sorted);
    let stats = CompileStats {
        node_count: nodes.len(),
        edge_count: edges.len(),
        source_count: graph.source_nodes.len(),
        sink_count: graph.sink_nodes.len(),
    };
    tracing::debug!(
        "graph_plan: {} sources, {} sinks",
        stats.source_count,
        stats.sink_count
    );
    Ok(Compilation { graph, stats })
}

fn build_index<'a>(
    nodes: &'a [NodeDescriptor],
    edges: &'a [EdgeDescriptor],
) -> (Index<'a>, Vec<CompileError>) {
    let mut errors = Vec::new();
    let mut position = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if position.insert(node.id.as_str(), i).is_some() {
            errors.push(CompileError::DuplicateNode {
                node_id: node.id.clone(),
            });
        }
    }

    let mut outgoing = vec![Vec::new(); nodes.len()];
    let mut incoming = vec![Vec::new(); nodes.len()];
    let endpoints = edges
        .iter()
        .enumerate()
        .map(|(e, edge)| {
            let from = *position.get(edge.source.as_str())?;
            let to = *position.get(edge.target.as_str())?;
            outgoing[from].push(e);
            incoming[to].push(e);
            Some((from, to))
        })
        .collect();

    (
        Index {
            position,
            outgoing,
            incoming,
            endpoints,
        },
        errors,
    )
}

fn validate_connections(
    catalog: &Catalog,
    nodes: &[NodeDescriptor],
    edges: &[EdgeDescriptor],
    index: &Index<'_>,
) -> Vec<CompileError> {
    let mut errors = Vec::new();
    for (edge, endpoints) in edges.iter().zip(&index.endpoints) {
        let Some((from, to)) = *endpoints else {
            let missing = if index.position.contains_key(edge.source.as_str()) {
                &edge.target
            } else {
                &edge.source
            };
            errors.push(CompileError::InvalidConnection {
                edge_id: edge.id.clone(),
                from: edge.source.clone(),
                to: edge.target.clone(),
                missing: missing.clone(),
            });
            continue;
        };

        let (Some(src), Some(dst)) = (
            catalog.get(&nodes[from].block_type),
            catalog.get(&nodes[to].block_type),
        ) else {
            // Unknown blocks degrade at run time; nothing to check here.
            continue;
        };

        let from_type = src.signals.output;
        let to_type = dst.signals.input;
        if from_type.is_none() || from_type != to_type {
            errors.push(CompileError::TypeMismatch {
                edge_id: edge.id.clone(),
                from: edge.source.clone(),
                from_type,
                to: edge.target.clone(),
                to_type,
            });
        }
    }
    errors
}

/// Returns every cycle closed by a back edge, as node positions from the
/// re-entered node around to itself.
fn detect_cycles(n: usize, index: &Index<'_>) -> Vec<Vec<usize>> {
    let successors: Vec<Vec<usize>> = index
        .outgoing
        .iter()
        .map(|out| {
            out.iter()
                .filter_map(|&e| index.endpoints[e].map(|(_, to)| to))
                .collect()
        })
        .collect();

    let mut mark = vec![Mark::Unvisited; n];
    let mut cycles = Vec::new();

    for root in 0..n {
        if mark[root] != Mark::Unvisited {
            continue;
        }
        mark[root] = Mark::OnStack;
        // (node, next successor to visit)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&next) = successors[node].get(frame.1) else {
                mark[node] = Mark::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match mark[next] {
                Mark::Unvisited => {
                    mark[next] = Mark::OnStack;
                    stack.push((next, 0));
                }
                Mark::OnStack => {
                    let start = stack.iter().position(|&(id, _)| id == next).unwrap_or(0);
                    let mut path: Vec<usize> = stack[start..].iter().map(|&(id, _)| id).collect();
                    path.push(next);
                    cycles.push(path);
                }
                Mark::Done => {}
            }
        }
    }
    cycles
}

fn kahn_sort(n: usize, index: &Index<'_>) -> Vec<usize> {
    let mut in_degree: Vec<usize> = index.incoming.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut sorted = Vec::with_capacity(n);

    while let Some(node) = queue.pop_front() {
        sorted.push(node);
        for &e in &index.outgoing[node] {
            if let Some((_, to)) = index.endpoints[e] {
                in_degree[to] -= 1;
                if in_degree[to] == 0 {
                    queue.push_back(to);
                }
            }
        }
    }
    sorted
}

fn emit_plan(
    catalog: &Catalog,
    nodes: &[NodeDescriptor],
    edges: &[EdgeDescriptor],
    index: &Index<'_>,
    sorted: &[usize],
) -> CompiledGraph {
    let mut slot_of = vec![0usize; nodes.len()];
    for (slot, &pos) in sorted.iter().enumerate() {
        slot_of[pos] = slot;
    }

    let mut dependencies = HashMap::with_capacity(nodes.len());
    let mut outputs = HashMap::with_capacity(nodes.len());
    let mut source_nodes = Vec::new();
    let mut sink_nodes = Vec::new();
    let mut steps = Vec::with_capacity(nodes.len());
    let mut slots = HashMap::with_capacity(nodes.len());

    for (slot, &pos) in sorted.iter().enumerate() {
        let node = &nodes[pos];
        let deps: Vec<String> = index.incoming[pos]
            .iter()
            .map(|&e| edges[e].source.clone())
            .collect();
        let outs: Vec<String> = index.outgoing[pos]
            .iter()
            .map(|&e| edges[e].target.clone())
            .collect();

        if deps.is_empty() {
            source_nodes.push(node.id.clone());
        }
        if outs.is_empty() {
            sink_nodes.push(node.id.clone());
        }

        let block = catalog.key_of(&node.block_type);
        if block.is_none() {
            tracing::warn!(
                "graph_plan: node '{}' has unknown block type '{}'",
                node.id,
                node.block_type
            );
        }
        let inputs = index.incoming[pos]
            .iter()
            .filter_map(|&e| index.endpoints[e].map(|(from, _)| slot_of[from]))
            .collect();

        steps.push(PlanStep { block, inputs });
        slots.insert(node.id.clone(), slot);
        dependencies.insert(node.id.clone(), deps);
        outputs.insert(node.id.clone(), outs);
    }

    CompiledGraph {
        execution_order: sorted.iter().map(|&pos| nodes[pos].clone()).collect(),
        dependencies,
        outputs,
        source_nodes,
        sink_nodes,
        steps,
        slots,
    }
}
