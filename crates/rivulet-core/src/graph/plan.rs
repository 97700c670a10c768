//! The compiled execution plan.

use std::collections::HashMap;

use crate::catalog::BlockKey;

use super::node::NodeDescriptor;

/// One entry of the index-based plan, parallel to
/// [`CompiledGraph::execution_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanStep {
    /// Resolved block, or `None` for a block type the catalog does not know.
    pub block: Option<BlockKey>,
    /// Plan slots of this node's dependencies, in edge order.
    pub inputs: Vec<usize>,
}

/// Output of a successful compile.
///
/// The public maps are keyed by node id for hosts; the engine only touches
/// the slot-indexed plan, so no string comparison happens per cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    /// Nodes in a topological order: every edge's source precedes its target.
    pub execution_order: Vec<NodeDescriptor>,
    /// Node id to the ids of the nodes feeding it, in edge order.
    pub dependencies: HashMap<String, Vec<String>>,
    /// Node id to the ids of the nodes it feeds, in edge order.
    pub outputs: HashMap<String, Vec<String>>,
    /// Ids of nodes without dependencies, in execution order.
    pub source_nodes: Vec<String>,
    /// Ids of nodes without consumers, in execution order.
    pub sink_nodes: Vec<String>,
    pub(crate) steps: Vec<PlanStep>,
    pub(crate) slots: HashMap<String, usize>,
}

impl CompiledGraph {
    /// Number of planned nodes.
    pub fn len(&self) -> usize {
        self.execution_order.len()
    }

    /// Returns true for an empty graph.
    pub fn is_empty(&self) -> bool {
        self.execution_order.is_empty()
    }

    /// Position of a node in the execution order.
    pub fn slot_of(&self, node_id: &str) -> Option<usize> {
        self.slots.get(node_id).copied()
    }

    /// Execution-order ids, handy for logs and assertions.
    pub fn order_ids(&self) -> Vec<&str> {
        self.execution_order.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Summary counts reported with a compiled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileStats {
    /// Nodes in the graph.
    pub node_count: usize,
    /// Edges in the graph.
    pub edge_count: usize,
    /// Nodes without dependencies.
    pub source_count: usize,
    /// Nodes without consumers.
    pub sink_count: usize,
}
