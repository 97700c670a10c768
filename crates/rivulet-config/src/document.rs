//! Graph documents: the node/edge records a host saves and reloads.

use serde::{Deserialize, Serialize};
use std::path::Path;

use rivulet_core::{EdgeDescriptor, NodeDescriptor};

use crate::error::{ConfigError, write_with_parents};

/// Editor viewport saved alongside a graph.
///
/// The engine never reads it; it only has to survive a round trip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    /// Horizontal pan.
    pub x: f64,
    /// Vertical pan.
    pub y: f64,
    /// Zoom factor.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// A saved graph.
///
/// # JSON Format
///
/// ```json
/// {
///   "nodes": [
///     { "id": "osc", "blockType": "sine", "params": { "frequency": 1000 } },
///     { "id": "scope", "blockType": "oscilloscope" }
///   ],
///   "edges": [ { "id": "e1", "source": "osc", "target": "scope" } ],
///   "viewport": { "x": 0, "y": 0, "zoom": 1 }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    /// Node records.
    #[serde(default)]
    pub nodes: Vec<NodeDescriptor>,
    /// Edge records.
    #[serde(default)]
    pub edges: Vec<EdgeDescriptor>,
    /// Editor viewport.
    #[serde(default)]
    pub viewport: Viewport,
}

impl GraphDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    pub fn with_node(mut self, node: NodeDescriptor) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge.
    pub fn with_edge(mut self, edge: EdgeDescriptor) -> Self {
        self.edges.push(edge);
        self
    }

    /// Load a document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let document = Self::from_json(&content)?;
        tracing::debug!(
            "graph_load: {} nodes, {} edges from {}",
            document.nodes.len(),
            document.edges.len(),
            path.display()
        );
        Ok(document)
    }

    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the document as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &self.to_json()?)
    }

    /// Convert the document to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes of the given block type.
    pub fn nodes_of_type<'a>(&'a self, block_type: &'a str) -> impl Iterator<Item = &'a NodeDescriptor> {
        self.nodes.iter().filter(move |n| n.block_type == block_type)
    }
}
