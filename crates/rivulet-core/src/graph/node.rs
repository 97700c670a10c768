//! Host-supplied node and edge records.

use serde::{Deserialize, Serialize};

use crate::params::Params;

/// One block instance in the host's graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    /// Unique node id.
    pub id: String,
    /// Catalog id of the block this node instantiates.
    pub block_type: String,
    /// Parameter overrides on top of the block defaults.
    #[serde(default)]
    pub params: Params,
}

impl NodeDescriptor {
    /// A node with no parameter overrides.
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            params: Params::new(),
        }
    }

    /// Builder-style parameter override.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// A directed connection from one node's output to another node's input.
///
/// At most one edge may end on a given target handle; the host enforces
/// that when the edge is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDescriptor {
    /// Unique edge id.
    pub id: String,
    /// Id of the producing node.
    pub source: String,
    /// Id of the consuming node.
    pub target: String,
    /// Output handle on the source node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input handle on the target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl EdgeDescriptor {
    /// An edge without handles.
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_uses_camel_case_keys() {
        let json = r#"{"id":"n1","blockType":"sine","params":{"frequency":1000}}"#;
        let node: NodeDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(node.block_type, "sine");
        assert_eq!(node.params.number("frequency"), Some(1000.0));

        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["blockType"], "sine");
    }

    #[test]
    fn params_and_handles_are_optional() {
        let node: NodeDescriptor = serde_json::from_str(r#"{"id":"a","blockType":"x"}"#).unwrap();
        assert!(node.params.is_empty());

        let edge: EdgeDescriptor =
            serde_json::from_str(r#"{"id":"e","source":"a","target":"b","targetHandle":"in"}"#)
                .unwrap();
        assert_eq!(edge.source_handle, None);
        assert_eq!(edge.target_handle.as_deref(), Some("in"));
    }
}
