// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed edge from an output slot to an input slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source node ID
    pub from_node: NodeId,
    /// Source output index
    pub from_output: usize,
    /// Target node ID
    pub to_node: NodeId,
    /// Target input index
    pub to_input: usize,
}

impl Connection {
    /// Create a new connection
    pub fn new(from_node: NodeId, from_output: usize, to_node: NodeId, to_input: usize) -> Self {
        Self {
            from_node,
            from_output,
            to_node,
            to_input,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection feeds a specific input slot
    pub fn targets(&self, node_id: NodeId, input: usize) -> bool {
        self.to_node == node_id && self.to_input == input
    }
}
