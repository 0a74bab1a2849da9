// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::error::NodeError;
use crate::evaluation::ExecutionContext;
use crate::port::Port;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node within one graph.
///
/// IDs are handed out in increasing order and never reused, even after the
/// node they named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node kind category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Constant inputs
    Input,
    /// Primitive mesh generators
    Geometry,
    /// Mesh transforms
    Transform,
    /// Boolean (CSG) operations
    Boolean,
    /// Material and shading nodes
    Material,
    /// Terminal sinks
    Output,
    /// Inspection helpers
    Utility,
}

/// Behavior attached to a node: what it computes and what it owns.
pub trait NodeBehavior: Send + fmt::Debug {
    /// Produce the node's outputs from its resolved inputs.
    ///
    /// `inputs` is ordered like the node's input ports. The returned vector
    /// must be ordered like its output ports.
    fn execute(
        &self,
        inputs: &[Value],
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Vec<Value>, NodeError>;

    /// Free resources the node itself holds (not the values it produced).
    fn release(&mut self) {}
}

/// A node instance in the graph
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    /// Kind name (e.g. "Cube")
    pub kind: String,
    /// Position in the editor canvas; never read by evaluation
    pub position: [f32; 2],
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    behavior: Box<dyn NodeBehavior>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: impl Into<String>, behavior: Box<dyn NodeBehavior>) -> Self {
        Self {
            id,
            kind: kind.into(),
            position: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
            behavior,
        }
    }

    /// Unique instance ID, fixed for the node's lifetime
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Whether the node is a sink (inputs only)
    pub fn is_sink(&self) -> bool {
        self.outputs.is_empty() && !self.inputs.is_empty()
    }

    /// The attached behavior
    pub fn behavior(&self) -> &dyn NodeBehavior {
        self.behavior.as_ref()
    }

    pub(crate) fn release(&mut self) {
        self.behavior.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::passthrough_graph;

    #[test]
    fn test_id_matches_graph_key() {
        let (mut graph, ids) = passthrough_graph(2);
        let node = graph.node_mut(ids[1]).unwrap();
        node.position = [10.0, 20.0];
        assert_eq!(node.id(), ids[1]);

        for (node, id) in graph.nodes().zip(&ids) {
            assert_eq!(node.id(), *id);
        }
    }
}
