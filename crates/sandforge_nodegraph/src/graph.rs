// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::Connection;
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeBehavior, NodeId};
use crate::port::{Port, PortDirection};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// A node graph.
///
/// Each graph hands out its own node IDs; two graphs never share state.
#[derive(Debug)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Connections in insertion order
    connections: Vec<Connection>,
    /// Next ID to hand out
    next_id: u64,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a node with no ports.
    ///
    /// Ports are declared afterwards with [`Graph::set_ports`]; see
    /// [`crate::registry::NodeRegistry::instantiate`] for the combined step.
    pub fn add_node(
        &mut self,
        kind: impl Into<String>,
        behavior: Box<dyn NodeBehavior>,
    ) -> Result<NodeId> {
        self.nodes
            .try_reserve(1)
            .map_err(|_| GraphError::OutOfMemory)?;

        let id = NodeId(self.next_id);
        self.next_id += 1;

        let node = Node::new(id, kind, behavior);
        debug!(node = %id, kind = %node.kind, "added node");
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Declare a node's ports.
    ///
    /// Connections that point past the new port lists are dropped.
    pub fn set_ports(&mut self, node_id: NodeId, inputs: Vec<Port>, outputs: Vec<Port>) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let input_count = inputs.len();
        let output_count = outputs.len();
        node.inputs = inputs;
        node.outputs = outputs;

        self.connections.retain(|c| {
            !(c.to_node == node_id && c.to_input >= input_count
                || c.from_node == node_id && c.from_output >= output_count)
        });
        Ok(())
    }

    /// Position of a node in the node collection
    pub fn find_node_index(&self, node_id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&node_id)
    }

    /// Remove a node and every connection touching it.
    ///
    /// The node's behavior is released before the node is handed back, so
    /// the returned node only describes what was removed.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node> {
        let mut node = self
            .nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;

        let before = self.connections.len();
        self.connections.retain(|c| !c.involves_node(node_id));
        debug!(
            node = %node_id,
            severed = before - self.connections.len(),
            "removed node"
        );

        node.release();
        Ok(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move a node on the editor canvas
    pub fn set_node_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.position = position;
        Ok(())
    }

    /// Replace the default literal of an input slot
    pub fn set_input_default(
        &mut self,
        node_id: NodeId,
        input: usize,
        value: Option<Value>,
    ) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let port = node
            .inputs
            .get_mut(input)
            .ok_or(GraphError::InvalidPortIndex {
                node: node_id,
                direction: PortDirection::Input,
                index: input,
            })?;
        port.default_value = value;
        Ok(())
    }

    /// Connect an output slot to an input slot.
    ///
    /// An input slot has at most one source: if it is already fed, the old
    /// connection is replaced in place and returned. The graph is left
    /// untouched when any check fails.
    pub fn add_connection(
        &mut self,
        from_node: NodeId,
        from_output: usize,
        to_node: NodeId,
        to_input: usize,
    ) -> Result<Option<Connection>> {
        let source = self
            .nodes
            .get(&from_node)
            .ok_or(GraphError::InvalidNodeId(from_node))?;
        let target = self
            .nodes
            .get(&to_node)
            .ok_or(GraphError::InvalidNodeId(to_node))?;

        if from_output >= source.outputs.len() {
            return Err(GraphError::InvalidPortIndex {
                node: from_node,
                direction: PortDirection::Output,
                index: from_output,
            });
        }
        if to_input >= target.inputs.len() {
            return Err(GraphError::InvalidPortIndex {
                node: to_node,
                direction: PortDirection::Input,
                index: to_input,
            });
        }

        if self.is_reachable(to_node, from_node) {
            return Err(GraphError::WouldCreateCycle {
                from: from_node,
                to: to_node,
            });
        }

        let connection = Connection::new(from_node, from_output, to_node, to_input);
        if let Some(slot) = self
            .connections
            .iter_mut()
            .find(|c| c.targets(to_node, to_input))
        {
            let replaced = std::mem::replace(slot, connection);
            debug!(
                node = %to_node,
                input = to_input,
                old_source = %replaced.from_node,
                new_source = %from_node,
                "replaced connection"
            );
            return Ok(Some(replaced));
        }

        self.connections
            .try_reserve(1)
            .map_err(|_| GraphError::OutOfMemory)?;
        self.connections.push(connection);
        Ok(None)
    }

    /// Remove a specific connection
    pub fn remove_connection(
        &mut self,
        from_node: NodeId,
        from_output: usize,
        to_node: NodeId,
        to_input: usize,
    ) -> Result<Connection> {
        let wanted = Connection::new(from_node, from_output, to_node, to_input);
        let index = self
            .connections
            .iter()
            .position(|c| *c == wanted)
            .ok_or(GraphError::ConnectionNotFound {
                from_node,
                from_output,
                to_node,
                to_input,
            })?;
        Ok(self.connections.remove(index))
    }

    /// Remove whatever feeds an input slot
    pub fn disconnect_input(&mut self, node_id: NodeId, input: usize) -> Option<Connection> {
        let index = self
            .connections
            .iter()
            .position(|c| c.targets(node_id, input))?;
        Some(self.connections.remove(index))
    }

    /// Get all connections in insertion order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Get the connection feeding an input slot
    pub fn incoming(&self, node_id: NodeId, input: usize) -> Option<&Connection> {
        self.connections.iter().find(|c| c.targets(node_id, input))
    }

    /// Get connections leaving a node
    pub fn outgoing(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.from_node == node_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether `target` can be reached from `start` by following connections
    /// downstream. A node always reaches itself.
    pub fn is_reachable(&self, start: NodeId, target: NodeId) -> bool {
        if start == target {
            return true;
        }

        let mut downstream: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for c in &self.connections {
            downstream.entry(c.from_node).or_default().push(c.to_node);
        }

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node_id) = queue.pop_front() {
            for &next in downstream.get(&node_id).into_iter().flatten() {
                if next == target {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Get every node with its upstream dependencies listed before it.
    ///
    /// Nodes are otherwise kept in insertion order, including nodes that no
    /// sink depends on.
    pub fn topological_order(&self) -> Vec<NodeId> {
        let mut upstream: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for c in &self.connections {
            upstream.entry(c.to_node).or_default().push(c.from_node);
        }

        let mut visited = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());
        for node_id in self.nodes.keys() {
            Self::visit(*node_id, &upstream, &mut visited, &mut order);
        }

        order
    }

    fn visit(
        node_id: NodeId,
        upstream: &HashMap<NodeId, Vec<NodeId>>,
        visited: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) {
        if !visited.insert(node_id) {
            return;
        }

        // Dependencies first
        for &source in upstream.get(&node_id).into_iter().flatten() {
            Self::visit(source, upstream, visited, order);
        }

        order.push(node_id);
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        for node in self.nodes.values_mut() {
            node.release();
        }
    }
}
