// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for graph mutation and execution.

use crate::backend::BackendError;
use crate::node::NodeId;
use crate::port::PortDirection;
use crate::value::ValueKind;

/// Error raised by a node behavior
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Wrong number of inputs
    #[error("Expected {expected} inputs, got {actual}")]
    InvalidInputCount {
        /// Number of inputs the node declares
        expected: usize,
        /// Number of inputs it received
        actual: usize,
    },

    /// Input carries the wrong value kind
    #[error("Input {index} expected {expected}, got {actual}")]
    InvalidInputType {
        /// Input slot index
        index: usize,
        /// Declared kind
        expected: ValueKind,
        /// Received kind
        actual: ValueKind,
    },

    /// Graphics backend failure
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Allocation failure while building an output
    #[error("Out of memory")]
    OutOfMemory,
}

impl From<std::collections::TryReserveError> for NodeError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

impl NodeError {
    /// Whether this is an allocation failure, in the node or in the backend
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory | Self::Backend(BackendError::OutOfMemory))
    }
}

/// Error raised by graph mutation or execution
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Connection endpoint does not exist
    #[error("Invalid node ID: {0}")]
    InvalidNodeId(NodeId),

    /// Port index out of range
    #[error("Invalid {direction:?} port index {index} on node {node}")]
    InvalidPortIndex {
        /// Node the port was looked up on
        node: NodeId,
        /// Input or output
        direction: PortDirection,
        /// Requested index
        index: usize,
    },

    /// Node does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Connection would close a cycle
    #[error("Connecting node {from} to node {to} would create a cycle")]
    WouldCreateCycle {
        /// Source node
        from: NodeId,
        /// Destination node
        to: NodeId,
    },

    /// No such connection
    #[error("No connection from {from_node}:{from_output} to {to_node}:{to_input}")]
    ConnectionNotFound {
        /// Source node
        from_node: NodeId,
        /// Source output index
        from_output: usize,
        /// Destination node
        to_node: NodeId,
        /// Destination input index
        to_input: usize,
    },

    /// Unconnected input with no default value
    #[error("Node {node} input {input} ({name}) has no connection and no default")]
    MissingRequiredInput {
        /// Node being executed
        node: NodeId,
        /// Input slot index
        input: usize,
        /// Input slot name
        name: String,
    },

    /// Behavior produced a different number of outputs than declared
    #[error("Node {node} declared {expected} outputs but produced {actual}")]
    OutputCountMismatch {
        /// Node being executed
        node: NodeId,
        /// Declared output count
        expected: usize,
        /// Produced output count
        actual: usize,
    },

    /// Kind name is not registered
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// Node behavior failed
    #[error("Node {node} failed: {source}")]
    Execution {
        /// Node whose behavior failed
        node: NodeId,
        /// Error returned by the behavior
        #[source]
        source: NodeError,
    },

    /// Allocation failure while growing graph storage
    #[error("Out of memory")]
    OutOfMemory,
}

impl GraphError {
    /// Whether this is an allocation failure, either in the graph or in a node
    pub fn is_out_of_memory(&self) -> bool {
        match self {
            Self::OutOfMemory => true,
            Self::Execution { source, .. } => source.is_out_of_memory(),
            _ => false,
        }
    }

    /// The node behavior error, if this wraps one
    pub fn node_error(&self) -> Option<&NodeError> {
        match self {
            Self::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_memory_is_distinguishable() {
        assert!(GraphError::OutOfMemory.is_out_of_memory());

        let wrapped = GraphError::Execution {
            node: NodeId(3),
            source: NodeError::OutOfMemory,
        };
        assert!(wrapped.is_out_of_memory());

        let backend = GraphError::Execution {
            node: NodeId(4),
            source: NodeError::Backend(BackendError::OutOfMemory),
        };
        assert!(backend.is_out_of_memory());

        let structural = GraphError::NodeNotFound(NodeId(3));
        assert!(!structural.is_out_of_memory());
        assert!(structural.node_error().is_none());
    }

    #[test]
    fn test_error_messages_name_node() {
        let err = GraphError::WouldCreateCycle {
            from: NodeId(2),
            to: NodeId(0),
        };
        assert_eq!(err.to_string(), "Connecting node 2 to node 0 would create a cycle");
    }
}
