// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saving and loading graphs as RON documents.
//!
//! A document records each node's kind, canvas position and input defaults
//! plus the connection list. Behaviors are not serialized; loading rebuilds
//! them from a [`NodeRegistry`].

use crate::connection::Connection;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::node::NodeId;
use crate::registry::NodeRegistry;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Current graph document format version
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Errors while reading or writing graph documents
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// File access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Document could not be written
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer format
    #[error("Graph version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the document
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// Document describes an invalid graph
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    /// ID within the document
    pub id: NodeId,
    /// Registered kind name
    pub kind: String,
    /// Canvas position
    pub position: [f32; 2],
    /// Default of every input slot, in port order
    pub inputs: Vec<Option<Value>>,
}

/// Serialized graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version
    pub version: u32,
    /// Graph name
    pub name: String,
    /// Nodes in graph order
    pub nodes: Vec<NodeDocument>,
    /// Connections between document node IDs
    pub connections: Vec<Connection>,
    /// Node whose outputs the host should preview
    pub output: Option<NodeId>,
}

/// A graph rebuilt from a document
#[derive(Debug)]
pub struct LoadedGraph {
    /// The graph
    pub graph: Graph,
    /// Designated output node, with its new ID
    pub output: Option<NodeId>,
}

impl Graph {
    /// Capture this graph as a document
    pub fn to_document(&self, output: Option<NodeId>) -> GraphDocument {
        GraphDocument {
            version: GRAPH_FORMAT_VERSION,
            name: self.name.clone(),
            nodes: self
                .nodes()
                .map(|node| NodeDocument {
                    id: node.id(),
                    kind: node.kind.clone(),
                    position: node.position,
                    inputs: node.inputs.iter().map(|p| p.default_value.clone()).collect(),
                })
                .collect(),
            connections: self.connections().to_vec(),
            output,
        }
    }
}

impl GraphDocument {
    /// Rebuild the graph, creating behaviors from `registry`.
    ///
    /// Nodes get fresh IDs; connections and the output node are remapped.
    pub fn instantiate(&self, registry: &NodeRegistry) -> Result<LoadedGraph, DocumentError> {
        self.check_version()?;

        let mut graph = Graph::new(self.name.clone());
        let mut ids = HashMap::with_capacity(self.nodes.len());

        for doc in &self.nodes {
            let id = registry.instantiate(&mut graph, &doc.kind)?;
            graph.set_node_position(id, doc.position)?;

            let declared = graph.node(id).map_or(0, |n| n.inputs.len());
            if doc.inputs.len() != declared {
                warn!(
                    kind = %doc.kind,
                    stored = doc.inputs.len(),
                    declared,
                    "input count changed since the graph was saved"
                );
            }
            for (index, value) in doc.inputs.iter().take(declared).enumerate() {
                graph.set_input_default(id, index, value.clone())?;
            }
            ids.insert(doc.id, id);
        }

        let remap = |id: NodeId| ids.get(&id).copied().ok_or(GraphError::InvalidNodeId(id));
        for c in &self.connections {
            graph.add_connection(remap(c.from_node)?, c.from_output, remap(c.to_node)?, c.to_input)?;
        }
        let output = self.output.map(remap).transpose()?;

        Ok(LoadedGraph { graph, output })
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String, DocumentError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Parse from a RON string
    pub fn from_ron(source: &str) -> Result<Self, DocumentError> {
        let document: Self = ron::from_str(source)?;
        document.check_version()?;
        Ok(document)
    }

    /// Load a document from a file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save the document to a file
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    fn check_version(&self) -> Result<(), DocumentError> {
        if self.version > GRAPH_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: self.version,
                supported: GRAPH_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}
