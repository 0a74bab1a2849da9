// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of node kinds, keyed by kind name.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::graphs;
use crate::node::{NodeBehavior, NodeCategory, NodeId};
use crate::port::Port;
use indexmap::IndexMap;

/// Creates a fresh behavior for a node kind
pub type NodeFactory = fn() -> Box<dyn NodeBehavior>;

/// Factory for behaviors that need no configuration
pub fn boxed<B: NodeBehavior + Default + 'static>() -> Box<dyn NodeBehavior> {
    Box::new(B::default())
}

/// Node kind definition
#[derive(Debug, Clone)]
pub struct NodeKind {
    /// Kind name, unique in a registry
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Declared input ports
    pub inputs: Vec<Port>,
    /// Declared output ports
    pub outputs: Vec<Port>,
    /// Behavior factory
    pub factory: NodeFactory,
}

/// Registry of available node kinds
#[derive(Debug, Default)]
pub struct NodeRegistry {
    kinds: IndexMap<String, NodeKind>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node kind, replacing any kind with the same name
    pub fn register(&mut self, kind: NodeKind) {
        self.kinds.insert(kind.name.clone(), kind);
    }

    /// Get a node kind by name
    pub fn get(&self, name: &str) -> Option<&NodeKind> {
        self.kinds.get(name)
    }

    /// Whether a kind is registered
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values()
    }

    /// Get kinds by category
    pub fn kinds_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values().filter(move |k| k.category == category)
    }

    /// Add a node of the named kind to `graph` with its declared ports
    pub fn instantiate(&self, graph: &mut Graph, name: &str) -> Result<NodeId> {
        let kind = self
            .get(name)
            .ok_or_else(|| GraphError::UnknownNodeKind(name.to_string()))?;

        let id = graph.add_node(kind.name.clone(), (kind.factory)())?;
        graph.set_ports(id, kind.inputs.clone(), kind.outputs.clone())?;
        Ok(id)
    }
}

/// Registry with every built-in kind: constants, geometry and material nodes
pub fn create_default_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    graphs::common::register_common_nodes(&mut registry);
    graphs::geometry::register_geometry_nodes(&mut registry);
    graphs::material::register_material_nodes(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_contents() {
        let registry = create_default_registry();
        for name in [
            "Float", "Int", "Vector3", "Cube", "Sphere", "Cylinder", "Cone", "Plane", "Translate",
            "Scale", "Rotate", "Union", "Difference", "Intersection", "MeshInfo", "Color",
            "Texture", "SampleTexture", "Mix", "PbrOutput",
        ] {
            assert!(registry.contains(name), "missing kind {name}");
        }
        assert_eq!(registry.kinds_in_category(NodeCategory::Boolean).count(), 3);
    }

    #[test]
    fn test_instantiate_declares_ports() {
        let registry = create_default_registry();
        let mut graph = Graph::new("test");

        let id = registry.instantiate(&mut graph, "Translate").unwrap();
        let node = graph.node(id).unwrap();
        assert_eq!(node.kind, "Translate");
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.outputs.len(), 1);
    }

    #[test]
    fn test_instantiate_unknown_kind() {
        let registry = create_default_registry();
        let mut graph = Graph::new("test");
        assert!(matches!(
            registry.instantiate(&mut graph, "Teapot"),
            Err(GraphError::UnknownNodeKind(name)) if name == "Teapot"
        ));
        assert_eq!(graph.node_count(), 0);
    }
}
