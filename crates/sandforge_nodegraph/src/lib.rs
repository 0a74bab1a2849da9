// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph execution engine for Sandforge.
//!
//! This crate provides the graph framework shared by:
//! - Geometry graphs (procedural meshes)
//! - Material graphs (procedural shading)
//!
//! ## Architecture
//!
//! The framework is built on a generic graph model with:
//! - Typed input/output ports with default values
//! - Cycle-safe connection insertion
//! - Pull-based single-node execution and whole-graph execution
//! - A registry of node kinds keyed by name
//! - RON serialization of graph documents
//!
//! Node behaviors reach the renderer only through [`GraphicsBackend`].
//!
//! ```
//! use sandforge_nodegraph::{create_default_registry, ExecutionContext, Graph, SoftwareBackend};
//!
//! let registry = create_default_registry();
//! let mut graph = Graph::new("example");
//! let cube = registry.instantiate(&mut graph, "Cube").unwrap();
//! let lift = registry.instantiate(&mut graph, "Translate").unwrap();
//! graph.add_connection(cube, 0, lift, 0).unwrap();
//!
//! let mut backend = SoftwareBackend::new();
//! let mut ctx = ExecutionContext::new(&mut backend);
//! let outputs = graph.execute_node(lift, &mut ctx).unwrap();
//! assert_eq!(outputs[0].as_mesh().unwrap().vertex_count(), 24);
//! ```

pub mod backend;
pub mod connection;
pub mod csg;
pub mod document;
pub mod error;
pub mod evaluation;
pub mod graph;
pub mod graphs;
pub mod mesh;
pub mod node;
pub mod port;
pub mod primitives;
pub mod registry;
pub mod value;

#[cfg(test)]
mod test_util;

pub use backend::{BackendError, GraphicsBackend, SoftwareBackend};
pub use connection::Connection;
pub use document::{DocumentError, GraphDocument, LoadedGraph};
pub use error::{GraphError, NodeError};
pub use evaluation::{Evaluation, ExecutionContext};
pub use graph::Graph;
pub use graphs::material::PbrMaterial;
pub use mesh::{GpuMeshId, Mesh, Texture};
pub use node::{Node, NodeBehavior, NodeCategory, NodeId};
pub use port::{Port, PortDirection};
pub use registry::{create_default_registry, NodeKind, NodeRegistry};
pub use value::{Color, Inputs, Value, ValueKind};
