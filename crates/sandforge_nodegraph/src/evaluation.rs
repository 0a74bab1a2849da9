// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation and execution.
//!
//! [`Graph::execute_node`] pulls one node's inputs by recursively executing
//! whatever feeds them, with no caching between sibling branches.
//! [`Graph::execute`] runs every node once in dependency order and hands
//! back all outputs as an [`Evaluation`].
//!
//! Produced values belong to the caller. The graph keeps no reference to
//! them after returning. Values pulled from upstream while executing a node
//! are released through the backend once that node has run, whether it
//! succeeded or not; a behavior that forwards a texture must load its own
//! handle rather than return the one it was given.

use crate::backend::GraphicsBackend;
use crate::connection::Connection;
use crate::error::{GraphError, NodeError, Result};
use crate::graph::Graph;
use crate::graphs::material::PbrMaterial;
use crate::node::{Node, NodeId};
use crate::port::PortDirection;
use crate::value::Value;
use indexmap::IndexMap;
use tracing::trace;

/// Allocation context handed to node behaviors
pub struct ExecutionContext<'a> {
    backend: &'a mut (dyn GraphicsBackend + 'a),
    material: Option<PbrMaterial>,
}

impl<'a> ExecutionContext<'a> {
    /// Create a context over a graphics backend
    pub fn new(backend: &'a mut (dyn GraphicsBackend + 'a)) -> Self {
        Self {
            backend,
            material: None,
        }
    }

    /// The graphics backend
    pub fn backend(&mut self) -> &mut (dyn GraphicsBackend + 'a) {
        self.backend
    }

    /// Record the material produced by a sink node
    pub fn set_material(&mut self, material: PbrMaterial) {
        self.material = Some(material);
    }

    /// The last material recorded by a sink node
    pub fn material(&self) -> Option<&PbrMaterial> {
        self.material.as_ref()
    }

    /// Take the recorded material
    pub fn take_material(&mut self) -> Option<PbrMaterial> {
        self.material.take()
    }

    /// Hand a value's backend resources back to the backend
    pub fn release(&mut self, value: Value) {
        match value {
            Value::Mesh(mesh) => self.backend.unload_mesh(mesh),
            Value::Texture(texture) => self.backend.unload_texture(texture),
            _ => {}
        }
    }

    /// Release every value in `values`
    pub fn release_all(&mut self, values: impl IntoIterator<Item = Value>) {
        for value in values {
            self.release(value);
        }
    }
}

/// Outputs of a whole-graph run, in execution order
#[derive(Debug, Default)]
pub struct Evaluation {
    outputs: IndexMap<NodeId, Vec<Value>>,
}

impl Evaluation {
    /// Outputs of a node
    pub fn get(&self, node_id: NodeId) -> Option<&[Value]> {
        self.outputs.get(&node_id).map(Vec::as_slice)
    }

    /// One output value of a node
    pub fn output(&self, node_id: NodeId, index: usize) -> Option<&Value> {
        self.outputs.get(&node_id)?.get(index)
    }

    /// Take ownership of a node's outputs
    pub fn take(&mut self, node_id: NodeId) -> Option<Vec<Value>> {
        self.outputs.shift_remove(&node_id)
    }

    /// Nodes in the order they ran
    pub fn order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.outputs.keys().copied()
    }

    /// Number of nodes that ran
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether nothing ran
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Release every output still held
    pub fn release(self, ctx: &mut ExecutionContext<'_>) {
        for (_, values) in self.outputs {
            ctx.release_all(values);
        }
    }
}

/// Inputs resolved for one node run
#[derive(Default)]
struct ResolvedInputs {
    values: Vec<Value>,
    /// Slots filled from a connection rather than a default
    pulled: Vec<bool>,
}

impl ResolvedInputs {
    fn release_pulled(self, ctx: &mut ExecutionContext<'_>) {
        for (value, pulled) in self.values.into_iter().zip(self.pulled) {
            if pulled {
                ctx.release(value);
            }
        }
    }
}

impl Graph {
    /// Execute one node, recursively executing everything upstream of it.
    ///
    /// Each input is taken from its connection if it has one, otherwise from
    /// the slot's default. Errors from node behaviors are returned as
    /// [`GraphError::Execution`] with the failing node's ID.
    pub fn execute_node(&self, node_id: NodeId, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>> {
        let node = self.node(node_id).ok_or(GraphError::NodeNotFound(node_id))?;

        let mut inputs = ResolvedInputs::default();
        let result = self
            .resolve_inputs(node, ctx, &mut inputs, |connection, ctx| {
                self.pull(connection, ctx)
            })
            .and_then(|()| self.invoke(node, &inputs.values, ctx));
        inputs.release_pulled(ctx);
        result
    }

    /// Execute every node once, dependencies first.
    ///
    /// Nodes nothing depends on still run. The first failing node aborts the
    /// run, everything produced so far is released, and its error is
    /// returned.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<Evaluation> {
        let mut evaluation = Evaluation::default();

        for node_id in self.topological_order() {
            let Some(node) = self.node(node_id) else {
                evaluation.release(ctx);
                return Err(GraphError::NodeNotFound(node_id));
            };

            // Upstream values are copies of entries the evaluation still owns
            let mut inputs = ResolvedInputs::default();
            let result = self
                .resolve_inputs(node, ctx, &mut inputs, |connection, _| {
                    evaluation
                        .output(connection.from_node, connection.from_output)
                        .ok_or(GraphError::InvalidPortIndex {
                            node: connection.from_node,
                            direction: PortDirection::Output,
                            index: connection.from_output,
                        })?
                        .try_clone()
                        .map_err(|_| GraphError::OutOfMemory)
                })
                .and_then(|()| self.invoke(node, &inputs.values, ctx));

            match result {
                Ok(outputs) => {
                    evaluation.outputs.insert(node_id, outputs);
                }
                Err(e) => {
                    evaluation.release(ctx);
                    return Err(e);
                }
            }
        }

        Ok(evaluation)
    }

    /// Execute the source of `connection` and keep only the output it feeds
    fn pull(&self, connection: &Connection, ctx: &mut ExecutionContext<'_>) -> Result<Value> {
        let mut outputs = self.execute_node(connection.from_node, ctx)?;
        if connection.from_output >= outputs.len() {
            ctx.release_all(outputs);
            return Err(GraphError::InvalidPortIndex {
                node: connection.from_node,
                direction: PortDirection::Output,
                index: connection.from_output,
            });
        }

        let value = outputs.swap_remove(connection.from_output);
        ctx.release_all(outputs);
        Ok(value)
    }

    fn resolve_inputs(
        &self,
        node: &Node,
        ctx: &mut ExecutionContext<'_>,
        resolved: &mut ResolvedInputs,
        mut upstream: impl FnMut(&Connection, &mut ExecutionContext<'_>) -> Result<Value>,
    ) -> Result<()> {
        let count = node.inputs.len();
        resolved
            .values
            .try_reserve_exact(count)
            .and_then(|()| resolved.pulled.try_reserve_exact(count))
            .map_err(|_| GraphError::OutOfMemory)?;

        for (index, port) in node.inputs.iter().enumerate() {
            let (value, pulled) = match self.incoming(node.id(), index) {
                Some(connection) => (upstream(connection, ctx)?, true),
                None => {
                    let value = port.default_value.clone().ok_or_else(|| {
                        GraphError::MissingRequiredInput {
                            node: node.id(),
                            input: index,
                            name: port.name.clone(),
                        }
                    })?;
                    (value, false)
                }
            };

            let actual = value.kind();
            resolved.values.push(value);
            resolved.pulled.push(pulled);

            if actual != port.kind {
                return Err(GraphError::Execution {
                    node: node.id(),
                    source: NodeError::InvalidInputType {
                        index,
                        expected: port.kind,
                        actual,
                    },
                });
            }
        }

        Ok(())
    }

    fn invoke(&self, node: &Node, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>> {
        trace!(node = %node.id(), kind = %node.kind, "executing node");

        let outputs = node
            .behavior()
            .execute(inputs, ctx)
            .map_err(|source| GraphError::Execution {
                node: node.id(),
                source,
            })?;

        if outputs.len() != node.outputs.len() {
            let error = GraphError::OutputCountMismatch {
                node: node.id(),
                expected: node.outputs.len(),
                actual: outputs.len(),
            };
            ctx.release_all(outputs);
            return Err(error);
        }
        Ok(outputs)
    }
}
