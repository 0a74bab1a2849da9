// SPDX-License-Identifier: MIT OR Apache-2.0
//! Small behaviors shared by the unit tests.

use crate::error::NodeError;
use crate::evaluation::ExecutionContext;
use crate::graph::Graph;
use crate::node::{NodeBehavior, NodeId};
use crate::port::Port;
use crate::value::{Inputs, Value, ValueKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Echoes its single float input
#[derive(Debug)]
pub struct Passthrough;

impl NodeBehavior for Passthrough {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 1)?;
        Ok(vec![Value::Float(inputs.float(0)?)])
    }
}

/// Graph of `count` unconnected passthrough nodes
pub fn passthrough_graph(count: usize) -> (Graph, Vec<NodeId>) {
    let mut graph = Graph::new("test");
    let ids = (0..count)
        .map(|_| {
            let id = graph.add_node("Passthrough", Box::new(Passthrough)).unwrap();
            graph
                .set_ports(
                    id,
                    vec![Port::input("In", ValueKind::Float).with_default(Value::Float(0.0))],
                    vec![Port::output("Out", ValueKind::Float)],
                )
                .unwrap();
            id
        })
        .collect();
    (graph, ids)
}

/// Counts how often it was released
#[derive(Debug, Clone, Default)]
pub struct ReleaseCounter {
    pub released: Arc<AtomicUsize>,
}

impl NodeBehavior for ReleaseCounter {
    fn execute(&self, _inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(Vec::new())
    }

    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Adds two floats and counts its runs
#[derive(Debug, Clone, Default)]
pub struct Sum {
    pub runs: Arc<AtomicUsize>,
}

impl NodeBehavior for Sum {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let inputs = Inputs::exact(inputs, 2)?;
        Ok(vec![Value::Float(inputs.float(0)? + inputs.float(1)?)])
    }
}

/// Add a [`Sum`] node with defaults `a` and `b`
pub fn add_sum(graph: &mut Graph, sum: &Sum, a: f32, b: f32) -> NodeId {
    let id = graph.add_node("Sum", Box::new(sum.clone())).unwrap();
    graph
        .set_ports(
            id,
            vec![
                Port::input("A", ValueKind::Float).with_default(Value::Float(a)),
                Port::input("B", ValueKind::Float).with_default(Value::Float(b)),
            ],
            vec![Port::output("Sum", ValueKind::Float)],
        )
        .unwrap();
    id
}

/// Always fails
#[derive(Debug)]
pub struct Failing;

impl NodeBehavior for Failing {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        Err(NodeError::InvalidInputCount {
            expected: 99,
            actual: inputs.len(),
        })
    }
}

/// Write a `width` x `height` PNG filled with `rgba` into `dir`
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save(&path)
        .unwrap();
    path
}
