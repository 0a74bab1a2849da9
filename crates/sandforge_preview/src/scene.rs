// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in demo scene used when no graph document is configured.

use sandforge_nodegraph::{Graph, GraphError, LoadedGraph, NodeId, NodeRegistry, Value};

/// Set one input default on a freshly created node
fn set(graph: &mut Graph, node: NodeId, input: usize, value: Value) -> Result<(), GraphError> {
    graph.set_input_default(node, input, Some(value))
}

/// A small tower: a ground plane, a pillar, a tilted cap, merged into one mesh.
pub fn build_demo_scene(registry: &NodeRegistry) -> Result<LoadedGraph, GraphError> {
    let mut graph = Graph::new("Demo Tower");

    let ground = registry.instantiate(&mut graph, "Plane")?;
    set(&mut graph, ground, 0, Value::Float(8.0))?;
    set(&mut graph, ground, 1, Value::Float(8.0))?;
    set(&mut graph, ground, 2, Value::Int(4))?;
    set(&mut graph, ground, 3, Value::Int(4))?;

    let pillar = registry.instantiate(&mut graph, "Cylinder")?;
    set(&mut graph, pillar, 0, Value::Float(0.75))?;
    set(&mut graph, pillar, 1, Value::Float(4.0))?;

    let cap = registry.instantiate(&mut graph, "Cone")?;
    let tilt = registry.instantiate(&mut graph, "Rotate")?;
    set(&mut graph, tilt, 1, Value::Vector3([0.0, 0.0, 0.2]))?;
    let lift = registry.instantiate(&mut graph, "Translate")?;
    set(&mut graph, lift, 1, Value::Vector3([0.0, 4.0, 0.0]))?;

    let base = registry.instantiate(&mut graph, "Union")?;
    let tower = registry.instantiate(&mut graph, "Union")?;

    graph.add_connection(cap, 0, tilt, 0)?;
    graph.add_connection(tilt, 0, lift, 0)?;
    graph.add_connection(ground, 0, base, 0)?;
    graph.add_connection(pillar, 0, base, 1)?;
    graph.add_connection(base, 0, tower, 0)?;
    graph.add_connection(lift, 0, tower, 1)?;

    for (column, node) in [ground, pillar, cap, tilt, lift, base, tower].into_iter().enumerate() {
        graph.set_node_position(node, [column as f32 * 180.0, 0.0])?;
    }

    Ok(LoadedGraph {
        graph,
        output: Some(tower),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandforge_nodegraph::{create_default_registry, ExecutionContext, SoftwareBackend};

    #[test]
    fn test_demo_scene_executes() {
        let registry = create_default_registry();
        let loaded = build_demo_scene(&registry).unwrap();
        let output = loaded.output.unwrap();

        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        let values = loaded.graph.execute_node(output, &mut ctx).unwrap();
        let mesh = values[0].as_mesh().unwrap();
        assert!(mesh.triangle_count() > 0);

        let (_, max) = mesh.bounds().unwrap();
        assert!(max[1] > 4.0);
    }
}
