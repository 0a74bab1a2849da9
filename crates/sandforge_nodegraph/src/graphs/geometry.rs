// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry node graph for procedural mesh authoring.
//!
//! Primitive generators delegate to the graphics backend. Transforms map
//! every vertex of an upstream mesh. The boolean nodes wrap the placeholder
//! operations in [`crate::csg`].

use crate::backend::BackendError;
use crate::csg;
use crate::error::NodeError;
use crate::evaluation::ExecutionContext;
use crate::mesh::Mesh;
use crate::node::{NodeBehavior, NodeCategory};
use crate::port::Port;
use crate::registry::{boxed, NodeKind, NodeRegistry};
use crate::value::{Inputs, Value, ValueKind};
use glam::Vec3;

fn resolution(name: &'static str, value: i32) -> Result<u32, NodeError> {
    u32::try_from(value).map_err(|_| {
        NodeError::Backend(BackendError::InvalidParameter {
            name,
            reason: format!("expected a non-negative count, got {value}"),
        })
    })
}

// ============================================================================
// Primitives
// ============================================================================

/// Box generator
#[derive(Debug, Default)]
pub struct Cube;

impl NodeBehavior for Cube {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 3)?;
        let mesh = ctx
            .backend()
            .gen_mesh_cube(inputs.float(0)?, inputs.float(1)?, inputs.float(2)?)?;
        Ok(vec![Value::Mesh(mesh)])
    }
}

/// UV sphere generator
#[derive(Debug, Default)]
pub struct Sphere;

impl NodeBehavior for Sphere {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 3)?;
        let radius = inputs.float(0)?;
        let rings = resolution("rings", inputs.int(1)?)?;
        let slices = resolution("slices", inputs.int(2)?)?;
        let mesh = ctx.backend().gen_mesh_sphere(radius, rings, slices)?;
        Ok(vec![Value::Mesh(mesh)])
    }
}

/// Cylinder generator
#[derive(Debug, Default)]
pub struct Cylinder;

impl NodeBehavior for Cylinder {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 3)?;
        let slices = resolution("slices", inputs.int(2)?)?;
        let mesh = ctx
            .backend()
            .gen_mesh_cylinder(inputs.float(0)?, inputs.float(1)?, slices)?;
        Ok(vec![Value::Mesh(mesh)])
    }
}

/// Cone generator
#[derive(Debug, Default)]
pub struct Cone;

impl NodeBehavior for Cone {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 3)?;
        let slices = resolution("slices", inputs.int(2)?)?;
        let mesh = ctx
            .backend()
            .gen_mesh_cone(inputs.float(0)?, inputs.float(1)?, slices)?;
        Ok(vec![Value::Mesh(mesh)])
    }
}

/// Plane generator
#[derive(Debug, Default)]
pub struct Plane;

impl NodeBehavior for Plane {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 4)?;
        let res_x = resolution("resolution x", inputs.int(2)?)?;
        let res_z = resolution("resolution z", inputs.int(3)?)?;
        let mesh = ctx
            .backend()
            .gen_mesh_plane(inputs.float(0)?, inputs.float(1)?, res_x, res_z)?;
        Ok(vec![Value::Mesh(mesh)])
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Copy `mesh` through the backend and map its positions and normals
fn transform_mesh(
    ctx: &mut ExecutionContext<'_>,
    mesh: &Mesh,
    position: impl Fn(Vec3) -> Vec3,
    normal: impl Fn(Vec3) -> Vec3,
) -> Result<Mesh, NodeError> {
    let mut out = ctx.backend().copy_mesh(mesh)?;
    for v in &mut out.vertices {
        *v = position(Vec3::from_array(*v)).to_array();
    }
    for n in &mut out.normals {
        *n = normal(Vec3::from_array(*n)).to_array();
    }
    Ok(out)
}

/// Rotate `v` by `angle` radians around the unit vector `axis`
pub fn rotate_axis_angle(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    v * cos + axis.cross(v) * sin + axis * axis.dot(v) * (1.0 - cos)
}

/// Offsets every vertex
#[derive(Debug, Default)]
pub struct Translate;

impl NodeBehavior for Translate {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 2)?;
        let mesh = inputs.mesh(0)?;
        let offset = Vec3::from_array(inputs.vector3(1)?);

        let out = transform_mesh(ctx, mesh, |p| p + offset, |n| n)?;
        Ok(vec![Value::Mesh(out)])
    }
}

/// Scales every vertex about the origin
#[derive(Debug, Default)]
pub struct Scale;

impl NodeBehavior for Scale {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 2)?;
        let mesh = inputs.mesh(0)?;
        let factor = Vec3::from_array(inputs.vector3(1)?);

        // Normals transform by the inverse transpose, which for a diagonal
        // scale is the reciprocal
        let out = transform_mesh(
            ctx,
            mesh,
            |p| p * factor,
            |n| (n / factor).normalize_or_zero(),
        )?;
        Ok(vec![Value::Mesh(out)])
    }
}

/// Rotates every vertex about the origin.
///
/// The rotation vector is axis-angle: its length is the angle in radians and
/// its direction the axis. A zero vector leaves the mesh unchanged.
#[derive(Debug, Default)]
pub struct Rotate;

impl NodeBehavior for Rotate {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 2)?;
        let mesh = inputs.mesh(0)?;
        let rotation = Vec3::from_array(inputs.vector3(1)?);

        let angle = rotation.length();
        if angle <= f32::EPSILON {
            return Ok(vec![Value::Mesh(ctx.backend().copy_mesh(mesh)?)]);
        }
        let axis = rotation / angle;

        let out = transform_mesh(
            ctx,
            mesh,
            |p| rotate_axis_angle(p, axis, angle),
            |n| rotate_axis_angle(n, axis, angle),
        )?;
        Ok(vec![Value::Mesh(out)])
    }
}

// ============================================================================
// Boolean (placeholders)
// ============================================================================

/// Concatenates both meshes
#[derive(Debug, Default)]
pub struct Union;

impl NodeBehavior for Union {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 2)?;
        let out = csg::perform_union(inputs.mesh(0)?, inputs.mesh(1)?)?;
        Ok(vec![Value::Mesh(out)])
    }
}

/// Returns a copy of the first mesh
#[derive(Debug, Default)]
pub struct Difference;

impl NodeBehavior for Difference {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 2)?;
        let out = csg::perform_difference(ctx.backend(), inputs.mesh(0)?, inputs.mesh(1)?)?;
        Ok(vec![Value::Mesh(out)])
    }
}

/// Returns an empty mesh
#[derive(Debug, Default)]
pub struct Intersection;

impl NodeBehavior for Intersection {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 2)?;
        let out = csg::perform_intersection(inputs.mesh(0)?, inputs.mesh(1)?)?;
        Ok(vec![Value::Mesh(out)])
    }
}

// ============================================================================
// Utility
// ============================================================================

/// Reports vertex and triangle counts
#[derive(Debug, Default)]
pub struct MeshInfo;

impl NodeBehavior for MeshInfo {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 1)?;
        let mesh = inputs.mesh(0)?;
        let count = |n: usize| Value::Int(i32::try_from(n).unwrap_or(i32::MAX));
        Ok(vec![count(mesh.vertex_count()), count(mesh.triangle_count())])
    }
}

/// Register the geometry node kinds
pub fn register_geometry_nodes(registry: &mut NodeRegistry) {
    let mesh_out = || vec![Port::output("Mesh", ValueKind::Mesh)];

    // ========================================================================
    // Primitives
    // ========================================================================

    registry.register(NodeKind {
        name: "Cube".to_string(),
        category: NodeCategory::Geometry,
        description: "Box centered on the origin".to_string(),
        inputs: vec![
            Port::input("Width", ValueKind::Float).with_default(Value::Float(1.0)),
            Port::input("Height", ValueKind::Float).with_default(Value::Float(1.0)),
            Port::input("Length", ValueKind::Float).with_default(Value::Float(1.0)),
        ],
        outputs: mesh_out(),
        factory: boxed::<Cube>,
    });

    registry.register(NodeKind {
        name: "Sphere".to_string(),
        category: NodeCategory::Geometry,
        description: "UV sphere centered on the origin".to_string(),
        inputs: vec![
            Port::input("Radius", ValueKind::Float).with_default(Value::Float(1.0)),
            Port::input("Rings", ValueKind::Int).with_default(Value::Int(16)),
            Port::input("Slices", ValueKind::Int).with_default(Value::Int(16)),
        ],
        outputs: mesh_out(),
        factory: boxed::<Sphere>,
    });

    registry.register(NodeKind {
        name: "Cylinder".to_string(),
        category: NodeCategory::Geometry,
        description: "Capped cylinder standing on the origin".to_string(),
        inputs: vec![
            Port::input("Radius", ValueKind::Float).with_default(Value::Float(1.0)),
            Port::input("Height", ValueKind::Float).with_default(Value::Float(2.0)),
            Port::input("Slices", ValueKind::Int).with_default(Value::Int(16)),
        ],
        outputs: mesh_out(),
        factory: boxed::<Cylinder>,
    });

    registry.register(NodeKind {
        name: "Cone".to_string(),
        category: NodeCategory::Geometry,
        description: "Cone standing on the origin".to_string(),
        inputs: vec![
            Port::input("Radius", ValueKind::Float).with_default(Value::Float(1.0)),
            Port::input("Height", ValueKind::Float).with_default(Value::Float(2.0)),
            Port::input("Slices", ValueKind::Int).with_default(Value::Int(16)),
        ],
        outputs: mesh_out(),
        factory: boxed::<Cone>,
    });

    registry.register(NodeKind {
        name: "Plane".to_string(),
        category: NodeCategory::Geometry,
        description: "Subdivided plane facing up".to_string(),
        inputs: vec![
            Port::input("Width", ValueKind::Float).with_default(Value::Float(1.0)),
            Port::input("Length", ValueKind::Float).with_default(Value::Float(1.0)),
            Port::input("Resolution X", ValueKind::Int).with_default(Value::Int(1)),
            Port::input("Resolution Z", ValueKind::Int).with_default(Value::Int(1)),
        ],
        outputs: mesh_out(),
        factory: boxed::<Plane>,
    });

    // ========================================================================
    // Transforms
    // ========================================================================

    registry.register(NodeKind {
        name: "Translate".to_string(),
        category: NodeCategory::Transform,
        description: "Offset every vertex".to_string(),
        inputs: vec![
            Port::input("Geometry", ValueKind::Mesh),
            Port::input("Offset", ValueKind::Vector3).with_default(Value::Vector3([0.0; 3])),
        ],
        outputs: mesh_out(),
        factory: boxed::<Translate>,
    });

    registry.register(NodeKind {
        name: "Scale".to_string(),
        category: NodeCategory::Transform,
        description: "Scale every vertex about the origin".to_string(),
        inputs: vec![
            Port::input("Geometry", ValueKind::Mesh),
            Port::input("Factor", ValueKind::Vector3).with_default(Value::Vector3([1.0; 3])),
        ],
        outputs: mesh_out(),
        factory: boxed::<Scale>,
    });

    registry.register(NodeKind {
        name: "Rotate".to_string(),
        category: NodeCategory::Transform,
        description: "Axis-angle rotation about the origin".to_string(),
        inputs: vec![
            Port::input("Geometry", ValueKind::Mesh),
            Port::input("Rotation", ValueKind::Vector3).with_default(Value::Vector3([0.0; 3])),
        ],
        outputs: mesh_out(),
        factory: boxed::<Rotate>,
    });

    // ========================================================================
    // Boolean
    // ========================================================================

    let operands = || {
        vec![
            Port::input("A", ValueKind::Mesh),
            Port::input("B", ValueKind::Mesh),
        ]
    };

    registry.register(NodeKind {
        name: "Union".to_string(),
        category: NodeCategory::Boolean,
        description: "Combine two meshes (concatenation, overlap kept)".to_string(),
        inputs: operands(),
        outputs: mesh_out(),
        factory: boxed::<Union>,
    });

    registry.register(NodeKind {
        name: "Difference".to_string(),
        category: NodeCategory::Boolean,
        description: "Subtract B from A (currently returns A)".to_string(),
        inputs: operands(),
        outputs: mesh_out(),
        factory: boxed::<Difference>,
    });

    registry.register(NodeKind {
        name: "Intersection".to_string(),
        category: NodeCategory::Boolean,
        description: "Overlap of A and B (currently empty)".to_string(),
        inputs: operands(),
        outputs: mesh_out(),
        factory: boxed::<Intersection>,
    });

    // ========================================================================
    // Utility
    // ========================================================================

    registry.register(NodeKind {
        name: "MeshInfo".to_string(),
        category: NodeCategory::Utility,
        description: "Vertex and triangle counts".to_string(),
        inputs: vec![Port::input("Geometry", ValueKind::Mesh)],
        outputs: vec![
            Port::output("Vertices", ValueKind::Int),
            Port::output("Triangles", ValueKind::Int),
        ],
        factory: boxed::<MeshInfo>,
    });
}

/// Create a registry with only the geometry node kinds and constants
pub fn create_geometry_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    super::common::register_common_nodes(&mut registry);
    register_geometry_nodes(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SoftwareBackend;
    use crate::error::GraphError;
    use crate::graph::Graph;
    use crate::node::NodeId;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-4;

    fn run(graph: &Graph, id: NodeId) -> Vec<Value> {
        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        graph.execute_node(id, &mut ctx).unwrap()
    }

    fn single_mesh(values: Vec<Value>) -> Mesh {
        assert_eq!(values.len(), 1);
        values.into_iter().next().unwrap().into_mesh().unwrap()
    }

    fn assert_close(a: &[[f32; 3]], b: &[[f32; 3]]) {
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(b) {
            for axis in 0..3 {
                assert!((p[axis] - q[axis]).abs() < EPS, "{p:?} != {q:?}");
            }
        }
    }

    /// Graph with a `source` primitive feeding a transform set to `param`
    fn transform_graph(source: &str, transform: &str, param: [f32; 3]) -> (Graph, NodeId, NodeId) {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("transform");
        let src = registry.instantiate(&mut graph, source).unwrap();
        let xf = registry.instantiate(&mut graph, transform).unwrap();
        graph.add_connection(src, 0, xf, 0).unwrap();
        graph
            .set_input_default(xf, 1, Some(Value::Vector3(param)))
            .unwrap();
        (graph, src, xf)
    }

    #[test]
    fn test_primitives_use_defaults() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("primitives");

        for name in ["Cube", "Sphere", "Cylinder", "Cone", "Plane"] {
            let id = registry.instantiate(&mut graph, name).unwrap();
            let mesh = single_mesh(run(&graph, id));
            assert!(mesh.vertex_count() > 0, "{name} has no vertices");
            assert!(mesh.triangle_count() > 0, "{name} has no triangles");
        }
    }

    #[test]
    fn test_primitive_rejects_bad_parameter() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("bad");
        let id = registry.instantiate(&mut graph, "Sphere").unwrap();
        graph.set_input_default(id, 1, Some(Value::Int(-4))).unwrap();

        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        let err = graph.execute_node(id, &mut ctx).unwrap_err();
        assert!(matches!(
            err.node_error(),
            Some(NodeError::Backend(BackendError::InvalidParameter { name: "rings", .. }))
        ));
    }

    #[test]
    fn test_huge_resolution_reports_out_of_memory() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("huge");
        let id = registry.instantiate(&mut graph, "Sphere").unwrap();
        graph.set_input_default(id, 1, Some(Value::Int(i32::MAX))).unwrap();
        graph.set_input_default(id, 2, Some(Value::Int(3))).unwrap();

        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        let err = graph.execute_node(id, &mut ctx).unwrap_err();
        assert!(err.is_out_of_memory(), "unexpected error: {err}");
        assert!(matches!(err, GraphError::Execution { node, .. } if node == id));
    }

    #[test]
    fn test_identity_transforms() {
        for (transform, param) in [
            ("Translate", [0.0; 3]),
            ("Rotate", [0.0; 3]),
            ("Scale", [1.0; 3]),
        ] {
            let (graph, src, xf) = transform_graph("Sphere", transform, param);
            let original = single_mesh(run(&graph, src));
            let moved = single_mesh(run(&graph, xf));
            assert_close(&moved.vertices, &original.vertices);
            assert_close(&moved.normals, &original.normals);
            assert_eq!(moved.indices, original.indices);
        }
    }

    #[test]
    fn test_translate_round_trip() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("round trip");
        let cube = registry.instantiate(&mut graph, "Cube").unwrap();
        let forward = registry.instantiate(&mut graph, "Translate").unwrap();
        let back = registry.instantiate(&mut graph, "Translate").unwrap();
        graph.add_connection(cube, 0, forward, 0).unwrap();
        graph.add_connection(forward, 0, back, 0).unwrap();

        let v = [3.5, -1.25, 10.0];
        graph.set_input_default(forward, 1, Some(Value::Vector3(v))).unwrap();
        graph
            .set_input_default(back, 1, Some(Value::Vector3([-v[0], -v[1], -v[2]])))
            .unwrap();

        let original = single_mesh(run(&graph, cube));
        let shifted = single_mesh(run(&graph, forward));
        let restored = single_mesh(run(&graph, back));

        assert!((shifted.vertices[0][0] - original.vertices[0][0] - v[0]).abs() < EPS);
        assert_close(&restored.vertices, &original.vertices);
    }

    #[test]
    fn test_rotate_is_axis_angle() {
        // Quarter turn about +Z takes +X to +Y
        let rotated = rotate_axis_angle(Vec3::X, Vec3::Z, FRAC_PI_2);
        assert!((rotated - Vec3::Y).length() < EPS);

        let (graph, src, xf) = transform_graph("Cube", "Rotate", [0.0, 0.0, FRAC_PI_2]);
        let original = single_mesh(run(&graph, src));
        let turned = single_mesh(run(&graph, xf));
        for (p, q) in original.vertices.iter().zip(&turned.vertices) {
            assert!((q[0] + p[1]).abs() < EPS);
            assert!((q[1] - p[0]).abs() < EPS);
            assert!((q[2] - p[2]).abs() < EPS);
        }
    }

    #[test]
    fn test_rotate_preserves_lengths() {
        let (graph, src, xf) = transform_graph("Sphere", "Rotate", [0.3, -1.2, 0.7]);
        let original = single_mesh(run(&graph, src));
        let turned = single_mesh(run(&graph, xf));
        for (p, q) in original.vertices.iter().zip(&turned.vertices) {
            let a = Vec3::from_array(*p).length();
            let b = Vec3::from_array(*q).length();
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn test_scale_renormalizes_normals() {
        let (graph, _, xf) = transform_graph("Sphere", "Scale", [2.0, 0.5, 1.0]);
        let scaled = single_mesh(run(&graph, xf));
        for n in &scaled.normals {
            let len = Vec3::from_array(*n).length();
            assert!((len - 1.0).abs() < EPS || len == 0.0);
        }
        let (min, max) = scaled.bounds().unwrap();
        assert!((max[0] - min[0] - 4.0).abs() < EPS);
        assert!((max[1] - min[1] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_transform_requires_mesh() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("unfed");
        let id = registry.instantiate(&mut graph, "Translate").unwrap();

        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        assert!(matches!(
            graph.execute_node(id, &mut ctx),
            Err(GraphError::MissingRequiredInput { input: 0, .. })
        ));
    }

    #[test]
    fn test_union_of_two_cubes() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("union");
        let a = registry.instantiate(&mut graph, "Cube").unwrap();
        let b = registry.instantiate(&mut graph, "Cube").unwrap();
        let union = registry.instantiate(&mut graph, "Union").unwrap();
        assert_eq!((a, b, union), (NodeId(0), NodeId(1), NodeId(2)));

        graph.add_connection(a, 0, union, 0).unwrap();
        graph.add_connection(b, 0, union, 1).unwrap();

        let cube_vertices = single_mesh(run(&graph, a)).vertex_count()
            + single_mesh(run(&graph, b)).vertex_count();

        let outputs = run(&graph, union);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].kind(), ValueKind::Mesh);
        assert_eq!(single_mesh(outputs).vertex_count(), cube_vertices);

        // Feeding the union back into the first cube closes a loop
        let before = graph.connections().to_vec();
        assert!(matches!(
            graph.add_connection(union, 0, a, 0),
            Err(GraphError::WouldCreateCycle { .. })
        ));
        assert_eq!(graph.connections(), before.as_slice());
    }

    #[test]
    fn test_difference_and_intersection_placeholders() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("csg");
        let a = registry.instantiate(&mut graph, "Cube").unwrap();
        let b = registry.instantiate(&mut graph, "Sphere").unwrap();
        let diff = registry.instantiate(&mut graph, "Difference").unwrap();
        let inter = registry.instantiate(&mut graph, "Intersection").unwrap();
        for op in [diff, inter] {
            graph.add_connection(a, 0, op, 0).unwrap();
            graph.add_connection(b, 0, op, 1).unwrap();
        }

        let cube = single_mesh(run(&graph, a));
        assert_eq!(single_mesh(run(&graph, diff)), cube);
        assert!(single_mesh(run(&graph, inter)).is_empty());
    }

    #[test]
    fn test_mesh_info_counts() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("info");
        let cube = registry.instantiate(&mut graph, "Cube").unwrap();
        let info = registry.instantiate(&mut graph, "MeshInfo").unwrap();
        graph.add_connection(cube, 0, info, 0).unwrap();

        assert_eq!(run(&graph, info), vec![Value::Int(24), Value::Int(12)]);
    }

    #[test]
    fn test_wrong_kind_into_mesh_slot() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("kinds");
        let float = registry.instantiate(&mut graph, "Float").unwrap();
        let translate = registry.instantiate(&mut graph, "Translate").unwrap();
        graph.add_connection(float, 0, translate, 0).unwrap();

        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        let err = graph.execute_node(translate, &mut ctx).unwrap_err();
        assert!(matches!(
            err.node_error(),
            Some(NodeError::InvalidInputType { index: 0, expected: ValueKind::Mesh, actual: ValueKind::Float })
        ));
    }

    #[test]
    fn test_whole_graph_execution() {
        let registry = create_geometry_registry();
        let mut graph = Graph::new("scene");
        let ground = registry.instantiate(&mut graph, "Plane").unwrap();
        let pillar = registry.instantiate(&mut graph, "Cylinder").unwrap();
        let lift = registry.instantiate(&mut graph, "Translate").unwrap();
        let scene = registry.instantiate(&mut graph, "Union").unwrap();
        graph.add_connection(pillar, 0, lift, 0).unwrap();
        graph.add_connection(ground, 0, scene, 0).unwrap();
        graph.add_connection(lift, 0, scene, 1).unwrap();

        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        let mut evaluation = graph.execute(&mut ctx).unwrap();
        assert_eq!(evaluation.len(), 4);

        let merged = single_mesh(evaluation.take(scene).unwrap());
        let ground_mesh = evaluation.output(ground, 0).and_then(Value::as_mesh).unwrap();
        let pillar_mesh = evaluation.output(pillar, 0).and_then(Value::as_mesh).unwrap();
        assert_eq!(
            merged.vertex_count(),
            ground_mesh.vertex_count() + pillar_mesh.vertex_count()
        );
    }
}
