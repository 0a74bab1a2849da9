// SPDX-License-Identifier: MIT OR Apache-2.0
//! Executes a graph's output node and hands the results to the backend.

use crate::settings::PreviewSettings;
use sandforge_nodegraph::{
    ExecutionContext, Graph, GraphError, GraphicsBackend, NodeId, PbrMaterial, Value, ValueKind,
};
use tracing::{debug, info};

/// Summary of one produced mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSummary {
    /// Output slot it came from
    pub output: usize,
    /// Vertex count
    pub vertices: usize,
    /// Triangle count
    pub triangles: usize,
    /// Axis-aligned bounds
    pub bounds: Option<([f32; 3], [f32; 3])>,
}

/// What a preview run produced
#[derive(Debug, Default)]
pub struct PreviewReport {
    /// Meshes produced by the output node
    pub meshes: Vec<MeshSummary>,
    /// Material recorded by a sink, if any ran
    pub material: Option<PbrMaterial>,
    /// Non-mesh values, by kind
    pub values: Vec<(usize, ValueKind)>,
}

/// Pick the node to preview: the settings override, then the document's
/// designated output, then the last sink, then the last node
pub fn select_output(graph: &Graph, settings: &PreviewSettings, designated: Option<NodeId>) -> Option<NodeId> {
    if let Some(id) = settings.output_node {
        return Some(NodeId(id)).filter(|id| graph.node(*id).is_some());
    }
    designated
        .or_else(|| graph.nodes().filter(|n| n.is_sink()).map(|n| n.id()).last())
        .or_else(|| graph.node_ids().last())
}

/// Execute `output` and release everything it produced.
///
/// Meshes are uploaded first when the settings ask for it, so the backend
/// sees the same upload/unload traffic the editor viewport would cause.
/// With `execute_all`, outputs of the other nodes are released unread.
pub fn run_preview(
    graph: &Graph,
    output: NodeId,
    settings: &PreviewSettings,
    backend: &mut dyn GraphicsBackend,
) -> Result<PreviewReport, GraphError> {
    let mut ctx = ExecutionContext::new(backend);

    let values = if settings.execute_all {
        let mut evaluation = graph.execute(&mut ctx)?;
        debug!(nodes = evaluation.len(), "executed whole graph");
        let values = evaluation.take(output);
        evaluation.release(&mut ctx);
        values.ok_or(GraphError::NodeNotFound(output))?
    } else {
        graph.execute_node(output, &mut ctx)?
    };

    let mut report = PreviewReport {
        material: ctx.take_material(),
        ..Default::default()
    };

    let mut values = values.into_iter().enumerate();
    while let Some((index, value)) = values.next() {
        match value {
            Value::Mesh(mut mesh) => {
                let summary = MeshSummary {
                    output: index,
                    vertices: mesh.vertex_count(),
                    triangles: mesh.triangle_count(),
                    bounds: mesh.bounds(),
                };
                info!(
                    output = index,
                    vertices = summary.vertices,
                    triangles = summary.triangles,
                    "mesh ready"
                );
                if settings.upload_meshes && !mesh.is_empty() {
                    if let Err(e) = ctx.backend().upload_mesh(&mut mesh, false) {
                        ctx.release_all(values.map(|(_, rest)| rest));
                        return Err(GraphError::Execution {
                            node: output,
                            source: e.into(),
                        });
                    }
                }
                ctx.backend().unload_mesh(mesh);
                report.meshes.push(summary);
            }
            Value::Texture(texture) => {
                info!(output = index, path = %texture.path, width = texture.width, height = texture.height, "texture ready");
                report.values.push((index, ValueKind::Texture));
                ctx.backend().unload_texture(texture);
            }
            other => {
                info!(output = index, value = ?other, "value ready");
                report.values.push((index, other.kind()));
            }
        }
    }

    if let Some(material) = &report.material {
        info!(
            albedo = ?material.albedo,
            metallic = material.metallic,
            roughness = material.roughness,
            "material ready"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::build_demo_scene;
    use sandforge_nodegraph::{create_default_registry, SoftwareBackend};

    #[test]
    fn test_preview_releases_uploaded_meshes() {
        let registry = create_default_registry();
        let loaded = build_demo_scene(&registry).unwrap();
        let settings = PreviewSettings::default();
        let output = select_output(&loaded.graph, &settings, loaded.output).unwrap();

        let mut backend = SoftwareBackend::new();
        let report = run_preview(&loaded.graph, output, &settings, &mut backend).unwrap();

        assert_eq!(report.meshes.len(), 1);
        assert!(report.meshes[0].triangles > 0);
        assert_eq!(backend.live_mesh_count(), 0);
    }

    #[test]
    fn test_execute_all_matches_single_node() {
        let registry = create_default_registry();
        let loaded = build_demo_scene(&registry).unwrap();
        let output = loaded.output.unwrap();
        let mut backend = SoftwareBackend::new();

        let single = run_preview(&loaded.graph, output, &PreviewSettings::default(), &mut backend).unwrap();
        let settings = PreviewSettings {
            execute_all: true,
            ..Default::default()
        };
        let all = run_preview(&loaded.graph, output, &settings, &mut backend).unwrap();
        assert_eq!(single.meshes, all.meshes);
    }

    #[test]
    fn test_material_sink_is_reported() {
        let registry = create_default_registry();
        let mut graph = Graph::new("material");
        let mix = registry.instantiate(&mut graph, "Mix").unwrap();
        let sink = registry.instantiate(&mut graph, "PbrOutput").unwrap();
        graph.add_connection(mix, 0, sink, 0).unwrap();

        let settings = PreviewSettings::default();
        assert_eq!(select_output(&graph, &settings, None), Some(sink));

        let mut backend = SoftwareBackend::new();
        let report = run_preview(&graph, sink, &settings, &mut backend).unwrap();
        assert!(report.meshes.is_empty());
        assert!(report.material.is_some());
    }

    #[test]
    fn test_output_override() {
        let registry = create_default_registry();
        let loaded = build_demo_scene(&registry).unwrap();

        let settings = PreviewSettings {
            output_node: Some(0),
            ..Default::default()
        };
        assert_eq!(select_output(&loaded.graph, &settings, loaded.output), Some(NodeId(0)));

        let settings = PreviewSettings {
            output_node: Some(999),
            ..Default::default()
        };
        assert_eq!(select_output(&loaded.graph, &settings, loaded.output), None);
    }

    fn textured_material_graph(texture_path: &str) -> Graph {
        let registry = create_default_registry();
        let mut graph = Graph::new("textured");
        let texture = registry.instantiate(&mut graph, "Texture").unwrap();
        let sample = registry.instantiate(&mut graph, "SampleTexture").unwrap();
        let sink = registry.instantiate(&mut graph, "PbrOutput").unwrap();
        // Loaded but never consumed
        let stray = registry.instantiate(&mut graph, "Texture").unwrap();
        for id in [texture, stray] {
            graph
                .set_input_default(id, 0, Some(Value::Opaque(texture_path.to_string())))
                .unwrap();
        }
        graph.add_connection(texture, 0, sample, 0).unwrap();
        graph.add_connection(sample, 0, sink, 0).unwrap();
        graph
    }

    #[test]
    fn test_execute_all_releases_every_texture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("green.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
            .save(&path)
            .unwrap();
        let graph = textured_material_graph(path.to_str().unwrap());
        let sink = select_output(&graph, &PreviewSettings::default(), None).unwrap();

        for execute_all in [true, false] {
            let settings = PreviewSettings {
                execute_all,
                ..Default::default()
            };
            let mut backend = SoftwareBackend::new();
            let report = run_preview(&graph, sink, &settings, &mut backend).unwrap();

            assert_eq!(backend.live_texture_count(), 0, "execute_all = {execute_all}");
            let material = report.material.unwrap();
            assert_eq!(material.albedo, sandforge_nodegraph::Color::rgba(0, 255, 0, 255));
        }
    }
}
