// SPDX-License-Identifier: MIT OR Apache-2.0
//! CPU-side mesh buffers and texture handles exchanged by nodes.

use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;

/// Handle to a mesh uploaded to the graphics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GpuMeshId(pub u32);

/// Triangle mesh with optional index and skinning buffers.
///
/// When `indices` is empty the vertex buffer is read as a triangle list.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<[f32; 3]>,
    /// Vertex normals (empty or one per vertex)
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (empty or one per vertex)
    pub texcoords: Vec<[f32; 2]>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Bone indices per vertex
    pub bone_ids: Option<Vec<[u8; 4]>>,
    /// Bone weights per vertex
    pub bone_weights: Option<Vec<[f32; 4]>>,
    /// GPU handle, set once uploaded
    #[serde(skip)]
    pub gpu: Option<GpuMeshId>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertices.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    /// Whether the mesh has no geometry
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the mesh has been uploaded
    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Deep-copy the CPU buffers, failing instead of aborting when they
    /// cannot be allocated. The copy has no GPU handle.
    pub fn try_clone(&self) -> Result<Self, TryReserveError> {
        Ok(Self {
            vertices: try_copy(&self.vertices)?,
            normals: try_copy(&self.normals)?,
            texcoords: try_copy(&self.texcoords)?,
            indices: try_copy(&self.indices)?,
            bone_ids: self.bone_ids.as_deref().map(try_copy).transpose()?,
            bone_weights: self.bone_weights.as_deref().map(try_copy).transpose()?,
            gpu: None,
        })
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices[1..] {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        Some((min, max))
    }
}

// Copies share CPU data only; a GPU handle belongs to exactly one mesh.
impl Clone for Mesh {
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            normals: self.normals.clone(),
            texcoords: self.texcoords.clone(),
            indices: self.indices.clone(),
            bone_ids: self.bone_ids.clone(),
            bone_weights: self.bone_weights.clone(),
            gpu: None,
        }
    }
}

fn try_copy<T: Copy>(source: &[T]) -> Result<Vec<T>, TryReserveError> {
    let mut copy = Vec::new();
    copy.try_reserve_exact(source.len())?;
    copy.extend_from_slice(source);
    Ok(copy)
}

/// Handle to a texture loaded by the graphics backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Texture {
    /// Backend texture ID
    pub id: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Source path
    pub path: String,
}
