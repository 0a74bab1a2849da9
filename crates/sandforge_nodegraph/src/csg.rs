// SPDX-License-Identifier: MIT OR Apache-2.0
//! Placeholder boolean operations on meshes.
//!
//! These do not compute real solid geometry:
//! - union concatenates both meshes, overlap included
//! - difference returns a copy of the first operand
//! - intersection returns an empty mesh

use crate::backend::GraphicsBackend;
use crate::error::NodeError;
use crate::mesh::Mesh;

/// Append `b` after `a`, offsetting `b`'s indices.
///
/// If only one side is indexed the other gets sequential indices so the
/// result stays a valid indexed mesh. Optional buffers (normals, UVs, bones)
/// are kept only when both sides carry them.
pub fn concatenate_meshes(a: &Mesh, b: &Mesh) -> Result<Mesh, NodeError> {
    let mut out = Mesh::new();
    let vertex_total = a.vertex_count() + b.vertex_count();

    out.vertices.try_reserve_exact(vertex_total)?;
    out.vertices.extend_from_slice(&a.vertices);
    out.vertices.extend_from_slice(&b.vertices);

    out.normals = concat_attribute(&a.normals, &b.normals, a, b)?;
    out.texcoords = concat_attribute(&a.texcoords, &b.texcoords, a, b)?;

    if !a.indices.is_empty() || !b.indices.is_empty() {
        let offset = u32::try_from(a.vertex_count()).map_err(|_| NodeError::OutOfMemory)?;
        out.indices
            .try_reserve_exact(index_len(a) + index_len(b))?;
        push_indices(&mut out.indices, a, 0);
        push_indices(&mut out.indices, b, offset);
    }

    if let (Some(ia), Some(ib)) = (&a.bone_ids, &b.bone_ids) {
        out.bone_ids = Some(concat_attribute(ia, ib, a, b)?);
    }
    if let (Some(wa), Some(wb)) = (&a.bone_weights, &b.bone_weights) {
        out.bone_weights = Some(concat_attribute(wa, wb, a, b)?);
    }

    Ok(out)
}

fn concat_attribute<T: Copy>(x: &[T], y: &[T], a: &Mesh, b: &Mesh) -> Result<Vec<T>, NodeError> {
    if x.len() != a.vertex_count() || y.len() != b.vertex_count() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    out.try_reserve_exact(x.len() + y.len())?;
    out.extend_from_slice(x);
    out.extend_from_slice(y);
    Ok(out)
}

fn index_len(mesh: &Mesh) -> usize {
    if mesh.indices.is_empty() {
        mesh.vertex_count()
    } else {
        mesh.indices.len()
    }
}

fn push_indices(out: &mut Vec<u32>, mesh: &Mesh, offset: u32) {
    if mesh.indices.is_empty() {
        out.extend((0..mesh.vertex_count() as u32).map(|i| i + offset));
    } else {
        out.extend(mesh.indices.iter().map(|i| i + offset));
    }
}

/// Union placeholder: both meshes concatenated
pub fn perform_union(a: &Mesh, b: &Mesh) -> Result<Mesh, NodeError> {
    concatenate_meshes(a, b)
}

/// Difference placeholder: a copy of `a`
pub fn perform_difference(
    backend: &mut dyn GraphicsBackend,
    a: &Mesh,
    _b: &Mesh,
) -> Result<Mesh, NodeError> {
    Ok(backend.copy_mesh(a)?)
}

/// Intersection placeholder: an empty mesh
pub fn perform_intersection(_a: &Mesh, _b: &Mesh) -> Result<Mesh, NodeError> {
    Ok(Mesh::new())
}
