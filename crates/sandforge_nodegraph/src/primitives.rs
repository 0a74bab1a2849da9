// SPDX-License-Identifier: MIT OR Apache-2.0
//! CPU generators for primitive meshes.
//!
//! All generators produce indexed triangle lists with one normal and one
//! texture coordinate per vertex. Parameters are validated by the caller.
//!
//! Buffer sizes are computed up front and reserved with `try_reserve`, so a
//! resolution too large to allocate (or to index with `u32`) fails with
//! [`BackendError::OutOfMemory`] before any vertex is written.

use crate::backend::BackendError;
use crate::mesh::Mesh;
use std::f32::consts::{PI, TAU};

/// Empty mesh with room for exactly `vertices` vertices and `indices` indices.
///
/// `None` stands for a count that overflowed while being computed.
fn allocate(vertices: Option<u64>, indices: Option<u64>) -> Result<Mesh, BackendError> {
    let vertices = vertices
        .filter(|&n| n <= u64::from(u32::MAX))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(BackendError::OutOfMemory)?;
    let indices = indices
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(BackendError::OutOfMemory)?;

    let mut mesh = Mesh::new();
    mesh.vertices.try_reserve_exact(vertices)?;
    mesh.normals.try_reserve_exact(vertices)?;
    mesh.texcoords.try_reserve_exact(vertices)?;
    mesh.indices.try_reserve_exact(indices)?;
    Ok(mesh)
}

/// `(a + 1) * (b + 1)` vertices of a grid, `a * b * 6` indices
fn grid_counts(a: u32, b: u32) -> (Option<u64>, Option<u64>) {
    let (a, b) = (u64::from(a), u64::from(b));
    ((a + 1).checked_mul(b + 1), a.checked_mul(b).and_then(|n| n.checked_mul(6)))
}

/// Index of the next vertex pushed. Fits because `allocate` capped the total.
fn next_index(mesh: &Mesh) -> u32 {
    mesh.vertices.len() as u32
}

/// Axis-aligned box centered on the origin
pub fn cube(width: f32, height: f32, length: f32) -> Result<Mesh, BackendError> {
    let (x, y, z) = (width / 2.0, height / 2.0, length / 2.0);

    // (normal, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]]),
        ([0.0, 0.0, -1.0], [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]]),
        ([0.0, 1.0, 0.0], [[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]]),
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]]),
        ([1.0, 0.0, 0.0], [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]]),
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]]),
    ];
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut mesh = allocate(Some(24), Some(36))?;
    for (normal, corners) in faces {
        let base = next_index(&mesh);
        for (corner, uv) in corners.into_iter().zip(uvs) {
            mesh.vertices.push(corner);
            mesh.normals.push(normal);
            mesh.texcoords.push(uv);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Ok(mesh)
}

/// UV sphere centered on the origin
pub fn sphere(radius: f32, rings: u32, slices: u32) -> Result<Mesh, BackendError> {
    let (vertex_count, index_count) = grid_counts(rings, slices);
    let mut mesh = allocate(vertex_count, index_count)?;

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for slice in 0..=slices {
            let u = slice as f32 / slices as f32;
            let theta = u * TAU;
            let normal = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            mesh.vertices
                .push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
            mesh.normals.push(normal);
            mesh.texcoords.push([u, v]);
        }
    }

    // Every index is below the vertex count, which fits in u32
    let stride = slices + 1;
    for ring in 0..rings {
        for slice in 0..slices {
            let a = ring * stride + slice;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    Ok(mesh)
}

/// Capped cylinder standing on the origin, extending up the Y axis
pub fn cylinder(radius: f32, height: f32, slices: u32) -> Result<Mesh, BackendError> {
    let s = u64::from(slices);
    let mut mesh = allocate(Some(4 * s + 6), Some(12 * s))?;
    push_side(&mut mesh, radius, radius, height, slices);
    push_cap(&mut mesh, radius, height, slices, true);
    push_cap(&mut mesh, radius, 0.0, slices, false);
    Ok(mesh)
}

/// Cone with its base on the origin and its apex at `height`
pub fn cone(radius: f32, height: f32, slices: u32) -> Result<Mesh, BackendError> {
    let s = u64::from(slices);
    let mut mesh = allocate(Some(3 * s + 4), Some(9 * s))?;
    push_side(&mut mesh, radius, 0.0, height, slices);
    push_cap(&mut mesh, radius, 0.0, slices, false);
    Ok(mesh)
}

/// Subdivided plane in the XZ plane facing +Y
pub fn plane(width: f32, length: f32, res_x: u32, res_z: u32) -> Result<Mesh, BackendError> {
    let (vertex_count, index_count) = grid_counts(res_x, res_z);
    let mut mesh = allocate(vertex_count, index_count)?;

    for iz in 0..=res_z {
        let v = iz as f32 / res_z as f32;
        for ix in 0..=res_x {
            let u = ix as f32 / res_x as f32;
            mesh.vertices
                .push([(u - 0.5) * width, 0.0, (v - 0.5) * length]);
            mesh.normals.push([0.0, 1.0, 0.0]);
            mesh.texcoords.push([u, v]);
        }
    }

    let stride = res_x + 1;
    for iz in 0..res_z {
        for ix in 0..res_x {
            let a = iz * stride + ix;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    Ok(mesh)
}

/// Lateral surface between a bottom ring at y = 0 and a top ring at `height`.
/// A zero top radius makes a cone.
fn push_side(mesh: &mut Mesh, bottom: f32, top: f32, height: f32, slices: u32) {
    let base = next_index(mesh);
    let slope = (bottom - top) / height;

    for slice in 0..=slices {
        let u = slice as f32 / slices as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        let len = (1.0 + slope * slope).sqrt();
        let normal = [cos / len, slope / len, sin / len];

        mesh.vertices.push([cos * bottom, 0.0, sin * bottom]);
        mesh.normals.push(normal);
        mesh.texcoords.push([u, 0.0]);

        mesh.vertices.push([cos * top, height, sin * top]);
        mesh.normals.push(normal);
        mesh.texcoords.push([u, 1.0]);
    }

    for slice in 0..slices {
        let a = base + slice * 2;
        mesh.indices
            .extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
    }
}

/// Disc at height `y` facing up or down
fn push_cap(mesh: &mut Mesh, radius: f32, y: f32, slices: u32, up: bool) {
    let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let center = next_index(mesh);
    mesh.vertices.push([0.0, y, 0.0]);
    mesh.normals.push(normal);
    mesh.texcoords.push([0.5, 0.5]);

    for slice in 0..=slices {
        let (sin, cos) = (slice as f32 / slices as f32 * TAU).sin_cos();
        mesh.vertices.push([cos * radius, y, sin * radius]);
        mesh.normals.push(normal);
        mesh.texcoords.push([0.5 + cos * 0.5, 0.5 + sin * 0.5]);
    }

    for slice in 0..slices {
        let a = center + 1 + slice;
        if up {
            mesh.indices.extend_from_slice(&[center, a + 1, a]);
        } else {
            mesh.indices.extend_from_slice(&[center, a, a + 1]);
        }
    }
}
