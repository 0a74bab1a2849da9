// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graphics backend consumed by leaf nodes.
//!
//! The node graph never touches GPU state directly. Primitive generators,
//! uploads and texture loads go through [`GraphicsBackend`]; the engine
//! plugs in its renderer binding, tools and tests use [`SoftwareBackend`].

use crate::mesh::{GpuMeshId, Mesh, Texture};
use crate::primitives;
use crate::value::Color;
use image::RgbaImage;
use std::collections::{HashMap, HashSet, TryReserveError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Error raised by a graphics backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Parameter outside the accepted range
    #[error("Invalid {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Texture could not be loaded
    #[error("Failed to load texture '{path}': {reason}")]
    Texture {
        /// Requested path
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Mesh is already resident on the GPU
    #[error("Mesh already uploaded as {0:?}")]
    AlreadyUploaded(GpuMeshId),

    /// Texture handle is not loaded in this backend
    #[error("Unknown texture {0}")]
    UnknownTexture(u32),

    /// Buffers for the requested mesh could not be allocated
    #[error("Out of memory")]
    OutOfMemory,
}

impl From<TryReserveError> for BackendError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Mesh and texture services provided by the renderer binding
pub trait GraphicsBackend {
    /// Generate a box mesh
    fn gen_mesh_cube(&mut self, width: f32, height: f32, length: f32) -> Result<Mesh, BackendError>;

    /// Generate a UV sphere mesh
    fn gen_mesh_sphere(&mut self, radius: f32, rings: u32, slices: u32) -> Result<Mesh, BackendError>;

    /// Generate a capped cylinder mesh
    fn gen_mesh_cylinder(&mut self, radius: f32, height: f32, slices: u32) -> Result<Mesh, BackendError>;

    /// Generate a cone mesh
    fn gen_mesh_cone(&mut self, radius: f32, height: f32, slices: u32) -> Result<Mesh, BackendError>;

    /// Generate a subdivided plane mesh
    fn gen_mesh_plane(
        &mut self,
        width: f32,
        length: f32,
        res_x: u32,
        res_z: u32,
    ) -> Result<Mesh, BackendError>;

    /// Deep-copy a mesh's CPU buffers. The copy is never uploaded.
    fn copy_mesh(&mut self, mesh: &Mesh) -> Result<Mesh, BackendError> {
        Ok(mesh.try_clone()?)
    }

    /// Upload a mesh and store its handle in the mesh
    fn upload_mesh(&mut self, mesh: &mut Mesh, dynamic: bool) -> Result<GpuMeshId, BackendError>;

    /// Release a mesh and its GPU handle
    fn unload_mesh(&mut self, mesh: Mesh);

    /// Load a texture from a path
    fn load_texture(&mut self, path: &str) -> Result<Texture, BackendError>;

    /// Read the texel nearest to `uv`.
    ///
    /// `(0, 0)` is the top-left corner; coordinates outside `[0, 1)` wrap.
    fn sample_texture(&mut self, texture: &Texture, uv: [f32; 2]) -> Result<Color, BackendError>;

    /// Release a texture
    fn unload_texture(&mut self, texture: Texture);
}

/// CPU-only backend.
///
/// Meshes are generated in software and uploads hand out fake handles.
/// Textures are decoded into memory so they can be sampled.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    texture_root: Option<PathBuf>,
    next_mesh_id: u32,
    next_texture_id: u32,
    live_meshes: HashSet<GpuMeshId>,
    live_textures: HashMap<u32, RgbaImage>,
}

impl SoftwareBackend {
    /// Create a backend resolving texture paths against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative texture paths against `root`
    pub fn with_texture_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.texture_root = Some(root.into());
        self
    }

    /// Number of uploaded meshes not yet unloaded
    pub fn live_mesh_count(&self) -> usize {
        self.live_meshes.len()
    }

    /// Number of loaded textures not yet unloaded
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.texture_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), BackendError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BackendError::InvalidParameter {
            name,
            reason: format!("expected a positive size, got {value}"),
        })
    }
}

fn at_least(name: &'static str, value: u32, min: u32) -> Result<(), BackendError> {
    if value >= min {
        Ok(())
    } else {
        Err(BackendError::InvalidParameter {
            name,
            reason: format!("expected at least {min}, got {value}"),
        })
    }
}

impl GraphicsBackend for SoftwareBackend {
    fn gen_mesh_cube(&mut self, width: f32, height: f32, length: f32) -> Result<Mesh, BackendError> {
        positive("width", width)?;
        positive("height", height)?;
        positive("length", length)?;
        primitives::cube(width, height, length)
    }

    fn gen_mesh_sphere(&mut self, radius: f32, rings: u32, slices: u32) -> Result<Mesh, BackendError> {
        positive("radius", radius)?;
        at_least("rings", rings, 2)?;
        at_least("slices", slices, 3)?;
        primitives::sphere(radius, rings, slices)
    }

    fn gen_mesh_cylinder(&mut self, radius: f32, height: f32, slices: u32) -> Result<Mesh, BackendError> {
        positive("radius", radius)?;
        positive("height", height)?;
        at_least("slices", slices, 3)?;
        primitives::cylinder(radius, height, slices)
    }

    fn gen_mesh_cone(&mut self, radius: f32, height: f32, slices: u32) -> Result<Mesh, BackendError> {
        positive("radius", radius)?;
        positive("height", height)?;
        at_least("slices", slices, 3)?;
        primitives::cone(radius, height, slices)
    }

    fn gen_mesh_plane(
        &mut self,
        width: f32,
        length: f32,
        res_x: u32,
        res_z: u32,
    ) -> Result<Mesh, BackendError> {
        positive("width", width)?;
        positive("length", length)?;
        at_least("resolution x", res_x, 1)?;
        at_least("resolution z", res_z, 1)?;
        primitives::plane(width, length, res_x, res_z)
    }

    fn upload_mesh(&mut self, mesh: &mut Mesh, dynamic: bool) -> Result<GpuMeshId, BackendError> {
        if let Some(id) = mesh.gpu {
            return Err(BackendError::AlreadyUploaded(id));
        }
        let id = GpuMeshId(self.next_mesh_id);
        self.next_mesh_id += 1;
        self.live_meshes.insert(id);
        mesh.gpu = Some(id);
        debug!(?id, vertices = mesh.vertex_count(), dynamic, "uploaded mesh");
        Ok(id)
    }

    fn unload_mesh(&mut self, mesh: Mesh) {
        match mesh.gpu {
            Some(id) if self.live_meshes.remove(&id) => debug!(?id, "unloaded mesh"),
            Some(id) => warn!(?id, "unloading mesh with unknown handle"),
            None => {}
        }
    }

    fn load_texture(&mut self, path: &str) -> Result<Texture, BackendError> {
        if path.is_empty() {
            return Err(BackendError::InvalidParameter {
                name: "path",
                reason: "texture path is empty".to_string(),
            });
        }

        let resolved = self.resolve(path);
        let pixels = image::open(&resolved)
            .map_err(|e| BackendError::Texture {
                path: path.to_string(),
                reason: e.to_string(),
            })?
            .into_rgba8();
        let (width, height) = pixels.dimensions();

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.live_textures.insert(id, pixels);
        debug!(id, path, width, height, "loaded texture");

        Ok(Texture {
            id,
            width,
            height,
            path: path.to_string(),
        })
    }

    fn sample_texture(&mut self, texture: &Texture, uv: [f32; 2]) -> Result<Color, BackendError> {
        let pixels = self
            .live_textures
            .get(&texture.id)
            .ok_or(BackendError::UnknownTexture(texture.id))?;
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(BackendError::UnknownTexture(texture.id));
        }

        let texel = |coord: f32, size: u32| {
            let wrapped = if coord.is_finite() { coord.rem_euclid(1.0) } else { 0.0 };
            ((wrapped * size as f32) as u32).min(size - 1)
        };
        let [r, g, b, a] = pixels.get_pixel(texel(uv[0], width), texel(uv[1], height)).0;
        Ok(Color::rgba(r, g, b, a))
    }

    fn unload_texture(&mut self, texture: Texture) {
        if self.live_textures.remove(&texture.id).is_none() {
            warn!(id = texture.id, path = %texture.path, "unloading unknown texture");
        }
    }
}
