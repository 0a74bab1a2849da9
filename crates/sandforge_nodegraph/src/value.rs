// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values that flow between node ports.

use crate::error::NodeError;
use crate::mesh::{Mesh, Texture};
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;
use std::fmt;

/// Data kind that can flow through ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Floating point value
    Float,
    /// Integer value
    Int,
    /// 3D vector
    Vector3,
    /// Triangle mesh
    Mesh,
    /// Texture handle
    Texture,
    /// Color (8-bit RGBA)
    Color,
    /// Opaque string payload for custom data
    Opaque,
}

impl ValueKind {
    /// Display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Vector3 => "Vector3",
            Self::Mesh => "Mesh",
            Self::Texture => "Texture",
            Self::Color => "Color",
            Self::Opaque => "Opaque",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Create a color from its channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Linearly interpolate towards `other`, rounding each channel.
    ///
    /// `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round() as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Channels normalized to `[0, 1]`
    pub fn to_normalized(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Value produced or consumed by a node.
///
/// Values are immutable once produced. Heap-backed payloads (mesh buffers)
/// belong to whoever holds the value; GPU handles inside them must be handed
/// back to the graphics backend by that owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Float
    Float(f32),
    /// Integer
    Int(i32),
    /// 3D vector
    Vector3([f32; 3]),
    /// Mesh
    Mesh(Mesh),
    /// Texture handle
    Texture(Texture),
    /// Color
    Color(Color),
    /// Opaque string
    Opaque(String),
}

impl Value {
    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Float(_) => ValueKind::Float,
            Self::Int(_) => ValueKind::Int,
            Self::Vector3(_) => ValueKind::Vector3,
            Self::Mesh(_) => ValueKind::Mesh,
            Self::Texture(_) => ValueKind::Texture,
            Self::Color(_) => ValueKind::Color,
            Self::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// Clone this value, failing instead of aborting when a mesh copy
    /// cannot be allocated
    pub fn try_clone(&self) -> Result<Self, TryReserveError> {
        Ok(match self {
            Self::Mesh(mesh) => Self::Mesh(mesh.try_clone()?),
            other => other.clone(),
        })
    }

    /// Borrow the float payload
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the integer payload
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the vector payload
    pub fn as_vector3(&self) -> Option<[f32; 3]> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow the mesh payload
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Self::Mesh(m) => Some(m),
            _ => None,
        }
    }

    /// Take the mesh payload
    pub fn into_mesh(self) -> Option<Mesh> {
        match self {
            Self::Mesh(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the texture payload
    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            Self::Texture(t) => Some(t),
            _ => None,
        }
    }

    /// Borrow the color payload
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Borrow the opaque payload
    pub fn as_opaque(&self) -> Option<&str> {
        match self {
            Self::Opaque(s) => Some(s),
            _ => None,
        }
    }
}

/// Typed access to a slice of resolved inputs.
///
/// Every accessor checks the variant tag and fails with
/// [`NodeError::InvalidInputType`] instead of coercing.
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    values: &'a [Value],
}

impl<'a> Inputs<'a> {
    /// Wrap `values`, failing unless exactly `expected` are present
    pub fn exact(values: &'a [Value], expected: usize) -> Result<Self, NodeError> {
        if values.len() != expected {
            return Err(NodeError::InvalidInputCount {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    fn get(&self, index: usize) -> Result<&'a Value, NodeError> {
        self.values.get(index).ok_or(NodeError::InvalidInputCount {
            expected: index + 1,
            actual: self.values.len(),
        })
    }

    fn mismatch(index: usize, expected: ValueKind, value: &Value) -> NodeError {
        NodeError::InvalidInputType {
            index,
            expected,
            actual: value.kind(),
        }
    }

    /// Float input at `index`
    pub fn float(&self, index: usize) -> Result<f32, NodeError> {
        let value = self.get(index)?;
        value
            .as_float()
            .ok_or_else(|| Self::mismatch(index, ValueKind::Float, value))
    }

    /// Integer input at `index`
    pub fn int(&self, index: usize) -> Result<i32, NodeError> {
        let value = self.get(index)?;
        value
            .as_int()
            .ok_or_else(|| Self::mismatch(index, ValueKind::Int, value))
    }

    /// Vector input at `index`
    pub fn vector3(&self, index: usize) -> Result<[f32; 3], NodeError> {
        let value = self.get(index)?;
        value
            .as_vector3()
            .ok_or_else(|| Self::mismatch(index, ValueKind::Vector3, value))
    }

    /// Mesh input at `index`
    pub fn mesh(&self, index: usize) -> Result<&'a Mesh, NodeError> {
        let value = self.get(index)?;
        value
            .as_mesh()
            .ok_or_else(|| Self::mismatch(index, ValueKind::Mesh, value))
    }

    /// Texture input at `index`
    pub fn texture(&self, index: usize) -> Result<&'a Texture, NodeError> {
        let value = self.get(index)?;
        value
            .as_texture()
            .ok_or_else(|| Self::mismatch(index, ValueKind::Texture, value))
    }

    /// Color input at `index`
    pub fn color(&self, index: usize) -> Result<Color, NodeError> {
        let value = self.get(index)?;
        value
            .as_color()
            .ok_or_else(|| Self::mismatch(index, ValueKind::Color, value))
    }

    /// Opaque string input at `index`
    pub fn opaque(&self, index: usize) -> Result<&'a str, NodeError> {
        let value = self.get(index)?;
        value
            .as_opaque()
            .ok_or_else(|| Self::mismatch(index, ValueKind::Opaque, value))
    }
}
