// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material graph for procedural shading.
//!
//! Material nodes work on colors, floats and textures. Textures are loaded
//! by path and read back as colors through [`SampleTexture`]. The graph ends in a
//! [`PbrOutput`] sink, which has no outputs and instead records the resolved
//! material in the execution context.

use super::common::ColorConstant;
use crate::error::NodeError;
use crate::evaluation::ExecutionContext;
use crate::node::{NodeBehavior, NodeCategory};
use crate::port::Port;
use crate::registry::{boxed, NodeKind, NodeRegistry};
use crate::value::{Color, Inputs, Value, ValueKind};

/// Material produced by a PBR output sink
#[derive(Debug, Clone, PartialEq)]
pub struct PbrMaterial {
    /// Base color
    pub albedo: Color,
    /// Metalness in `[0, 1]`
    pub metallic: f32,
    /// Roughness in `[0, 1]`
    pub roughness: f32,
    /// Emitted color
    pub emission: Color,
    /// Ambient occlusion factor
    pub ambient_occlusion: f32,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            albedo: Color::WHITE,
            metallic: 0.0,
            roughness: 0.5,
            emission: Color::BLACK,
            ambient_occlusion: 1.0,
        }
    }
}

/// Loads a texture by path through the backend
#[derive(Debug, Default)]
pub struct TextureNode;

impl NodeBehavior for TextureNode {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 1)?;
        let texture = ctx.backend().load_texture(inputs.opaque(0)?)?;
        Ok(vec![Value::Texture(texture)])
    }
}

/// Reads the color of a texture at a UV coordinate.
///
/// The UV comes in as a vector; its `z` component is ignored.
#[derive(Debug, Default)]
pub struct SampleTexture;

impl NodeBehavior for SampleTexture {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 2)?;
        let texture = inputs.texture(0)?;
        let [u, v, _] = inputs.vector3(1)?;
        let color = ctx.backend().sample_texture(texture, [u, v])?;
        Ok(vec![Value::Color(color)])
    }
}

/// Blends two colors
#[derive(Debug, Default)]
pub struct Mix;

impl NodeBehavior for Mix {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 3)?;
        let a = inputs.color(0)?;
        let b = inputs.color(1)?;
        let factor = inputs.float(2)?;
        Ok(vec![Value::Color(a.lerp(b, factor))])
    }
}

/// Terminal PBR material sink
#[derive(Debug, Default)]
pub struct PbrOutput;

impl NodeBehavior for PbrOutput {
    fn execute(&self, inputs: &[Value], ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        let inputs = Inputs::exact(inputs, 5)?;
        ctx.set_material(PbrMaterial {
            albedo: inputs.color(0)?,
            metallic: inputs.float(1)?.clamp(0.0, 1.0),
            roughness: inputs.float(2)?.clamp(0.0, 1.0),
            emission: inputs.color(3)?,
            ambient_occlusion: inputs.float(4)?,
        });
        Ok(Vec::new())
    }
}

/// Register the material node kinds
pub fn register_material_nodes(registry: &mut NodeRegistry) {
    // ========================================================================
    // Inputs
    // ========================================================================

    registry.register(NodeKind {
        name: "Color".to_string(),
        category: NodeCategory::Material,
        description: "Constant color value".to_string(),
        inputs: vec![Port::input("Color", ValueKind::Color).with_default(Value::Color(Color::WHITE))],
        outputs: vec![Port::output("Color", ValueKind::Color)],
        factory: boxed::<ColorConstant>,
    });

    registry.register(NodeKind {
        name: "Texture".to_string(),
        category: NodeCategory::Material,
        description: "Texture loaded from a path".to_string(),
        inputs: vec![Port::input("Path", ValueKind::Opaque).with_default(Value::Opaque(String::new()))],
        outputs: vec![Port::output("Texture", ValueKind::Texture)],
        factory: boxed::<TextureNode>,
    });

    registry.register(NodeKind {
        name: "SampleTexture".to_string(),
        category: NodeCategory::Material,
        description: "Color of a texture at a UV coordinate".to_string(),
        inputs: vec![
            Port::input("Texture", ValueKind::Texture),
            Port::input("UV", ValueKind::Vector3).with_default(Value::Vector3([0.0; 3])),
        ],
        outputs: vec![Port::output("Color", ValueKind::Color)],
        factory: boxed::<SampleTexture>,
    });

    // ========================================================================
    // Operations
    // ========================================================================

    registry.register(NodeKind {
        name: "Mix".to_string(),
        category: NodeCategory::Material,
        description: "Linear blend from A to B".to_string(),
        inputs: vec![
            Port::input("A", ValueKind::Color).with_default(Value::Color(Color::BLACK)),
            Port::input("B", ValueKind::Color).with_default(Value::Color(Color::WHITE)),
            Port::input("Factor", ValueKind::Float).with_default(Value::Float(0.5)),
        ],
        outputs: vec![Port::output("Color", ValueKind::Color)],
        factory: boxed::<Mix>,
    });

    // ========================================================================
    // Output
    // ========================================================================

    let defaults = PbrMaterial::default();
    registry.register(NodeKind {
        name: "PbrOutput".to_string(),
        category: NodeCategory::Output,
        description: "Final PBR material output".to_string(),
        inputs: vec![
            Port::input("Albedo", ValueKind::Color).with_default(Value::Color(defaults.albedo)),
            Port::input("Metallic", ValueKind::Float).with_default(Value::Float(defaults.metallic)),
            Port::input("Roughness", ValueKind::Float).with_default(Value::Float(defaults.roughness)),
            Port::input("Emission", ValueKind::Color).with_default(Value::Color(defaults.emission)),
            Port::input("Ambient Occlusion", ValueKind::Float)
                .with_default(Value::Float(defaults.ambient_occlusion)),
        ],
        outputs: vec![],
        factory: boxed::<PbrOutput>,
    });
}

/// Create the material graph node registry with all available node kinds
pub fn create_material_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    super::common::register_common_nodes(&mut registry);
    register_material_nodes(&mut registry);
    registry
}
