// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constant nodes shared by every graph type.
//!
//! A constant keeps its value as the default of its single input, so the
//! editor edits it like any other unconnected port and a connection can
//! still override it.

use crate::error::NodeError;
use crate::evaluation::ExecutionContext;
use crate::node::{NodeBehavior, NodeCategory};
use crate::port::Port;
use crate::registry::{boxed, NodeKind, NodeRegistry};
use crate::value::{Inputs, Value, ValueKind};

/// Float constant
#[derive(Debug, Default)]
pub struct FloatConstant;

impl NodeBehavior for FloatConstant {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Float(Inputs::exact(inputs, 1)?.float(0)?)])
    }
}

/// Integer constant
#[derive(Debug, Default)]
pub struct IntConstant;

impl NodeBehavior for IntConstant {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Int(Inputs::exact(inputs, 1)?.int(0)?)])
    }
}

/// Vector constant
#[derive(Debug, Default)]
pub struct Vector3Constant;

impl NodeBehavior for Vector3Constant {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Vector3(Inputs::exact(inputs, 1)?.vector3(0)?)])
    }
}

/// Color constant
#[derive(Debug, Default)]
pub struct ColorConstant;

impl NodeBehavior for ColorConstant {
    fn execute(&self, inputs: &[Value], _ctx: &mut ExecutionContext<'_>) -> Result<Vec<Value>, NodeError> {
        Ok(vec![Value::Color(Inputs::exact(inputs, 1)?.color(0)?)])
    }
}

/// Register the constant node kinds
pub fn register_common_nodes(registry: &mut NodeRegistry) {
    registry.register(NodeKind {
        name: "Float".to_string(),
        category: NodeCategory::Input,
        description: "Constant float value".to_string(),
        inputs: vec![Port::input("Value", ValueKind::Float).with_default(Value::Float(0.0))],
        outputs: vec![Port::output("Value", ValueKind::Float)],
        factory: boxed::<FloatConstant>,
    });

    registry.register(NodeKind {
        name: "Int".to_string(),
        category: NodeCategory::Input,
        description: "Constant integer value".to_string(),
        inputs: vec![Port::input("Value", ValueKind::Int).with_default(Value::Int(0))],
        outputs: vec![Port::output("Value", ValueKind::Int)],
        factory: boxed::<IntConstant>,
    });

    registry.register(NodeKind {
        name: "Vector3".to_string(),
        category: NodeCategory::Input,
        description: "Constant 3D vector value".to_string(),
        inputs: vec![Port::input("Vector", ValueKind::Vector3).with_default(Value::Vector3([0.0; 3]))],
        outputs: vec![Port::output("Vector", ValueKind::Vector3)],
        factory: boxed::<Vector3Constant>,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SoftwareBackend;
    use crate::graph::Graph;
    use crate::registry::create_default_registry;

    #[test]
    fn test_constant_echoes_its_default() {
        let registry = create_default_registry();
        let mut graph = Graph::new("constants");
        let id = registry.instantiate(&mut graph, "Vector3").unwrap();
        graph
            .set_input_default(id, 0, Some(Value::Vector3([1.0, 2.0, 3.0])))
            .unwrap();

        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        assert_eq!(
            graph.execute_node(id, &mut ctx).unwrap(),
            vec![Value::Vector3([1.0, 2.0, 3.0])]
        );
    }

    #[test]
    fn test_constant_rejects_other_kinds() {
        let mut backend = SoftwareBackend::new();
        let mut ctx = ExecutionContext::new(&mut backend);
        let result = IntConstant.execute(&[Value::Float(1.0)], &mut ctx);
        assert!(matches!(
            result,
            Err(NodeError::InvalidInputType { expected: ValueKind::Int, actual: ValueKind::Float, .. })
        ));

        let result = ColorConstant.execute(&[Value::Vector3([0.0; 3])], &mut ctx);
        assert!(matches!(
            result,
            Err(NodeError::InvalidInputType { expected: ValueKind::Color, actual: ValueKind::Vector3, .. })
        ));

        let result = Vector3Constant.execute(&[Value::Opaque("x".to_string())], &mut ctx);
        assert!(matches!(
            result,
            Err(NodeError::InvalidInputType { expected: ValueKind::Vector3, actual: ValueKind::Opaque, .. })
        ));
    }
}
