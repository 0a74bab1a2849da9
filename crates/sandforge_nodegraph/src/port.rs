// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::value::{Value, ValueKind};
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// A named, typed slot on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Declared value kind
    pub kind: ValueKind,
    /// Value used when an input has no incoming connection
    pub default_value: Option<Value>,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Input,
            kind,
            default_value: None,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Output,
            kind,
            default_value: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Whether an unconnected input can still be resolved
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }
}
