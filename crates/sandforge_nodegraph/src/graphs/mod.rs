// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node libraries built on the core framework.

pub mod common;
pub mod geometry;
pub mod material;
