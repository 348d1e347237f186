//! Scene management
//!
//! The scene is a forest of [`Node`]s owned by a [`SceneGraph`] arena.
//! Each frame the [`TransformPropagator`] turns local transforms into a
//! [`WorldTransforms`] table that the render traversal consumes.
//!
//! ```text
//! scripts / inspector / input
//!      ↓ (mutation API)
//! SceneGraph
//!      ↓
//! TransformPropagator → WorldTransforms
//!      ↓
//! RenderTraversal → GpuBackend
//! ```

mod node;
mod scene_graph;
mod transform_propagator;

#[cfg(test)]
mod tests;

pub use node::{Node, NodeDesc, NodeHandle, NodeKind, MAX_NAME_LEN};
pub use scene_graph::{SceneError, SceneGraph, SceneResult};
pub use transform_propagator::{TransformPropagator, WorldTransforms};
