//! Editable node snapshots and selection

use crate::foundation::color::Color;
use crate::foundation::math::Vec3;
use crate::scene::{NodeHandle, NodeKind, SceneGraph, SceneResult};

/// Editable fields of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeProperties {
    /// Display name
    pub name: String,
    /// Tint
    pub color: Color,
    /// Local position
    pub position: Vec3,
    /// Local euler rotation in degrees
    pub rotation: Vec3,
    /// Local scale
    pub scale: Vec3,
    /// Rendering role
    pub kind: NodeKind,
}

impl NodeProperties {
    /// Snapshot the editable fields of `node`
    pub fn read(graph: &SceneGraph, node: NodeHandle) -> SceneResult<Self> {
        let data = graph.node(node)?;
        Ok(Self {
            name: data.name().to_string(),
            color: data.color,
            position: data.transform.position,
            rotation: data.transform.rotation,
            scale: data.transform.scale,
            kind: data.kind,
        })
    }

    /// Write every field back to `node`
    pub fn apply(&self, graph: &mut SceneGraph, node: NodeHandle) -> SceneResult<()> {
        let data = graph.node_mut(node)?;
        data.set_name(&self.name);
        data.color = self.color;
        data.transform.position = self.position;
        data.transform.rotation = self.rotation;
        data.transform.scale = self.scale;
        data.kind = self.kind;
        log::trace!("Applied properties to {node:?}");
        Ok(())
    }

    /// Whether the node draws anything
    pub fn is_renderable(&self) -> bool {
        self.kind.geometry().is_some()
    }
}

/// Currently selected node, if it still exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<NodeHandle>,
}

impl Selection {
    /// Empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `node`; fails if it is dangling
    pub fn select(&mut self, graph: &SceneGraph, node: NodeHandle) -> SceneResult<()> {
        graph.node(node)?;
        self.selected = Some(node);
        Ok(())
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Selected node, clearing the selection if it was removed
    pub fn get(&mut self, graph: &SceneGraph) -> Option<NodeHandle> {
        if self.selected.is_some_and(|node| !graph.contains(node)) {
            log::debug!("Selected node {:?} was removed, clearing selection", self.selected);
            self.selected = None;
        }
        self.selected
    }

    /// Properties of the selected node
    pub fn properties(&mut self, graph: &SceneGraph) -> Option<NodeProperties> {
        let node = self.get(graph)?;
        NodeProperties::read(graph, node).ok()
    }
}
