//! Scene nodes
//!
//! A node is pure data: display name, tint, local transform and what kind
//! of thing it draws. Its parent/child links are owned by the
//! [`SceneGraph`](super::SceneGraph) and can only be changed through it, so
//! the tree invariants live in one place.

use slotmap::new_key_type;

use crate::foundation::color::Color;
use crate::foundation::math::{Transform, Vec3};
use crate::render::GeometryHandle;

new_key_type! {
    /// Generational handle to a node in a [`SceneGraph`](super::SceneGraph)
    ///
    /// Removing a node bumps its slot's generation, so an old handle is
    /// detected as dangling instead of aliasing a newer node.
    pub struct NodeHandle;
}

/// Maximum length of a node name in bytes
pub const MAX_NAME_LEN: usize = 63;

/// What a node contributes to rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Transform-only grouping node, never drawn
    #[default]
    Group,
    /// Draws the referenced geometry with the node's world transform and tint
    Mesh(GeometryHandle),
}

impl NodeKind {
    /// Short label used by inspectors
    pub fn label(&self) -> &'static str {
        match self {
            Self::Group => "Group",
            Self::Mesh(_) => "Mesh",
        }
    }

    /// Geometry to draw, if any
    pub fn geometry(&self) -> Option<GeometryHandle> {
        match self {
            Self::Group => None,
            Self::Mesh(handle) => Some(*handle),
        }
    }
}

/// One entity in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,

    /// RGBA tint passed to the draw call
    pub color: Color,

    /// Transform relative to the parent
    pub transform: Transform,

    /// Rendering role
    pub kind: NodeKind,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
}

impl Node {
    pub(crate) fn from_desc(desc: NodeDesc) -> Self {
        Self {
            name: bounded_name(&desc.name),
            color: desc.color,
            transform: desc.transform,
            kind: desc.kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename, truncating to [`MAX_NAME_LEN`] bytes on a char boundary
    pub fn set_name(&mut self, name: &str) {
        self.name = bounded_name(name);
    }

    /// Parent handle, `None` for roots
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}

/// Initial display data for a new node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDesc {
    /// Display name
    pub name: String,
    /// Tint
    pub color: Color,
    /// Local transform
    pub transform: Transform,
    /// Rendering role
    pub kind: NodeKind,
}

impl Default for NodeDesc {
    fn default() -> Self {
        Self {
            name: "Object".to_string(),
            color: Color::WHITE,
            transform: Transform::identity(),
            kind: NodeKind::Group,
        }
    }
}

impl NodeDesc {
    /// Describe a group node with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Describe a node drawing `geometry`
    pub fn mesh(name: impl Into<String>, geometry: GeometryHandle) -> Self {
        Self::new(name).with_kind(NodeKind::Mesh(geometry))
    }

    /// Set the local position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Set the local euler rotation in degrees
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Set the local scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Set the tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the rendering role
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }
}

fn bounded_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name.to_string();
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}
