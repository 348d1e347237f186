//! Arena-backed scene graph
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeHandle`].
//! The graph is the only place that edits parent/child links, and every
//! mutating operation either completes fully or leaves the tree untouched.
//!
//! Invariants maintained after every public call:
//! - if `c` is in `p.children` then `c.parent == Some(p)`, and vice versa
//! - a node is in exactly one of: the root list, one parent's children
//! - no node is its own ancestor

use slotmap::SlotMap;
use thiserror::Error;

use crate::foundation::color::Color;
use crate::foundation::math::{Transform, Vec3};

use super::node::{Node, NodeDesc, NodeHandle, NodeKind};

/// Scene graph errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The attach would make a node its own ancestor; nothing was changed
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Requested parent
        parent: NodeHandle,
        /// Requested child
        child: NodeHandle,
    },

    /// The handle refers to a node that was removed
    #[error("node handle {0:?} is dangling")]
    DanglingHandle(NodeHandle),
}

/// Result type for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Forest of nodes with ordered roots
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, Node>,
    roots: Vec<NodeHandle>,
}

impl SceneGraph {
    /// Create an empty scene graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new unparented node; it is appended to the root list
    pub fn create_node(&mut self, desc: NodeDesc) -> NodeHandle {
        let handle = self.nodes.insert(Node::from_desc(desc));
        self.roots.push(handle);
        log::trace!("Created node {:?} '{}'", handle, self.nodes[handle].name());
        handle
    }

    /// Create a node and attach it under `parent` in one step
    pub fn create_child(&mut self, parent: NodeHandle, desc: NodeDesc) -> SceneResult<NodeHandle> {
        self.ensure_live(parent)?;
        let handle = self.nodes.insert(Node::from_desc(desc));
        self.link(parent, handle);
        Ok(handle)
    }

    /// Move `child` under `parent`
    ///
    /// Detaches `child` from any previous parent first. Attaching to the
    /// current parent is a no-op that keeps sibling order. Fails with
    /// [`SceneError::Cycle`] when `parent` is `child` or one of its
    /// descendants; the tree is left unchanged in that case.
    pub fn attach(&mut self, parent: NodeHandle, child: NodeHandle) -> SceneResult<()> {
        self.ensure_live(parent)?;
        self.ensure_live(child)?;

        if parent == child || self.is_ancestor(child, parent) {
            log::warn!("Refused to attach {child:?} under {parent:?}: would create a cycle");
            return Err(SceneError::Cycle { parent, child });
        }

        if self.nodes[child].parent == Some(parent) {
            return Ok(());
        }

        self.unlink(child);
        self.link(parent, child);
        log::trace!("Attached {child:?} under {parent:?}");
        Ok(())
    }

    /// Detach `node` from its parent and make it a root; no-op for roots
    pub fn detach(&mut self, node: NodeHandle) -> SceneResult<()> {
        self.ensure_live(node)?;
        if self.nodes[node].parent.is_none() {
            return Ok(());
        }
        self.unlink(node);
        self.roots.push(node);
        log::trace!("Detached {node:?}");
        Ok(())
    }

    /// Move `node` under `new_parent`, or to the root list for `None`
    ///
    /// Validation happens before any link is touched, so observers never
    /// see `node` parked as a root halfway through a move.
    pub fn reparent(&mut self, node: NodeHandle, new_parent: Option<NodeHandle>) -> SceneResult<()> {
        match new_parent {
            Some(parent) => self.attach(parent, node),
            None => self.detach(node),
        }
    }

    /// Detach `node` and release it together with its whole subtree
    ///
    /// Returns how many nodes were released. Every handle into the subtree
    /// becomes dangling.
    pub fn remove(&mut self, node: NodeHandle) -> SceneResult<usize> {
        let doomed = self.descendants(node)?;
        self.unlink(node);
        for handle in &doomed {
            self.nodes.remove(*handle);
        }
        log::debug!("Removed {node:?} and {} descendant(s)", doomed.len() - 1);
        Ok(doomed.len())
    }

    /// First direct child of `parent` named `name`
    ///
    /// Shallow: grandchildren are not searched.
    pub fn find(&self, parent: NodeHandle, name: &str) -> SceneResult<Option<NodeHandle>> {
        Ok(self
            .children(parent)?
            .iter()
            .copied()
            .find(|child| self.nodes[*child].name() == name))
    }

    /// All direct children of `parent` named `name`, in sibling order
    pub fn find_all(&self, parent: NodeHandle, name: &str) -> SceneResult<Vec<NodeHandle>> {
        Ok(self
            .children(parent)?
            .iter()
            .copied()
            .filter(|child| self.nodes[*child].name() == name)
            .collect())
    }

    /// First root named `name`
    pub fn find_root(&self, name: &str) -> Option<NodeHandle> {
        self.roots.iter().copied().find(|root| self.nodes[*root].name() == name)
    }

    /// Root nodes in insertion order
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// Children of `node` in insertion order
    pub fn children(&self, node: NodeHandle) -> SceneResult<&[NodeHandle]> {
        Ok(self.node(node)?.children())
    }

    /// Parent of `node`, `None` for roots
    pub fn parent(&self, node: NodeHandle) -> SceneResult<Option<NodeHandle>> {
        Ok(self.node(node)?.parent())
    }

    /// `node` followed by its descendants in depth-first pre-order
    pub fn descendants(&self, node: NodeHandle) -> SceneResult<Vec<NodeHandle>> {
        self.ensure_live(node)?;
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current].children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Whether `node` refers to a live node
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Release every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Iterate over all live nodes in arena order
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    /// Borrow a node
    pub fn node(&self, node: NodeHandle) -> SceneResult<&Node> {
        self.nodes.get(node).ok_or(SceneError::DanglingHandle(node))
    }

    /// Mutably borrow a node's data; links stay graph-managed
    pub fn node_mut(&mut self, node: NodeHandle) -> SceneResult<&mut Node> {
        self.nodes.get_mut(node).ok_or(SceneError::DanglingHandle(node))
    }

    /// Rename a node
    pub fn set_name(&mut self, node: NodeHandle, name: &str) -> SceneResult<()> {
        self.node_mut(node)?.set_name(name);
        Ok(())
    }

    /// Set a node's tint
    pub fn set_color(&mut self, node: NodeHandle, color: Color) -> SceneResult<()> {
        self.node_mut(node)?.color = color;
        Ok(())
    }

    /// Set a node's local position
    pub fn set_position(&mut self, node: NodeHandle, position: Vec3) -> SceneResult<()> {
        self.node_mut(node)?.transform.position = position;
        Ok(())
    }

    /// Set a node's local euler rotation in degrees
    pub fn set_rotation(&mut self, node: NodeHandle, rotation: Vec3) -> SceneResult<()> {
        self.node_mut(node)?.transform.rotation = rotation;
        Ok(())
    }

    /// Set a node's local scale
    pub fn set_scale(&mut self, node: NodeHandle, scale: Vec3) -> SceneResult<()> {
        self.node_mut(node)?.transform.scale = scale;
        Ok(())
    }

    /// Replace a node's whole local transform
    pub fn set_transform(&mut self, node: NodeHandle, transform: Transform) -> SceneResult<()> {
        self.node_mut(node)?.transform = transform;
        Ok(())
    }

    /// Set a node's rendering role
    pub fn set_kind(&mut self, node: NodeHandle, kind: NodeKind) -> SceneResult<()> {
        self.node_mut(node)?.kind = kind;
        Ok(())
    }

    /// Check every structural invariant, describing the first violation
    pub fn verify_integrity(&self) -> Result<(), String> {
        let mut seen = slotmap::SecondaryMap::<NodeHandle, ()>::new();

        for &root in &self.roots {
            let node = self.nodes.get(root).ok_or_else(|| format!("root {root:?} is dangling"))?;
            if node.parent.is_some() {
                return Err(format!("root {root:?} has a parent"));
            }
            let mut stack = vec![root];
            while let Some(current) = stack.pop() {
                if seen.insert(current, ()).is_some() {
                    return Err(format!("{current:?} is reachable twice"));
                }
                for &child in &self.nodes[current].children {
                    let child_node = self
                        .nodes
                        .get(child)
                        .ok_or_else(|| format!("{current:?} lists dangling child {child:?}"))?;
                    if child_node.parent != Some(current) {
                        return Err(format!("{child:?} is listed by {current:?} but points at {:?}", child_node.parent));
                    }
                    stack.push(child);
                }
            }
        }

        if seen.len() != self.nodes.len() {
            return Err(format!(
                "{} node(s) unreachable from the roots",
                self.nodes.len() - seen.len()
            ));
        }
        Ok(())
    }

    fn ensure_live(&self, node: NodeHandle) -> SceneResult<()> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(SceneError::DanglingHandle(node))
        }
    }

    /// Remove `node` from wherever it currently hangs (root list or parent)
    fn unlink(&mut self, node: NodeHandle) {
        match self.nodes[node].parent.take() {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.children.retain(|c| *c != node);
                }
            }
            None => self.roots.retain(|r| *r != node),
        }
    }

    /// Hang an unlinked `child` under `parent`
    fn link(&mut self, parent: NodeHandle, child: NodeHandle) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_chain() -> (SceneGraph, NodeHandle, NodeHandle, NodeHandle) {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(NodeDesc::new("A"));
        let b = graph.create_child(a, NodeDesc::new("B")).unwrap();
        let c = graph.create_child(b, NodeDesc::new("C")).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn test_create_node_is_unparented_root() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node(NodeDesc::new("Root"));

        assert_eq!(graph.roots(), &[node]);
        assert_eq!(graph.parent(node).unwrap(), None);
        assert!(graph.verify_integrity().is_ok());
    }

    #[test]
    fn test_attach_moves_between_parents() {
        let mut graph = SceneGraph::new();
        let p1 = graph.create_node(NodeDesc::new("P1"));
        let p2 = graph.create_node(NodeDesc::new("P2"));
        let child = graph.create_node(NodeDesc::new("Child"));

        graph.attach(p1, child).unwrap();
        graph.attach(p2, child).unwrap();

        assert!(graph.children(p1).unwrap().is_empty());
        assert_eq!(graph.children(p2).unwrap(), &[child]);
        assert_eq!(graph.roots(), &[p1, p2]);
        assert!(graph.verify_integrity().is_ok());
    }

    #[test]
    fn test_attach_to_current_parent_keeps_order() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node(NodeDesc::new("P"));
        let first = graph.create_child(parent, NodeDesc::new("1")).unwrap();
        let second = graph.create_child(parent, NodeDesc::new("2")).unwrap();

        graph.attach(parent, first).unwrap();

        assert_eq!(graph.children(parent).unwrap(), &[first, second]);
    }

    #[test]
    fn test_attach_self_is_cycle() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node(NodeDesc::new("N"));

        assert_eq!(
            graph.attach(node, node),
            Err(SceneError::Cycle { parent: node, child: node })
        );
        assert_eq!(graph.roots(), &[node]);
    }

    #[test]
    fn test_attach_under_descendant_is_cycle() {
        let (mut graph, a, _b, c) = graph_with_chain();
        assert!(matches!(graph.attach(c, a), Err(SceneError::Cycle { .. })));
        assert_eq!(graph.parent(a).unwrap(), None);
        assert!(graph.verify_integrity().is_ok());
    }

    #[test]
    fn test_detach_root_is_noop() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node(NodeDesc::new("N"));
        graph.detach(node).unwrap();
        assert_eq!(graph.roots(), &[node]);
    }

    #[test]
    fn test_detach_returns_node_to_roots() {
        let (mut graph, a, b, c) = graph_with_chain();
        graph.detach(b).unwrap();

        assert_eq!(graph.roots(), &[a, b]);
        assert!(graph.children(a).unwrap().is_empty());
        assert_eq!(graph.children(b).unwrap(), &[c]);
        assert!(graph.verify_integrity().is_ok());
    }

    #[test]
    fn test_reparent_to_none_makes_root() {
        let (mut graph, a, b, _c) = graph_with_chain();
        graph.reparent(b, None).unwrap();
        assert_eq!(graph.roots(), &[a, b]);
    }

    #[test]
    fn test_remove_invalidates_subtree_handles() {
        let (mut graph, a, b, c) = graph_with_chain();
        let removed = graph.remove(b).unwrap();

        assert_eq!(removed, 2);
        assert!(graph.children(a).unwrap().is_empty());
        assert_eq!(graph.node(b), Err(SceneError::DanglingHandle(b)));
        assert_eq!(graph.node(c), Err(SceneError::DanglingHandle(c)));
        assert_eq!(graph.len(), 1);
        assert!(graph.verify_integrity().is_ok());
    }

    #[test]
    fn test_stale_handle_not_aliased_by_new_node() {
        let mut graph = SceneGraph::new();
        let old = graph.create_node(NodeDesc::new("Old"));
        graph.remove(old).unwrap();
        let new = graph.create_node(NodeDesc::new("New"));

        assert_ne!(old, new);
        assert_eq!(graph.set_name(old, "x"), Err(SceneError::DanglingHandle(old)));
        assert_eq!(graph.attach(new, old), Err(SceneError::DanglingHandle(old)));
        assert_eq!(graph.node(new).unwrap().name(), "New");
    }

    #[test]
    fn test_find_is_shallow() {
        let (mut graph, a, b, _c) = graph_with_chain();
        let other_b = graph.create_child(a, NodeDesc::new("B")).unwrap();

        assert_eq!(graph.find(a, "B").unwrap(), Some(b));
        assert_eq!(graph.find_all(a, "B").unwrap(), vec![b, other_b]);
        // C is a grandchild of A
        assert_eq!(graph.find(a, "C").unwrap(), None);
        assert_eq!(graph.find_root("A"), Some(a));
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node(NodeDesc::new("R"));
        let left = graph.create_child(root, NodeDesc::new("L")).unwrap();
        let left_leaf = graph.create_child(left, NodeDesc::new("LL")).unwrap();
        let right = graph.create_child(root, NodeDesc::new("Rt")).unwrap();

        assert_eq!(graph.descendants(root).unwrap(), vec![root, left, left_leaf, right]);
    }

    #[test]
    fn test_setters_update_node_data() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node(NodeDesc::new("N"));

        graph.set_position(node, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        graph.set_scale(node, Vec3::new(2.0, 2.0, 1.0)).unwrap();
        graph.set_color(node, Color::rgb(1.0, 0.0, 0.0)).unwrap();

        let data = graph.node(node).unwrap();
        assert_eq!(data.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(data.transform.scale, Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(data.color, Color::rgb(1.0, 0.0, 0.0));
    }
}
