//! World-transform propagation
//!
//! Walks the graph depth-first (pre-order) from every root and composes
//! `world = parent_world * T * Rx * Ry * Rz * S` for each node. The result
//! is a per-frame [`WorldTransforms`] table; nothing is cached between
//! frames because any local transform may have changed.

use slotmap::SecondaryMap;

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

use super::node::NodeHandle;
use super::scene_graph::SceneGraph;

/// World matrices for one frame, plus the pre-order they were visited in
#[derive(Debug, Default)]
pub struct WorldTransforms {
    matrices: SecondaryMap<NodeHandle, Mat4>,
    order: Vec<NodeHandle>,
}

impl WorldTransforms {
    /// World matrix of `node`, if it was reachable this frame
    pub fn get(&self, node: NodeHandle) -> Option<&Mat4> {
        self.matrices.get(node)
    }

    /// World-space translation of `node`
    pub fn translation_of(&self, node: NodeHandle) -> Option<Vec3> {
        self.get(node).map(Mat4Ext::translation_part)
    }

    /// Nodes in depth-first pre-order
    pub fn order(&self) -> &[NodeHandle] {
        &self.order
    }

    /// Number of nodes with a world matrix
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing was propagated
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Computes [`WorldTransforms`] from a [`SceneGraph`]
///
/// Holds a scratch stack so per-frame propagation does not reallocate it.
#[derive(Debug, Default)]
pub struct TransformPropagator {
    stack: Vec<(NodeHandle, Mat4)>,
}

impl TransformPropagator {
    /// Create a propagator
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute world matrices for every node reachable from a root
    pub fn propagate(&mut self, graph: &SceneGraph) -> WorldTransforms {
        let mut out = WorldTransforms {
            matrices: SecondaryMap::with_capacity(graph.len()),
            order: Vec::with_capacity(graph.len()),
        };

        for &root in graph.roots() {
            self.stack.clear();
            self.stack.push((root, Mat4::identity()));

            while let Some((handle, parent_world)) = self.stack.pop() {
                let Ok(node) = graph.node(handle) else {
                    continue;
                };
                let world = parent_world * node.transform.to_matrix();
                out.matrices.insert(handle, world);
                out.order.push(handle);

                // Reverse so the first child is popped first
                for &child in node.children().iter().rev() {
                    self.stack.push((child, world));
                }
            }
        }

        log::trace!("Propagated {} world transform(s)", out.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec3};
    use crate::scene::NodeDesc;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_translation_chain_sums() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node(NodeDesc::new("Root").with_position(Vec3::new(1.0, 0.0, 0.0)));
        let a = graph
            .create_child(root, NodeDesc::new("A").with_position(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        let b = graph
            .create_child(a, NodeDesc::new("B").with_position(Vec3::new(0.0, 0.0, 1.0)))
            .unwrap();

        let world = TransformPropagator::new().propagate(&graph);

        assert_relative_eq!(world.translation_of(b).unwrap(), Vec3::new(1.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_parent_rotation_and_scale_apply_to_child_offset() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node(
            NodeDesc::new("Parent")
                .with_rotation(Vec3::new(0.0, 0.0, 90.0))
                .with_scale(Vec3::new(2.0, 2.0, 1.0)),
        );
        let child = graph
            .create_child(parent, NodeDesc::new("Child").with_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();

        let world = TransformPropagator::new().propagate(&graph);

        // Child offset (1,0,0) is scaled to (2,0,0) then rotated onto +Y
        assert_relative_eq!(world.translation_of(child).unwrap(), Vec3::new(0.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_siblings_are_independent() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node(NodeDesc::new("Root"));
        let left = graph
            .create_child(root, NodeDesc::new("L").with_rotation(Vec3::new(0.0, 0.0, 45.0)))
            .unwrap();
        let right = graph
            .create_child(root, NodeDesc::new("R").with_position(Vec3::new(3.0, 0.0, 0.0)))
            .unwrap();

        let world = TransformPropagator::new().propagate(&graph);

        assert_relative_eq!(world.translation_of(left).unwrap(), Vec3::zeros(), epsilon = EPSILON);
        let right_world = world.get(right).unwrap();
        let p = right_world.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(4.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_order_is_pre_order_across_roots() {
        let mut graph = SceneGraph::new();
        let r1 = graph.create_node(NodeDesc::new("R1"));
        let c1 = graph.create_child(r1, NodeDesc::new("C1")).unwrap();
        let c1a = graph.create_child(c1, NodeDesc::new("C1a")).unwrap();
        let c2 = graph.create_child(r1, NodeDesc::new("C2")).unwrap();
        let r2 = graph.create_node(NodeDesc::new("R2"));

        let world = TransformPropagator::new().propagate(&graph);

        assert_eq!(world.order(), &[r1, c1, c1a, c2, r2]);
        assert_eq!(world.len(), graph.len());
    }

    #[test]
    fn test_removed_nodes_have_no_world_matrix() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node(NodeDesc::new("Root"));
        let child = graph.create_child(root, NodeDesc::new("Child")).unwrap();
        graph.remove(child).unwrap();

        let world = TransformPropagator::new().propagate(&graph);

        assert!(world.get(child).is_none());
        assert!(world.get(root).is_some());
    }
}
