//! Render traversal
//!
//! Walks the frame's [`WorldTransforms`] in pre-order and issues one draw
//! per mesh node. Geometry is only rebound when it differs from the
//! previous draw's. A node with bad geometry is skipped with a warning;
//! its children are still drawn.

use crate::foundation::color::Color;
use crate::foundation::math::Mat4;
use crate::scene::{NodeKind, SceneGraph, WorldTransforms};

use super::backend::{GeometryHandle, GpuBackend, RenderError};
use super::camera::Camera;

/// Per-frame draw counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw calls issued
    pub drawn: usize,
    /// Mesh nodes skipped because of invalid geometry or backend errors
    pub skipped: usize,
    /// Geometry binds issued
    pub binds: usize,
}

/// Draws a scene graph through a [`GpuBackend`]
#[derive(Debug, Default)]
pub struct RenderTraversal {
    last_stats: FrameStats,
}

impl RenderTraversal {
    /// Create a traversal
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters from the most recent [`render`](Self::render)
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Draw every mesh node reachable this frame
    ///
    /// Errors are handled per node and never abort the frame.
    pub fn render(
        &mut self,
        graph: &SceneGraph,
        world: &WorldTransforms,
        camera: &Camera,
        backend: &mut dyn GpuBackend,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        let mut bound: Option<GeometryHandle> = None;
        let view_projection = camera.view_projection();

        for &handle in world.order() {
            let Ok(node) = graph.node(handle) else {
                continue;
            };
            let NodeKind::Mesh(geometry) = node.kind else {
                continue;
            };
            let Some(world_matrix) = world.get(handle) else {
                continue;
            };

            let result = draw_mesh(backend, geometry, &mut bound, world_matrix, view_projection, node.color);

            match result {
                Ok(rebound) => {
                    stats.drawn += 1;
                    stats.binds += usize::from(rebound);
                }
                Err(err) => {
                    log::warn!("Skipping node '{}' ({:?}): {}", node.name(), handle, err);
                    stats.skipped += 1;
                }
            }
        }

        log::trace!(
            "Frame drawn: {} draw(s), {} bind(s), {} skipped",
            stats.drawn,
            stats.binds,
            stats.skipped
        );
        self.last_stats = stats;
        stats
    }
}

/// Bind if needed, set uniforms and draw; returns whether a bind was issued
fn draw_mesh(
    backend: &mut dyn GpuBackend,
    geometry: GeometryHandle,
    bound: &mut Option<GeometryHandle>,
    world: &Mat4,
    view_projection: &Mat4,
    tint: Color,
) -> Result<bool, RenderError> {
    let index_count = backend
        .index_count(geometry)
        .filter(|_| backend.is_valid(geometry))
        .ok_or(RenderError::InvalidGeometry(geometry))?;

    let rebound = *bound != Some(geometry);
    if rebound {
        *bound = None;
        backend.bind_geometry(geometry)?;
        *bound = Some(geometry);
    }
    backend.set_uniforms(world, view_projection, tint)?;
    backend.draw_indexed(index_count)?;
    Ok(rebound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use crate::render::primitives;
    use crate::render::{RecordedCommand, RecordingBackend, UniformValue};
    use crate::scene::{NodeDesc, TransformPropagator};
    use approx::assert_relative_eq;

    fn backend_with_quad() -> (RecordingBackend, GeometryHandle) {
        let mut backend = RecordingBackend::new();
        let quad = primitives::quad();
        let handle = backend.upload_geometry(&quad.vertices, &quad.indices).unwrap();
        (backend, handle)
    }

    fn draw(graph: &SceneGraph, backend: &mut RecordingBackend) -> FrameStats {
        let world = TransformPropagator::new().propagate(graph);
        RenderTraversal::new().render(graph, &world, &Camera::default(), backend)
    }

    #[test]
    fn test_shared_geometry_is_bound_once() {
        let (mut backend, quad) = backend_with_quad();
        let mut graph = SceneGraph::new();
        let root = graph.create_node(NodeDesc::mesh("A", quad));
        graph.create_child(root, NodeDesc::mesh("B", quad)).unwrap();
        graph.create_node(NodeDesc::mesh("C", quad));

        let stats = draw(&graph, &mut backend);

        assert_eq!(stats, FrameStats { drawn: 3, skipped: 0, binds: 1 });
        assert_eq!(backend.draw_count(), 3);
        assert_eq!(backend.bind_count(), 1);
    }

    #[test]
    fn test_alternating_geometry_rebinds() {
        let (mut backend, quad) = backend_with_quad();
        let cube = primitives::cube();
        let cube = backend.upload_geometry(&cube.vertices, &cube.indices).unwrap();
        let mut graph = SceneGraph::new();
        graph.create_node(NodeDesc::mesh("Q1", quad));
        graph.create_node(NodeDesc::mesh("C1", cube));
        graph.create_node(NodeDesc::mesh("Q2", quad));

        let stats = draw(&graph, &mut backend);

        assert_eq!(stats.binds, 3);
        let draws: Vec<_> = backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::Draw { geometry, index_count } => Some((*geometry, *index_count)),
                _ => None,
            })
            .collect();
        assert_eq!(draws, vec![(quad, 6), (cube, 36), (quad, 6)]);
    }

    #[test]
    fn test_invalid_geometry_skips_node_but_draws_children() {
        let (mut backend, quad) = backend_with_quad();
        let mut graph = SceneGraph::new();
        let broken = graph.create_node(NodeDesc::mesh("Broken", GeometryHandle(42)));
        graph.create_child(broken, NodeDesc::mesh("Child", quad)).unwrap();

        let stats = draw(&graph, &mut backend);

        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_group_nodes_issue_no_draws() {
        let (mut backend, quad) = backend_with_quad();
        let mut graph = SceneGraph::new();
        let group = graph.create_node(NodeDesc::new("Group"));
        graph.create_child(group, NodeDesc::mesh("Leaf", quad)).unwrap();

        let stats = draw(&graph, &mut backend);

        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_world_matrix_and_tint_reach_backend() {
        let (mut backend, quad) = backend_with_quad();
        let mut graph = SceneGraph::new();
        let root = graph.create_node(NodeDesc::new("Root").with_position(Vec3::new(1.0, 3.0, 0.0)));
        let tint = Color::rgb(1.0, 0.0, 0.0);
        graph
            .create_child(
                root,
                NodeDesc::mesh("Quad", quad)
                    .with_position(Vec3::new(1.0, 0.0, 0.0))
                    .with_color(tint),
            )
            .unwrap();

        draw(&graph, &mut backend);

        let mut model = None;
        let mut colour = None;
        for command in backend.commands() {
            if let RecordedCommand::Uniform { name, value } = command {
                match (name.as_str(), value) {
                    ("u_model", UniformValue::Mat4(m)) => model = Some(*m),
                    ("u_colour", UniformValue::Vec4(c)) => colour = Some(*c),
                    _ => {}
                }
            }
        }
        let model: Mat4 = model.unwrap();
        assert_relative_eq!(model.translation_part(), Vec3::new(2.0, 3.0, 0.0), epsilon = 1e-5);
        assert_eq!(colour.unwrap(), tint.to_vec4());
    }

    #[test]
    fn test_last_stats_tracks_most_recent_frame() {
        let (mut backend, quad) = backend_with_quad();
        let mut graph = SceneGraph::new();
        graph.create_node(NodeDesc::mesh("Quad", quad));
        let world = TransformPropagator::new().propagate(&graph);
        let mut traversal = RenderTraversal::new();

        traversal.render(&graph, &world, &Camera::default(), &mut backend);

        assert_eq!(traversal.last_stats().drawn, 1);
    }
}
