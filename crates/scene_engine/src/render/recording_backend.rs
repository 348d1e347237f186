//! In-memory backend that records every command
//!
//! Used by tests and the headless viewer in place of a real GPU device.
//! Geometry is validated on upload the same way a driver would reject it.

use crate::foundation::color::Color;

use super::backend::{GeometryHandle, GpuBackend, RenderError, RenderResult, UniformValue};
use super::primitives::Vertex;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// Frame clear
    Clear(Color),
    /// Geometry bind
    Bind(GeometryHandle),
    /// Uniform upload
    Uniform {
        /// Uniform name
        name: String,
        /// Uploaded value
        value: UniformValue,
    },
    /// Indexed draw of the bound geometry
    Draw {
        /// Geometry that was bound at draw time
        geometry: GeometryHandle,
        /// Number of indices drawn
        index_count: u32,
    },
}

#[derive(Debug, Clone)]
struct StoredGeometry {
    vertex_count: usize,
    index_count: u32,
}

/// [`GpuBackend`] that stores geometry metadata and logs commands
#[derive(Debug, Default)]
pub struct RecordingBackend {
    geometry: Vec<StoredGeometry>,
    bound: Option<GeometryHandle>,
    commands: Vec<RecordedCommand>,
}

impl RecordingBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since creation or the last [`take_commands`](Self::take_commands)
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Drain the recorded commands
    pub fn take_commands(&mut self) -> Vec<RecordedCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded draw calls
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::Draw { .. }))
            .count()
    }

    /// Number of recorded binds
    pub fn bind_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::Bind(_)))
            .count()
    }

    /// Number of uploaded geometries
    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }

    /// Vertex count of uploaded geometry
    pub fn vertex_count(&self, handle: GeometryHandle) -> Option<usize> {
        self.stored(handle).map(|g| g.vertex_count)
    }

    fn stored(&self, handle: GeometryHandle) -> Option<&StoredGeometry> {
        usize::try_from(handle.0).ok().and_then(|i| self.geometry.get(i))
    }
}

impl GpuBackend for RecordingBackend {
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> RenderResult<GeometryHandle> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(RenderError::UploadFailed("empty vertex or index data".to_string()));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::UploadFailed(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }
        let index_count = u32::try_from(indices.len())
            .map_err(|_| RenderError::UploadFailed("too many indices".to_string()))?;

        let handle = GeometryHandle(self.geometry.len() as u64);
        self.geometry.push(StoredGeometry {
            vertex_count: vertices.len(),
            index_count,
        });
        log::debug!(
            "Uploaded geometry {:?}: {} vertices, {} indices",
            handle,
            vertices.len(),
            index_count
        );
        Ok(handle)
    }

    fn is_valid(&self, handle: GeometryHandle) -> bool {
        self.stored(handle).is_some()
    }

    fn index_count(&self, handle: GeometryHandle) -> Option<u32> {
        self.stored(handle).map(|g| g.index_count)
    }

    fn bind_geometry(&mut self, handle: GeometryHandle) -> RenderResult<()> {
        if !self.is_valid(handle) {
            return Err(RenderError::InvalidGeometry(handle));
        }
        self.bound = Some(handle);
        self.commands.push(RecordedCommand::Bind(handle));
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> RenderResult<()> {
        self.commands.push(RecordedCommand::Uniform {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) -> RenderResult<()> {
        let geometry = self
            .bound
            .ok_or_else(|| RenderError::Backend("draw issued with no geometry bound".to_string()))?;
        self.commands.push(RecordedCommand::Draw { geometry, index_count });
        Ok(())
    }

    fn clear(&mut self, color: Color) -> RenderResult<()> {
        self.bound = None;
        self.commands.push(RecordedCommand::Clear(color));
        Ok(())
    }
}
