//! GPU-resource contract
//!
//! The render traversal only depends on this narrow trait: upload geometry
//! once, bind it, set uniforms, issue indexed draws. Shader compilation and
//! buffer management live behind the implementation.

use thiserror::Error;

use crate::foundation::color::Color;
use crate::foundation::math::{Mat4, Vec3, Vec4};

use super::primitives::Vertex;

/// Handle to geometry uploaded to the backend
///
/// Handles are append-only for the backend's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Uniform names used by [`GpuBackend::set_uniforms`]
pub mod uniforms {
    /// Node world matrix
    pub const MODEL: &str = "u_model";
    /// Camera view-projection matrix
    pub const VIEW_PROJECTION: &str = "u_viewProjection";
    /// Node tint
    pub const COLOUR: &str = "u_colour";
}

/// Value accepted by [`GpuBackend::set_uniform`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Scalar
    Float(f32),
    /// Boolean flag
    Bool(bool),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector (colors)
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
}

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The geometry handle was never uploaded to this backend
    #[error("Invalid geometry handle: {0:?}")]
    InvalidGeometry(GeometryHandle),

    /// Geometry data was rejected at upload
    #[error("Geometry upload failed: {0}")]
    UploadFailed(String),

    /// Any other backend failure
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Result type for backend operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Backend the render traversal draws through
pub trait GpuBackend {
    /// Upload vertex and index data, returning a handle for later binds
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> RenderResult<GeometryHandle>;

    /// Whether `handle` refers to uploaded geometry
    fn is_valid(&self, handle: GeometryHandle) -> bool;

    /// Number of indices stored for `handle`
    fn index_count(&self, handle: GeometryHandle) -> Option<u32>;

    /// Make `handle` the geometry used by subsequent draws
    fn bind_geometry(&mut self, handle: GeometryHandle) -> RenderResult<()>;

    /// Set a named shader uniform
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> RenderResult<()>;

    /// Set the per-draw uniforms for one node
    fn set_uniforms(&mut self, world: &Mat4, view_projection: &Mat4, tint: Color) -> RenderResult<()> {
        self.set_uniform(uniforms::MODEL, UniformValue::Mat4(*world))?;
        self.set_uniform(uniforms::VIEW_PROJECTION, UniformValue::Mat4(*view_projection))?;
        self.set_uniform(uniforms::COLOUR, UniformValue::Vec4(tint.to_vec4()))
    }

    /// Draw `index_count` indices of the bound geometry
    fn draw_indexed(&mut self, index_count: u32) -> RenderResult<()>;

    /// Clear the frame to `color`
    fn clear(&mut self, color: Color) -> RenderResult<()>;
}
