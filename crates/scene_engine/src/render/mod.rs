//! # Rendering
//!
//! Backend-agnostic drawing of a scene graph.
//!
//! ## Architecture
//!
//! - **Camera**: orthographic or perspective view/projection with cached matrices
//! - **GpuBackend**: narrow resource contract (upload, bind, uniforms, draw)
//! - **RenderTraversal**: one draw per mesh node, rebinding only on change
//! - **RecordingBackend**: in-memory backend for tests and headless runs
//! - **primitives**: built-in quad and cube geometry

mod backend;
mod camera;
pub mod primitives;
mod recording_backend;
mod traversal;

pub use backend::{uniforms, GeometryHandle, GpuBackend, RenderError, RenderResult, UniformValue};
pub use camera::{Camera, CameraError, Projection, MAX_FOV, MAX_ZOOM, MIN_FOV, MIN_ZOOM, PITCH_LIMIT};
pub use primitives::{MeshData, Vertex};
pub use recording_backend::{RecordedCommand, RecordingBackend};
pub use traversal::{FrameStats, RenderTraversal};
