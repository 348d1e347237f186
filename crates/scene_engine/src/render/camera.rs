//! # Camera
//!
//! One camera type with two projection modes:
//!
//! - **Orthographic** (2D): position, a single rotation about Z and a zoom
//!   factor. The visible area is `(w/2)/zoom` by `(h/2)/zoom` around the
//!   camera position, with clip depth `[-1, 1]`.
//! - **Perspective** (3D): position, yaw/pitch/roll in degrees, vertical
//!   field of view and clip planes.
//!
//! Every mutator recomputes the dependent matrices before returning, so
//! `view()`, `projection()` and `view_projection()` are always current and
//! cheap to read from the render traversal.
//!
//! ## Coordinate System
//! Right-handed, Y-up. The camera looks down its local -Z axis and clip
//! space follows the OpenGL convention (z in [-1, 1]).

use bitflags::bitflags;
use thiserror::Error;

use crate::config::ProjectionKind;
use crate::foundation::color::Color;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec2, Vec3, Vec4};

/// Smallest orthographic zoom factor
pub const MIN_ZOOM: f32 = 0.1;
/// Largest orthographic zoom factor
pub const MAX_ZOOM: f32 = 100.0;
/// Smallest vertical field of view in degrees
pub const MIN_FOV: f32 = 1.0;
/// Largest vertical field of view in degrees
pub const MAX_FOV: f32 = 179.0;
/// Pitch limit in degrees, short of straight up/down where the basis degenerates
pub const PITCH_LIMIT: f32 = 89.0;

const DEFAULT_ZOOM: f32 = 100.0;
const DEFAULT_FOV: f32 = 45.0;

/// Camera errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    /// The projection matrix contains non-finite values
    #[error("Degenerate projection for viewport {width}x{height}")]
    DegenerateProjection {
        /// Viewport width in pixels
        width: u32,
        /// Viewport height in pixels
        height: u32,
    },

    /// Clip planes must satisfy `0 < near < far`
    #[error("Invalid clip planes: near {near}, far {far}")]
    InvalidClipPlanes {
        /// Requested near plane
        near: f32,
        /// Requested far plane
        far: f32,
    },
}

/// Mode-specific projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// 2D projection scaled by a zoom factor
    Orthographic {
        /// Pixels per world unit, clamped to `[MIN_ZOOM, MAX_ZOOM]`
        zoom: f32,
    },
    /// 3D projection with a vertical field of view
    Perspective {
        /// Vertical field of view in degrees, clamped to `[MIN_FOV, MAX_FOV]`
        fov_degrees: f32,
        /// Near clip distance
        near: f32,
        /// Far clip distance
        far: f32,
    },
}

bitflags! {
    /// Matrices invalidated by a mutation
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Dirty: u8 {
        const VIEW = 1 << 0;
        const PROJECTION = 1 << 1;
    }
}

/// Orthographic or perspective camera with eagerly cached matrices
#[derive(Debug, Clone)]
pub struct Camera {
    viewport: (u32, u32),
    position: Vec3,
    yaw: f32,
    pitch: f32,
    roll: f32,
    projection: Projection,
    background: Color,

    forward: Vec3,
    right: Vec3,
    up: Vec3,

    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
}

impl Camera {
    /// Create an orthographic camera for a `width` x `height` viewport
    pub fn orthographic(width: u32, height: u32, zoom: f32) -> Self {
        Self::with_projection(
            width,
            height,
            Projection::Orthographic {
                zoom: utils::clamp(finite_or(zoom, DEFAULT_ZOOM, "zoom"), MIN_ZOOM, MAX_ZOOM),
            },
        )
    }

    /// Create a perspective camera looking down -Z
    ///
    /// Invalid clip planes fall back to `0.1..100.0` with a warning.
    pub fn perspective(width: u32, height: u32, fov_degrees: f32, near: f32, far: f32) -> Self {
        let (near, far) = if valid_clip_planes(near, far) {
            (near, far)
        } else {
            log::warn!("Ignoring invalid clip planes {near}..{far}, using 0.1..100");
            (0.1, 100.0)
        };
        let mut camera = Self::with_projection(
            width,
            height,
            Projection::Perspective {
                fov_degrees: utils::clamp(finite_or(fov_degrees, DEFAULT_FOV, "fov"), MIN_FOV, MAX_FOV),
                near,
                far,
            },
        );
        camera.set_orientation(-90.0, 0.0, 0.0);
        camera
    }

    fn with_projection(width: u32, height: u32, projection: Projection) -> Self {
        let mut camera = Self {
            viewport: (width.max(1), height.max(1)),
            position: Vec3::zeros(),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            projection,
            background: Color::rgb(0.15, 0.15, 0.15),
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::y(),
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            view_projection_matrix: Mat4::identity(),
        };
        camera.recompute(Dirty::all());
        camera
    }

    // ---- mutators ----

    /// Move the camera to `position`
    pub fn set_position(&mut self, position: Vec3) {
        if !position.iter().all(|v| v.is_finite()) {
            log::warn!("Ignoring non-finite camera position {position:?}");
            return;
        }
        self.position = position;
        self.recompute(Dirty::VIEW);
    }

    /// Move the camera by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    /// Set the in-plane rotation in degrees
    ///
    /// For a perspective camera this is the roll about the view axis.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.roll = finite_or(degrees, self.roll, "rotation");
        self.recompute(Dirty::VIEW);
    }

    /// Add `degrees` to the in-plane rotation
    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.roll + degrees);
    }

    /// Set yaw, pitch and roll in degrees; pitch clamps to ±89°
    ///
    /// An orthographic camera only uses `roll`.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.yaw = finite_or(yaw, self.yaw, "yaw");
        self.pitch = utils::clamp(finite_or(pitch, self.pitch, "pitch"), -PITCH_LIMIT, PITCH_LIMIT);
        self.roll = finite_or(roll, self.roll, "roll");
        self.recompute(Dirty::VIEW);
    }

    /// Add yaw/pitch/roll deltas in degrees
    pub fn rotate_euler(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.set_orientation(self.yaw + yaw, self.pitch + pitch, self.roll + roll);
    }

    /// Set the orthographic zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`
    ///
    /// Ignored by perspective cameras. Non-finite values keep the current zoom.
    pub fn set_zoom(&mut self, zoom: f32) {
        if let Projection::Orthographic { zoom: current } = &mut self.projection {
            *current = utils::clamp(finite_or(zoom, *current, "zoom"), MIN_ZOOM, MAX_ZOOM);
            log::trace!("Camera zoom set to {}", *current);
            self.recompute(Dirty::PROJECTION);
        } else {
            log::debug!("set_zoom ignored on a perspective camera");
        }
    }

    /// Change the orthographic zoom by `delta`
    pub fn zoom_by(&mut self, delta: f32) {
        if let Some(zoom) = self.zoom() {
            self.set_zoom(zoom + delta);
        }
    }

    /// Set the vertical field of view, clamped to `[MIN_FOV, MAX_FOV]`
    ///
    /// Ignored by orthographic cameras. Non-finite values keep the current FOV.
    pub fn set_fov(&mut self, degrees: f32) {
        if let Projection::Perspective { fov_degrees, .. } = &mut self.projection {
            *fov_degrees = utils::clamp(finite_or(degrees, *fov_degrees, "fov"), MIN_FOV, MAX_FOV);
            self.recompute(Dirty::PROJECTION);
        } else {
            log::debug!("set_fov ignored on an orthographic camera");
        }
    }

    /// Set the perspective clip planes
    ///
    /// Orthographic cameras always clip at `[-1, 1]` and ignore this.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<(), CameraError> {
        if !valid_clip_planes(near, far) {
            return Err(CameraError::InvalidClipPlanes { near, far });
        }
        if let Projection::Perspective { near: n, far: f, .. } = &mut self.projection {
            *n = near;
            *f = far;
            self.recompute(Dirty::PROJECTION);
        }
        Ok(())
    }

    /// Update the viewport size; each dimension is clamped to at least 1
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = (width.max(1), height.max(1));
        if viewport != self.viewport {
            log::info!("Camera viewport resized to {}x{}", viewport.0, viewport.1);
        }
        self.viewport = viewport;
        self.recompute(Dirty::PROJECTION);
    }

    /// Set the frame clear color
    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    // ---- accessors ----

    /// World-to-camera matrix
    pub fn view(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Camera-to-clip matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// `projection * view`
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection_matrix
    }

    /// Projection mode
    pub fn mode(&self) -> ProjectionKind {
        match self.projection {
            Projection::Orthographic { .. } => ProjectionKind::Orthographic,
            Projection::Perspective { .. } => ProjectionKind::Perspective,
        }
    }

    /// Mode-specific projection parameters
    pub fn projection_params(&self) -> Projection {
        self.projection
    }

    /// Orthographic zoom, `None` for perspective cameras
    pub fn zoom(&self) -> Option<f32> {
        match self.projection {
            Projection::Orthographic { zoom } => Some(zoom),
            Projection::Perspective { .. } => None,
        }
    }

    /// Vertical field of view in degrees, `None` for orthographic cameras
    pub fn fov(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { fov_degrees, .. } => Some(fov_degrees),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Perspective clip planes `(near, far)`
    pub fn clip_planes(&self) -> Option<(f32, f32)> {
        match self.projection {
            Projection::Perspective { near, far, .. } => Some((near, far)),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Camera position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// In-plane rotation (roll) in degrees
    pub fn rotation(&self) -> f32 {
        self.roll
    }

    /// Yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Unit right vector
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// Half the visible width and height in world units (orthographic only)
    pub fn half_extents(&self) -> Option<Vec2> {
        self.zoom().map(|zoom| {
            Vec2::new(
                self.viewport.0 as f32 * 0.5 / zoom,
                self.viewport.1 as f32 * 0.5 / zoom,
            )
        })
    }

    /// Frame clear color
    pub fn background_color(&self) -> Color {
        self.background
    }

    /// Map a cursor position in pixels (origin top-left) to world space
    ///
    /// Orthographic cameras return the point on the z = 0 plane; perspective
    /// cameras return the point on the near plane. `None` if the
    /// view-projection is not invertible.
    pub fn screen_to_world(&self, cursor: Vec2) -> Option<Vec3> {
        let (width, height) = self.viewport;
        let ndc_x = cursor.x / width as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - cursor.y / height as f32 * 2.0;
        let ndc_z = match self.projection {
            Projection::Orthographic { .. } => 0.0,
            Projection::Perspective { .. } => -1.0,
        };

        let inverse = self.view_projection_matrix.try_inverse()?;
        let world = inverse * Vec4::new(ndc_x, ndc_y, ndc_z, 1.0);
        if world.w.abs() <= f32::EPSILON {
            return None;
        }
        Some(world.xyz() / world.w)
    }

    /// Check that the cached projection is usable
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.projection_matrix.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(CameraError::DegenerateProjection {
                width: self.viewport.0,
                height: self.viewport.1,
            })
        }
    }

    // ---- internals ----

    fn recompute(&mut self, dirty: Dirty) {
        if dirty.contains(Dirty::VIEW) {
            self.update_view();
        }
        if dirty.contains(Dirty::PROJECTION) {
            self.update_projection();
        }
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    fn update_view(&mut self) {
        match self.projection {
            Projection::Orthographic { .. } => {
                let angle = utils::deg_to_rad(self.roll);
                let (sin, cos) = angle.sin_cos();
                self.right = Vec3::new(cos, sin, 0.0);
                self.up = Vec3::new(-sin, cos, 0.0);
                self.forward = Vec3::new(0.0, 0.0, -1.0);
                self.view_matrix = Mat4::rotation_z(-angle) * Mat4::new_translation(&-self.position);
            }
            Projection::Perspective { .. } => {
                let yaw = utils::deg_to_rad(self.yaw);
                let pitch = utils::deg_to_rad(self.pitch);
                let forward = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
                let right = forward.cross(&Vec3::y()).normalize();
                let up = right.cross(&forward).normalize();

                let (sin, cos) = utils::deg_to_rad(self.roll).sin_cos();
                self.forward = forward;
                self.right = right * cos + up * sin;
                self.up = up * cos - right * sin;
                self.view_matrix = Mat4::look_to(self.position, self.forward, self.right, self.up);
            }
        }
    }

    fn update_projection(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Orthographic { zoom } => {
                let half_w = self.viewport.0 as f32 * 0.5 / zoom;
                let half_h = self.viewport.1 as f32 * 0.5 / zoom;
                Mat4::orthographic(-half_w, half_w, -half_h, half_h, -1.0, 1.0)
            }
            Projection::Perspective { fov_degrees, near, far } => {
                Mat4::perspective(utils::deg_to_rad(fov_degrees), self.aspect(), near, far)
            }
        };
        debug_assert!(
            self.validate().is_ok(),
            "degenerate projection for viewport {:?}",
            self.viewport
        );
    }
}

impl Default for Camera {
    /// 800x600 orthographic camera at zoom 100
    fn default() -> Self {
        Self::orthographic(800, 600, 100.0)
    }
}

fn finite_or(value: f32, fallback: f32, what: &str) -> f32 {
    if value.is_finite() {
        value
    } else {
        log::warn!("Ignoring non-finite camera {what} {value}, keeping {fallback}");
        fallback
    }
}

fn valid_clip_planes(near: f32, far: f32) -> bool {
    near.is_finite() && far.is_finite() && near > 0.0 && near < far
}
