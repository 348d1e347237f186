//! Configuration system
//!
//! Engine settings are plain serde structs that can be loaded from TOML or
//! RON files. Every section has sensible defaults so an empty file (or no
//! file at all) yields a working engine.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::foundation::color::Color;
use crate::render::Camera;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Window / viewport settings handed to the windowing collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial framebuffer width in pixels
    pub width: u32,
    /// Initial framebuffer height in pixels
    pub height: u32,
    /// Fixed simulation step in seconds; wall-clock deltas when `None`
    pub fixed_timestep: Option<f32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scene Engine".to_string(),
            width: 800,
            height: 600,
            fixed_timestep: None,
        }
    }
}

/// Which projection a camera is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// 2D camera, zoom in pixels per world unit
    Orthographic,
    /// 3D camera with field of view and clip planes
    Perspective,
}

/// Camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Projection mode, fixed for the camera's lifetime
    pub projection: ProjectionKind,
    /// Initial position
    pub position: [f32; 3],
    /// Orthographic zoom (pixels per world unit)
    pub zoom: f32,
    /// Perspective vertical field of view in degrees
    pub fov_degrees: f32,
    /// Perspective near plane
    pub near: f32,
    /// Perspective far plane
    pub far: f32,
    /// Initial yaw in degrees (perspective)
    pub yaw_degrees: f32,
    /// Initial pitch in degrees (perspective)
    pub pitch_degrees: f32,
    /// Clear color
    pub background: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Orthographic,
            position: [0.0, 0.0, 0.0],
            zoom: 100.0,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            yaw_degrees: -90.0,
            pitch_degrees: 0.0,
            background: [0.15, 0.15, 0.15],
        }
    }
}

impl CameraConfig {
    /// Switch to a perspective camera placed at `position`
    pub fn with_perspective(mut self, position: [f32; 3]) -> Self {
        self.projection = ProjectionKind::Perspective;
        self.position = position;
        self
    }

    /// Set the orthographic zoom
    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Validate values that clamping cannot repair
    pub fn validate(&self) -> Result<(), String> {
        let scalars = [
            ("zoom", self.zoom),
            ("fov_degrees", self.fov_degrees),
            ("yaw_degrees", self.yaw_degrees),
            ("pitch_degrees", self.pitch_degrees),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("camera {name} must be finite, got {value}"));
        }
        if !self.position.iter().all(|v| v.is_finite()) {
            return Err(format!("camera position must be finite, got {:?}", self.position));
        }
        if self.projection == ProjectionKind::Perspective && !(self.near > 0.0 && self.near < self.far) {
            return Err(format!(
                "clip planes must satisfy 0 < near < far (near = {}, far = {})",
                self.near, self.far
            ));
        }
        Ok(())
    }

    /// Construct the camera described by this config for a viewport
    pub fn build(&self, width: u32, height: u32) -> Camera {
        let position = Vec3::from(self.position);
        let mut camera = match self.projection {
            ProjectionKind::Orthographic => Camera::orthographic(width, height, self.zoom),
            ProjectionKind::Perspective => {
                let mut camera = Camera::perspective(width, height, self.fov_degrees, self.near, self.far);
                camera.set_orientation(self.yaw_degrees, self.pitch_degrees, 0.0);
                camera
            }
        };
        camera.set_position(position);
        let [r, g, b] = self.background;
        camera.set_background_color(Color::rgb(r, g, b));
        camera
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter, e.g. `"info"` or `"scene_engine=debug"`
    pub filter: String,
    /// Include millisecond timestamps in log lines
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            timestamps: true,
        }
    }
}

/// Script scheduling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Per-frame time budget for resuming scripts, in milliseconds
    pub budget_ms: f32,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { budget_ms: 4.0 }
    }
}

/// Camera control speeds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Movement speed in world units per second
    pub move_speed: f32,
    /// Mouse-look sensitivity in degrees per pixel
    pub look_sensitivity: f32,
    /// Rotation speed for the 2D camera in degrees per second
    pub rotate_speed: f32,
    /// Zoom change per scroll step
    pub zoom_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            look_sensitivity: 0.1,
            rotate_speed: 90.0,
            zoom_step: 5.0,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window / viewport settings
    pub window: WindowConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Script scheduling settings
    pub scripting: ScriptConfig,
    /// Camera control settings
    pub controls: ControlsConfig,
}

impl EngineConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Use a fixed timestep instead of wall-clock deltas
    pub fn with_fixed_timestep(mut self, step: f32) -> Self {
        self.window.fixed_timestep = Some(step);
        self
    }

    /// Replace the camera section
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Set the default log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if let Some(step) = self.window.fixed_timestep {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::Invalid(format!("fixed timestep must be positive, got {step}")));
            }
        }
        self.camera.validate().map_err(ConfigError::Invalid)
    }
}

impl Config for EngineConfig {}
