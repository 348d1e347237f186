//! Application trait and lifecycle management

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::scene::SceneError;
use crate::scripting::ScriptError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to build a scene on top of the engine. The engine
/// calls these hooks from its frame loop; everything else (scripts, camera
/// controls, drawing) the engine does itself.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Use this to upload geometry,
    /// build the initial scene and load scripts.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame after scripts have run.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Handle application events
    ///
    /// Called for every event the window delivered this frame, after the
    /// engine has updated its own input state.
    fn handle_event(&mut self, _engine: &mut Engine, _event: &AppEvent) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the frame loop ends.
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene graph operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Script could not be loaded or controlled
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Application events
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Framebuffer was resized
    WindowResized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },

    /// Window close requested
    WindowCloseRequested,

    /// Window gained focus
    WindowFocused,

    /// Window lost focus
    WindowUnfocused,

    /// Key input event
    KeyInput {
        /// The key that was pressed/released
        key: crate::input::KeyCode,
        /// Whether the key was pressed (true) or released (false)
        pressed: bool,
    },

    /// Mouse button event
    MouseButton {
        /// The mouse button that was pressed/released
        button: crate::input::MouseButton,
        /// Whether the button was pressed (true) or released (false)
        pressed: bool,
    },

    /// Cursor moved, in pixels from the top-left corner
    MouseMoved {
        /// New X coordinate
        x: f64,
        /// New Y coordinate
        y: f64,
    },

    /// Mouse wheel
    MouseWheel {
        /// Horizontal scroll delta
        delta_x: f64,
        /// Vertical scroll delta
        delta_y: f64,
    },
}
