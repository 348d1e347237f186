//! # Scene Engine
//!
//! A small scene-graph engine: a hierarchy of nodes with local transforms,
//! a camera, and a per-frame traversal that draws every mesh node through
//! a pluggable GPU backend.
//!
//! ## Features
//!
//! - **Arena Scene Graph**: generational handles, cycle-safe reparenting, subtree removal
//! - **Transform Propagation**: `parent * T * Rx * Ry * Rz * S` in pre-order
//! - **Camera**: orthographic (2D zoom) and perspective (yaw/pitch/roll) modes
//! - **Backend Contract**: upload, bind, uniforms, indexed draw
//! - **Scripts**: per-frame state machines with wait/pause/stop and a time budget
//! - **Inspection**: hierarchy snapshots, property editing, selection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let quad = engine.upload_mesh(&primitives::quad())?;
//!         let root = engine.scene.create_node(NodeDesc::new("Root"));
//!         engine.scene.create_child(root, NodeDesc::mesh("Quad", quad))?;
//!         engine.scripts.load("spin", Spinner::planar(root, 45.0));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let mut engine = Engine::new(config, Box::new(RecordingBackend::new()))?;
//!     let mut window = HeadlessWindow::new(800, 600).with_frame_limit(60);
//!     engine.run(&mut MyApp, &mut window)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_precision_loss,
    clippy::must_use_candidate
)]

pub mod config;
pub mod foundation;
pub mod input;
pub mod inspector;
pub mod render;
pub mod scene;
pub mod scripting;
pub mod window;

mod application;
mod engine;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{CameraConfig, Config, EngineConfig, ProjectionKind},
        foundation::{
            color::Color,
            math::{Mat4, Transform, Vec2, Vec3},
            time::{Stopwatch, Timer},
        },
        input::{CameraController, InputManager, KeyCode, MouseButton},
        inspector::{HierarchyView, NodeProperties, Selection},
        render::{primitives, Camera, FrameStats, GeometryHandle, GpuBackend, RecordingBackend},
        scene::{NodeDesc, NodeHandle, NodeKind, SceneError, SceneGraph},
        scripting::{Oscillator, Script, ScriptContext, ScriptHost, ScriptState, ScriptStep, Spinner},
        window::{HeadlessWindow, WindowSource},
        AppError, AppEvent, Application, Engine, EngineError,
    };
}
