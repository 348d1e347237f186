//! Core engine implementation
//!
//! The [`Engine`] owns every subsystem and drives them in a fixed order
//! each frame:
//!
//! 1. poll window events into the input state
//! 2. tick scripts
//! 3. update the application
//! 4. apply camera controls
//! 5. propagate world transforms
//! 6. clear and draw the scene
//! 7. present

use crate::{
    application::{AppEvent, Application},
    config::{ConfigError, EngineConfig},
    foundation::time::Timer,
    input::{CameraController, InputManager},
    render::{Camera, CameraError, FrameStats, GeometryHandle, GpuBackend, MeshData, RenderError, RenderTraversal},
    scene::{SceneError, SceneGraph, TransformPropagator},
    scripting::ScriptHost,
    window::WindowSource,
};
use thiserror::Error;

/// Frames between debug-level frame summaries
const STATS_LOG_INTERVAL: u64 = 120;

/// Main engine struct
///
/// The engine coordinates all subsystems and manages the main loop.
pub struct Engine {
    /// Scene being drawn
    pub scene: SceneGraph,

    /// Active camera
    pub camera: Camera,

    /// Loaded scripts
    pub scripts: ScriptHost,

    /// Input handling system
    pub input: InputManager,

    /// Keyboard/mouse camera controls
    pub controller: CameraController,

    propagator: TransformPropagator,
    traversal: RenderTraversal,
    backend: Box<dyn GpuBackend>,

    /// Frame timing
    timer: Timer,

    /// Engine configuration
    config: EngineConfig,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance drawing through `backend`
    pub fn new(config: EngineConfig, backend: Box<dyn GpuBackend>) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;

        let camera = config.camera.build(config.window.width, config.window.height);
        camera.validate()?;

        log::info!(
            "Engine ready: {}x{} {:?} camera, script budget {:.1} ms",
            config.window.width,
            config.window.height,
            camera.mode(),
            config.scripting.budget_ms
        );

        Ok(Self {
            scene: SceneGraph::new(),
            camera,
            scripts: ScriptHost::new(config.scripting.budget_ms),
            input: InputManager::new(),
            controller: CameraController::new(config.controls.clone()),
            propagator: TransformPropagator::new(),
            traversal: RenderTraversal::new(),
            backend,
            timer: Timer::new(),
            config,
            running: true,
        })
    }

    /// Run the main loop until the window closes or [`quit`](Self::quit) is called
    pub fn run<T: Application>(&mut self, app: &mut T, window: &mut dyn WindowSource) -> Result<(), EngineError> {
        let (width, height) = window.framebuffer_size();
        self.camera.resize(width, height);

        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");

        while self.running && !window.should_close() {
            self.frame(app, window)?;
        }

        app.cleanup(self);

        log::info!(
            "Engine shutdown complete after {} frame(s), {:.1} fps average",
            self.timer.frame_count(),
            self.timer.average_fps()
        );
        Ok(())
    }

    /// Run exactly one frame
    pub fn frame<T: Application + ?Sized>(
        &mut self,
        app: &mut T,
        window: &mut dyn WindowSource,
    ) -> Result<FrameStats, EngineError> {
        match self.config.window.fixed_timestep {
            Some(step) => self.timer.advance(step),
            None => self.timer.update(),
        }
        let delta_time = self.timer.delta_time();
        let now = self.timer.total_time();

        self.input.begin_frame();
        for event in window.poll_events() {
            self.handle_event(&event);
            app.handle_event(self, &event)
                .map_err(|e| EngineError::Application(format!("App event: {e}")))?;
        }

        self.scripts.tick(now, delta_time, &mut self.scene, &mut self.camera);

        app.update(self, delta_time)
            .map_err(|e| EngineError::Application(format!("App update: {e}")))?;

        self.controller.update(&mut self.camera, &self.input, delta_time);

        let world = self.propagator.propagate(&self.scene);
        self.backend.clear(self.camera.background_color())?;
        let stats = self
            .traversal
            .render(&self.scene, &world, &self.camera, self.backend.as_mut());
        window.present()?;

        if self.timer.frame_count() % STATS_LOG_INTERVAL == 0 {
            log::debug!(
                "Frame {}: {} node(s), {} draw(s), {} bind(s), {} skipped, {} script(s) alive",
                self.timer.frame_count(),
                self.scene.len(),
                stats.drawn,
                stats.binds,
                stats.skipped,
                self.scripts.running_count()
            );
        }
        Ok(stats)
    }

    /// Update engine state from a window event
    pub fn handle_event(&mut self, event: &AppEvent) {
        match *event {
            AppEvent::WindowCloseRequested => {
                log::info!("Window close requested");
                self.running = false;
            }
            AppEvent::WindowResized { width, height } => {
                self.camera.resize(width, height);
            }
            _ => self.input.handle_event(event),
        }
    }

    /// Upload CPU-side geometry to the backend
    pub fn upload_mesh(&mut self, mesh: &MeshData) -> Result<GeometryHandle, EngineError> {
        Ok(self.backend.upload_geometry(&mesh.vertices, &mesh.indices)?)
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop will run another frame
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Mutable access to the backend
    pub fn backend_mut(&mut self) -> &mut dyn GpuBackend {
        self.backend.as_mut()
    }

    /// Counters from the most recent frame
    pub fn last_frame_stats(&self) -> FrameStats {
        self.traversal.last_stats()
    }

    /// Get the input manager
    pub fn input(&self) -> &InputManager {
        &self.input
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Seconds since the first frame
    pub fn total_time(&self) -> f32 {
        self.timer.total_time()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.timer.frame_count()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected at startup
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Camera could not produce a usable projection
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    /// Backend or presentation failure
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Scene graph operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Application hook failed
    #[error("Application error: {0}")]
    Application(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppError;
    use crate::foundation::math::Vec3;
    use crate::input::KeyCode;
    use crate::render::{primitives, RecordingBackend};
    use crate::scene::{NodeDesc, NodeHandle};
    use crate::scripting::Spinner;
    use crate::window::HeadlessWindow;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct TestApp {
        quad: Option<NodeHandle>,
        updates: u32,
        events: u32,
        cleaned_up: bool,
        fail_on_update: Option<u32>,
    }

    impl Application for TestApp {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            let geometry = engine.upload_mesh(&primitives::quad())?;
            let root = engine.scene.create_node(NodeDesc::new("Root"));
            let quad = engine.scene.create_child(root, NodeDesc::mesh("Quad", geometry))?;
            engine.scripts.load("spin", Spinner::planar(root, 90.0));
            self.quad = Some(quad);
            Ok(())
        }

        fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.updates += 1;
            if self.fail_on_update == Some(self.updates) {
                return Err(AppError::Custom("update failed".to_string()));
            }
            Ok(())
        }

        fn handle_event(&mut self, _engine: &mut Engine, _event: &AppEvent) -> Result<(), AppError> {
            self.events += 1;
            Ok(())
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned_up = true;
        }
    }

    fn engine() -> Engine {
        let config = EngineConfig::new().with_fixed_timestep(0.5);
        Engine::new(config, Box::new(RecordingBackend::new())).unwrap()
    }

    #[test]
    fn test_run_stops_when_window_closes() {
        let mut engine = engine();
        let mut app = TestApp::default();
        let mut window = HeadlessWindow::new(800, 600).with_frame_limit(3);

        engine.run(&mut app, &mut window).unwrap();

        assert_eq!(app.updates, 3);
        assert!(app.cleaned_up);
        assert_eq!(window.presented_frames(), 3);
        assert_eq!(engine.frame_count(), 3);
        assert_eq!(engine.last_frame_stats().drawn, 1);
    }

    #[test]
    fn test_scripts_run_before_propagation() {
        let mut engine = engine();
        let mut app = TestApp::default();
        let mut window = HeadlessWindow::new(800, 600).with_frame_limit(2);

        engine.run(&mut app, &mut window).unwrap();

        let root = engine.scene.find_root("Root").unwrap();
        assert_relative_eq!(engine.scene.node(root).unwrap().transform.rotation.z, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_close_event_ends_loop() {
        let mut engine = engine();
        let mut app = TestApp::default();
        let mut window = HeadlessWindow::new(800, 600);
        window.push_events([AppEvent::KeyInput { key: KeyCode::W, pressed: true }]);
        window.push_events([AppEvent::WindowCloseRequested]);

        engine.run(&mut app, &mut window).unwrap();

        assert_eq!(app.events, 2);
        assert_eq!(app.updates, 2);
        assert!(!engine.is_running());
    }

    #[test]
    fn test_resize_event_reaches_camera() {
        let mut engine = engine();
        let mut app = TestApp::default();
        let mut window = HeadlessWindow::new(800, 600);
        window.push_events([AppEvent::WindowResized { width: 1024, height: 768 }]);
        app.initialize(&mut engine).unwrap();

        engine.frame(&mut app, &mut window).unwrap();

        assert_eq!(engine.camera.viewport(), (1024, 768));
    }

    #[test]
    fn test_held_keys_move_camera() {
        let mut engine = engine();
        let mut app = TestApp::default();
        let mut window = HeadlessWindow::new(800, 600);
        window.push_events([AppEvent::KeyInput { key: KeyCode::D, pressed: true }]);

        engine.frame(&mut app, &mut window).unwrap();

        // Default ortho camera at zoom 100 pans move_speed units per second
        assert_relative_eq!(engine.camera.position(), Vec3::new(2.5, 0.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_application_error_aborts_run() {
        let mut engine = engine();
        let mut app = TestApp {
            fail_on_update: Some(2),
            ..TestApp::default()
        };
        let mut window = HeadlessWindow::new(800, 600).with_frame_limit(10);

        let err = engine.run(&mut app, &mut window).unwrap_err();

        assert!(matches!(err, EngineError::Application(_)));
        assert!(!app.cleaned_up);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::new();
        config.window.width = 0;
        assert!(matches!(
            Engine::new(config, Box::new(RecordingBackend::new())),
            Err(EngineError::Config(_))
        ));
    }
}
