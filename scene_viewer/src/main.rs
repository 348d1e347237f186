//! Orrery demo application
//!
//! Builds a small solar system (sun, orbiting planets, a bobbing moon and
//! a scattered star field), animates it with built-in scripts and runs the
//! frame loop headless for a fixed number of frames.
//!
//! Usage: `scene_viewer [config.toml|config.ron]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_engine::foundation::logging;
use scene_engine::inspector::HierarchyView;
use scene_engine::prelude::*;

const DEMO_FRAMES: u64 = 600;
const STAR_COUNT: usize = 40;
const STAR_SEED: u64 = 0x5eed;

/// (name, orbit radius, orbit speed in degrees/s, size, tint)
const PLANETS: [(&str, f32, f32, f32, Color); 3] = [
    ("Mercury", 1.2, 120.0, 0.15, Color::rgb(0.7, 0.6, 0.5)),
    ("Earth", 2.0, 60.0, 0.3, Color::rgb(0.2, 0.4, 0.9)),
    ("Mars", 2.8, 35.0, 0.25, Color::rgb(0.8, 0.3, 0.2)),
];

#[derive(Default)]
struct OrreryApp {
    earth: Option<NodeHandle>,
    selection: Selection,
}

impl OrreryApp {
    fn build_scene(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let quad = engine.upload_mesh(&primitives::quad())?;
        let cube = engine.upload_mesh(&primitives::cube())?;

        let system = engine.scene.create_node(NodeDesc::new("System"));
        let sun = engine.scene.create_child(
            system,
            NodeDesc::mesh("Sun", cube)
                .with_scale(Vec3::new(0.6, 0.6, 0.6))
                .with_color(Color::rgb(1.0, 0.85, 0.2)),
        )?;
        engine.scripts.load("sun_spin", Spinner::new(sun, Vec3::new(0.0, 0.0, 15.0)));

        for (name, radius, speed, size, tint) in PLANETS {
            let pivot = engine.scene.create_child(system, NodeDesc::new(format!("{name}Orbit")))?;
            let planet = engine.scene.create_child(
                pivot,
                NodeDesc::mesh(name, quad)
                    .with_position(Vec3::new(radius, 0.0, 0.0))
                    .with_scale(Vec3::new(size, size, 1.0))
                    .with_color(tint),
            )?;
            engine.scripts.load(format!("{name}_orbit"), Spinner::planar(pivot, speed));
            if name == "Earth" {
                self.earth = Some(planet);
            }
        }

        if let Some(earth) = self.earth {
            let moon = engine.scene.create_child(
                earth,
                NodeDesc::mesh("Moon", quad)
                    .with_position(Vec3::new(1.2, 0.0, 0.0))
                    .with_scale(Vec3::new(0.4, 0.4, 1.0))
                    .with_color(Color::rgb(0.8, 0.8, 0.8)),
            )?;
            engine.scripts.load("moon_bob", Oscillator::new(moon, Vec3::new(0.0, 0.5, 0.0), 0.5));
            self.selection.select(&engine.scene, moon)?;
        }

        let stars = engine.scene.create_node(NodeDesc::new("Stars"));
        let mut rng = StdRng::seed_from_u64(STAR_SEED);
        let (half_w, half_h) = engine
            .camera
            .half_extents()
            .map_or((4.0, 3.0), |half| (half.x, half.y));
        for i in 0..STAR_COUNT {
            let position = Vec3::new(rng.gen_range(-half_w..half_w), rng.gen_range(-half_h..half_h), -0.5);
            let size = rng.gen_range(0.02..0.06);
            engine.scene.create_child(
                stars,
                NodeDesc::mesh(format!("Star{i}"), quad)
                    .with_position(position)
                    .with_scale(Vec3::new(size, size, 1.0)),
            )?;
        }

        Ok(())
    }
}

impl Application for OrreryApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        self.build_scene(engine)?;

        let hierarchy = HierarchyView::capture(&engine.scene);
        log::info!(
            "Scene built: {} node(s), {} script(s)",
            engine.scene.len(),
            engine.scripts.len()
        );
        for line in hierarchy.render_text().lines().filter(|line| !line.trim_start().starts_with("Star")) {
            log::debug!("{line}");
        }
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        // Halfway through, retire Mars and let the moon stop bobbing
        if engine.frame_count() == DEMO_FRAMES / 2 {
            if let Some(mars) = engine.scene.find_root("System").and_then(|system| {
                engine.scene.find(system, "MarsOrbit").ok().flatten()
            }) {
                let released = engine.scene.remove(mars)?;
                log::info!("Removed Mars orbit ({released} node(s))");
            }
            engine.scripts.stop("moon_bob")?;
        }
        Ok(())
    }

    fn handle_event(&mut self, _engine: &mut Engine, event: &AppEvent) -> Result<(), AppError> {
        if let AppEvent::KeyInput { key: KeyCode::Escape, pressed: true } = event {
            log::info!("Escape pressed");
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let stats = engine.last_frame_stats();
        log::info!(
            "Last frame: {} draw(s), {} bind(s), {} skipped",
            stats.drawn,
            stats.binds,
            stats.skipped
        );
        if let Some(props) = self.selection.properties(&engine.scene) {
            log::info!(
                "Selected '{}' at ({:.2}, {:.2})",
                props.name,
                props.position.x,
                props.position.y
            );
        }
        for name in engine.scripts.names() {
            if let Some(state) = engine.scripts.state(name) {
                log::info!("Script '{name}': {}", state.label());
            }
        }
    }
}

fn load_config() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from_file(&path)?,
        None => EngineConfig::new().with_title("Orrery").with_fixed_timestep(1.0 / 60.0),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init(&config.logging);

    log::info!("Starting {}", config.window.title);

    let mut window = HeadlessWindow::new(config.window.width, config.window.height).with_frame_limit(DEMO_FRAMES);
    // Zoom out after the first frame, then resize
    window.push_events(Vec::<AppEvent>::new());
    window.push_events([AppEvent::MouseWheel { delta_x: 0.0, delta_y: -4.0 }]);
    window.push_events([AppEvent::WindowResized { width: 1024, height: 768 }]);

    let mut engine = Engine::new(config, Box::new(RecordingBackend::new()))?;
    let mut app = OrreryApp::default();
    engine.run(&mut app, &mut window)?;

    log::info!("Presented {} frame(s)", window.presented_frames());
    Ok(())
}
