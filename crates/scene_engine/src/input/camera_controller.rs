//! Keyboard and mouse camera controls
//!
//! Perspective cameras fly: WASD along the view basis, E/Q along world up,
//! right-mouse drag to look around. Orthographic cameras pan with WASD,
//! rotate with Q/E and zoom with the scroll wheel.

use crate::config::ControlsConfig;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::Camera;

use super::{InputManager, KeyCode, MouseButton};

/// Zoom at which orthographic panning moves `move_speed` world units per second
const REFERENCE_ZOOM: f32 = 100.0;

/// Applies [`InputManager`] state to a [`Camera`] once per frame
#[derive(Debug, Clone)]
pub struct CameraController {
    settings: ControlsConfig,
    enabled: bool,
}

impl CameraController {
    /// Create a controller with the given speeds
    pub fn new(settings: ControlsConfig) -> Self {
        Self { settings, enabled: true }
    }

    /// Current speeds
    pub fn settings(&self) -> &ControlsConfig {
        &self.settings
    }

    /// Enable or disable all camera input
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether camera input is applied
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Move the camera from this frame's input; returns whether it changed
    pub fn update(&self, camera: &mut Camera, input: &InputManager, delta_time: f32) -> bool {
        if !self.enabled {
            return false;
        }
        match camera.zoom() {
            Some(zoom) => self.update_orthographic(camera, input, delta_time, zoom),
            None => self.update_perspective(camera, input, delta_time),
        }
    }

    fn update_perspective(&self, camera: &mut Camera, input: &InputManager, delta_time: f32) -> bool {
        let mut changed = false;

        let direction = camera.forward() * input.axis(KeyCode::S, KeyCode::W)
            + camera.right() * input.axis(KeyCode::A, KeyCode::D)
            + Vec3::y() * input.axis(KeyCode::Q, KeyCode::E);
        if direction != Vec3::zeros() {
            camera.translate(direction.normalize() * self.settings.move_speed * delta_time);
            changed = true;
        }

        let look = input.cursor_delta();
        if input.is_button_down(MouseButton::Right) && look != Vec2::zeros() {
            let sensitivity = self.settings.look_sensitivity;
            // Screen y grows downward
            camera.rotate_euler(look.x * sensitivity, -look.y * sensitivity, 0.0);
            changed = true;
        }

        changed
    }

    fn update_orthographic(&self, camera: &mut Camera, input: &InputManager, delta_time: f32, zoom: f32) -> bool {
        let mut changed = false;

        let pan = camera.right() * input.axis(KeyCode::A, KeyCode::D) + camera.up() * input.axis(KeyCode::S, KeyCode::W);
        if pan != Vec3::zeros() {
            let speed = self.settings.move_speed * REFERENCE_ZOOM / zoom;
            camera.translate(pan.normalize() * speed * delta_time);
            changed = true;
        }

        let spin = input.axis(KeyCode::E, KeyCode::Q);
        if spin != 0.0 {
            camera.rotate(spin * self.settings.rotate_speed * delta_time);
            changed = true;
        }

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            camera.zoom_by(scroll * self.settings.zoom_step);
            changed = true;
        }

        changed
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(ControlsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppEvent;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    fn perspective() -> Camera {
        Camera::perspective(800, 600, 45.0, 0.1, 100.0)
    }

    #[test]
    fn test_w_moves_along_forward() {
        let controller = CameraController::default();
        let mut camera = perspective();
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::W, true);

        assert!(controller.update(&mut camera, &input, 0.5));
        assert_relative_eq!(camera.position(), Vec3::new(0.0, 0.0, -2.5), epsilon = EPSILON);
    }

    #[test]
    fn test_e_rises_along_world_up() {
        let controller = CameraController::default();
        let mut camera = perspective();
        camera.set_orientation(-90.0, 45.0, 0.0);
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::E, true);

        controller.update(&mut camera, &input, 1.0);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, 5.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_mouse_look_requires_right_button() {
        let controller = CameraController::default();
        let mut camera = perspective();
        let mut input = InputManager::new();
        input.handle_mouse_move(100.0, 100.0);
        input.handle_mouse_move(150.0, 80.0);

        assert!(!controller.update(&mut camera, &input, 0.016));
        assert_relative_eq!(camera.yaw(), -90.0);

        input.handle_event(&AppEvent::MouseButton { button: MouseButton::Right, pressed: true });
        assert!(controller.update(&mut camera, &input, 0.016));
        assert_relative_eq!(camera.yaw(), -85.0, epsilon = EPSILON);
        assert_relative_eq!(camera.pitch(), 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_ortho_pan_scales_with_zoom() {
        let controller = CameraController::default();
        let mut near = Camera::orthographic(800, 600, 100.0);
        let mut far = Camera::orthographic(800, 600, 50.0);
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::D, true);

        controller.update(&mut near, &input, 1.0);
        controller.update(&mut far, &input, 1.0);

        assert_relative_eq!(near.position().x, 5.0, epsilon = EPSILON);
        assert_relative_eq!(far.position().x, 10.0, epsilon = EPSILON);
    }

    #[test]
    fn test_ortho_rotate_and_scroll_zoom() {
        let controller = CameraController::default();
        let mut camera = Camera::orthographic(800, 600, 50.0);
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::Q, true);
        input.handle_event(&AppEvent::MouseWheel { delta_x: 0.0, delta_y: 2.0 });

        controller.update(&mut camera, &input, 0.5);

        assert_relative_eq!(camera.rotation(), 45.0, epsilon = EPSILON);
        assert_eq!(camera.zoom(), Some(60.0));
    }

    #[test]
    fn test_disabled_controller_ignores_input() {
        let mut controller = CameraController::default();
        controller.set_enabled(false);
        let mut camera = perspective();
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::W, true);

        assert!(!controller.update(&mut camera, &input, 1.0));
        assert_eq!(camera.position(), Vec3::zeros());
    }
}
