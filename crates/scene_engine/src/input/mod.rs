//! Input management system
//!
//! [`InputManager`] folds the frame's [`AppEvent`]s into queryable state:
//! held keys and buttons, the cursor position, and per-frame cursor and
//! scroll deltas. [`CameraController`] turns that state into camera motion.

use std::collections::HashSet;

use crate::application::AppEvent;
use crate::foundation::math::Vec2;

mod camera_controller;

pub use camera_controller::CameraController;

/// Input state accumulated from window events
#[derive(Debug, Default)]
pub struct InputManager {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    cursor: Option<Vec2>,
    cursor_delta: Vec2,
    scroll_delta: Vec2,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame state; call before feeding the frame's events
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.cursor_delta = Vec2::zeros();
        self.scroll_delta = Vec2::zeros();
    }

    /// Update state from one event
    pub fn handle_event(&mut self, event: &AppEvent) {
        match *event {
            AppEvent::KeyInput { key, pressed } => self.handle_key_input(key, pressed),
            AppEvent::MouseButton { button, pressed } => self.handle_mouse_button(button, pressed),
            AppEvent::MouseMoved { x, y } => self.handle_mouse_move(x, y),
            AppEvent::MouseWheel { delta_x, delta_y } => {
                self.scroll_delta += Vec2::new(delta_x as f32, delta_y as f32);
            }
            AppEvent::WindowUnfocused => {
                // Releases are not delivered while unfocused
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            _ => {}
        }
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons_down.insert(button);
        } else {
            self.buttons_down.remove(&button);
        }
    }

    /// Handle mouse movement
    ///
    /// The first position seen produces no delta.
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(previous) = self.cursor {
            self.cursor_delta += position - previous;
        }
        self.cursor = Some(position);
    }

    /// Whether `key` is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Whether `key` went down this frame
    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Whether `button` is held
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Last known cursor position in pixels
    pub fn cursor_position(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Cursor movement since [`begin_frame`](Self::begin_frame)
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    /// Scroll since [`begin_frame`](Self::begin_frame)
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// `+1` if `positive` is held, `-1` if `negative` is, `0` for both or neither
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        f32::from(u8::from(self.is_key_down(positive))) - f32::from(u8::from(self.is_key_down(negative)))
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_and_release() {
        let mut input = InputManager::new();
        input.handle_event(&AppEvent::KeyInput { key: KeyCode::W, pressed: true });
        assert!(input.is_key_down(KeyCode::W));
        assert!(input.was_key_pressed(KeyCode::W));

        input.begin_frame();
        assert!(input.is_key_down(KeyCode::W));
        assert!(!input.was_key_pressed(KeyCode::W));

        input.handle_event(&AppEvent::KeyInput { key: KeyCode::W, pressed: false });
        assert!(!input.is_key_down(KeyCode::W));
    }

    #[test]
    fn test_cursor_delta_accumulates_within_frame() {
        let mut input = InputManager::new();
        input.handle_mouse_move(10.0, 10.0);
        assert_eq!(input.cursor_delta(), Vec2::zeros());

        input.handle_mouse_move(15.0, 12.0);
        input.handle_mouse_move(20.0, 8.0);
        assert_eq!(input.cursor_delta(), Vec2::new(10.0, -2.0));
        assert_eq!(input.cursor_position(), Some(Vec2::new(20.0, 8.0)));

        input.begin_frame();
        assert_eq!(input.cursor_delta(), Vec2::zeros());
    }

    #[test]
    fn test_scroll_and_axis() {
        let mut input = InputManager::new();
        input.handle_event(&AppEvent::MouseWheel { delta_x: 0.0, delta_y: 2.0 });
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, 2.0));

        input.handle_key_input(KeyCode::D, true);
        assert_eq!(input.axis(KeyCode::A, KeyCode::D), 1.0);
        input.handle_key_input(KeyCode::A, true);
        assert_eq!(input.axis(KeyCode::A, KeyCode::D), 0.0);
    }

    #[test]
    fn test_focus_loss_releases_everything() {
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::Q, true);
        input.handle_mouse_button(MouseButton::Right, true);
        input.handle_event(&AppEvent::WindowUnfocused);
        assert!(!input.is_key_down(KeyCode::Q));
        assert!(!input.is_button_down(MouseButton::Right));
    }
}
