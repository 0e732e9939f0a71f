//! Input state management

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Tracks keyboard and mouse input state per frame
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,
    /// Keys released this frame
    keys_just_released: HashSet<KeyCode>,
    /// Raw accumulated mouse delta (for cursor-locked mode)
    raw_mouse_delta: (f64, f64),
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            keys_just_released: HashSet::new(),
            raw_mouse_delta: (0.0, 0.0),
        }
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: KeyCode) {
        if !self.keys_down.contains(&key) {
            self.keys_just_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.keys_just_released.insert(key);
    }

    /// Process raw mouse delta (device motion, for locked cursor)
    pub fn process_mouse_raw_delta(&mut self, dx: f64, dy: f64) {
        self.raw_mouse_delta.0 += dx;
        self.raw_mouse_delta.1 += dy;
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.keys_just_released.clear();
        self.raw_mouse_delta = (0.0, 0.0);
    }

    /// Is a key currently held down?
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Was a key pressed this frame?
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Get the raw mouse delta (accumulated device motion)
    pub fn raw_mouse_delta(&self) -> (f64, f64) {
        self.raw_mouse_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let mut input = InputState::new();

        // Press W
        input.process_key_down(KeyCode::KeyW);
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(input.is_key_just_pressed(KeyCode::KeyW));

        // End frame clears just_pressed
        input.end_frame();
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(!input.is_key_just_pressed(KeyCode::KeyW));

        // Release W
        input.process_key_up(KeyCode::KeyW);
        assert!(!input.is_key_down(KeyCode::KeyW));
    }

    #[test]
    fn test_repeat_does_not_retrigger_just_pressed() {
        let mut input = InputState::new();

        input.process_key_down(KeyCode::Space);
        input.end_frame();

        // OS key repeat sends another press while held
        input.process_key_down(KeyCode::Space);
        assert!(input.is_key_down(KeyCode::Space));
        assert!(!input.is_key_just_pressed(KeyCode::Space));
    }

    #[test]
    fn test_raw_mouse_delta_accumulates() {
        let mut input = InputState::new();

        input.process_mouse_raw_delta(3.0, -2.0);
        input.process_mouse_raw_delta(1.0, 1.0);

        let delta = input.raw_mouse_delta();
        assert!((delta.0 - 4.0).abs() < 1e-10);
        assert!((delta.1 + 1.0).abs() < 1e-10);

        input.end_frame();
        let delta = input.raw_mouse_delta();
        assert!((delta.0).abs() < 1e-10);
        assert!((delta.1).abs() < 1e-10);
    }
}
