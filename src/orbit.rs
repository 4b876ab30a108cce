//! Orbit navigation state driven by mouse input.
//!
//! Dragging with the left button held rotates the model, the scroll wheel
//! scales it. Every handler is total: inputs it does not care about leave
//! the state untouched.

use cgmath::{Deg, Matrix4, SquareMatrix};

use crate::input::MouseButton;
use crate::view_store::ViewSnapshot;

pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const MAX_PITCH_DEG: f32 = 90.0;
pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

#[derive(Clone, Debug)]
pub struct OrbitControls {
    // transform (degrees)
    rotation_x: f32,
    rotation_y: f32,
    scale: f32,
    model: Matrix4<f32>,

    // input
    button_down: bool,
    cursor: (f64, f64),
    sensitivity: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl OrbitControls {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 1.0,
            model: Matrix4::identity(),
            button_down: false,
            cursor: (0.0, 0.0),
            sensitivity,
        }
    }

    pub fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button == MouseButton::Left {
            self.button_down = pressed;
        }
    }

    /// Drag rotates relative to the previous cursor position; the position
    /// is recorded whether or not a drag is in progress.
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if self.button_down {
            let dx = (x - self.cursor.0) as f32;
            let dy = (y - self.cursor.1) as f32;

            self.rotation_x += dx * self.sensitivity;
            self.rotation_y += dy * self.sensitivity;
            self.rotation_y = self.rotation_y.clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);

            self.update_model_matrix();
        }

        self.cursor = (x, y);
    }

    /// Zoom is proportional to the current scale so it feels exponential.
    pub fn scroll(&mut self, _dx: f64, dy: f64) {
        if dy == 0.0 {
            return;
        }

        self.scale += dy as f32 * self.scale / 5.0;
        self.scale = self.scale.clamp(MIN_SCALE, MAX_SCALE);

        self.update_model_matrix();
    }

    pub fn rotation(&self) -> (f32, f32) {
        (self.rotation_x, self.rotation_y)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    pub fn model_matrix(&self) -> &Matrix4<f32> {
        &self.model
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            rotation_x: self.rotation_x,
            rotation_y: self.rotation_y,
            scale: self.scale,
        }
    }

    /// Applies a stored view. Values are clamped again since the snapshot
    /// may come from disk.
    pub fn restore(&mut self, snapshot: ViewSnapshot) {
        let finite = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        self.rotation_x = finite(snapshot.rotation_x, 0.0);
        self.rotation_y = finite(snapshot.rotation_y, 0.0).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
        self.scale = finite(snapshot.scale, 1.0).clamp(MIN_SCALE, MAX_SCALE);
        self.update_model_matrix();
    }

    fn update_model_matrix(&mut self) {
        self.model = Matrix4::from_angle_x(Deg(self.rotation_y))
            * Matrix4::from_angle_y(Deg(self.rotation_x))
            * Matrix4::from_scale(self.scale);
    }
}
