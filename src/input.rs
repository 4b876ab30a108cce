use winit::dpi::LogicalPosition;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Touchpads report pixels; one wheel notch is treated as this many
/// logical pixels.
pub const PIXELS_PER_LINE: f64 = 20.0;

/// Window input the viewer reacts to, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// `pressed` is false for releases and for OS key repeats.
    Key { code: KeyCode, pressed: bool },
    Resized { width: u32, height: u32 },
    MouseButton { button: MouseButton, pressed: bool },
    /// Logical pixels, so drag speed does not depend on the display scale.
    CursorMoved { x: f64, y: f64 },
    /// Offsets in wheel lines, positive y away from the user.
    Scroll { dx: f64, dy: f64 },
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => Self::Left,
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Other,
        }
    }
}

impl InputEvent {
    /// Translate a winit event; `None` for events the viewer ignores.
    /// `scale_factor` is the window's, used to turn physical pixels into
    /// logical ones.
    pub fn from_window_event(event: &WindowEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WindowEvent::CloseRequested => Some(Self::CloseRequested),
            WindowEvent::Resized(size) => Some(Self::Resized { width: size.width, height: size.height }),
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => Some(Self::Key {
                    code,
                    pressed: event.state == ElementState::Pressed && !event.repeat,
                }),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::MouseInput { state, button, .. } => Some(Self::MouseButton {
                button: (*button).into(),
                pressed: *state == ElementState::Pressed,
            }),
            WindowEvent::CursorMoved { position, .. } => {
                let LogicalPosition { x, y } = position.to_logical::<f64>(scale_factor);
                Some(Self::CursorMoved { x, y })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x as f64, *y as f64),
                    MouseScrollDelta::PixelDelta(p) => {
                        let LogicalPosition { x, y } = p.to_logical::<f64>(scale_factor);
                        (x / PIXELS_PER_LINE, y / PIXELS_PER_LINE)
                    }
                };
                Some(Self::Scroll { dx, dy })
            }
            _ => None,
        }
    }
}
