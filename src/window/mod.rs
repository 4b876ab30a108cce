//! The viewer window: owns camera, orbit state and frame timing, and drives
//! the update/render cycle.
//!
//! Everything except drawing works without a GPU. The platform layer
//! attaches a [`WindowBase`] and [`Renderer`] once the native window exists;
//! until then [`Window::render`] does nothing.

pub mod base;

use cgmath::{Deg, EuclideanSpace};
use instant::Instant;
use log::{error, info, warn};
use winit::keyboard::KeyCode;

pub use base::WindowBase;

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::frame::{FpsCounter, FrameClock};
use crate::input::InputEvent;
use crate::orbit::OrbitControls;
use crate::render::Renderer;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closed,
}

struct Graphics {
    base: WindowBase,
    renderer: Renderer,
}

pub struct Window {
    camera: Camera,
    orbit: OrbitControls,
    fps: FpsCounter,
    clock: FrameClock,
    state: LoopState,
    viewport: (u32, u32),
    clear_color: wgpu::Color,
    graphics: Option<Graphics>,
}

impl Window {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(&ViewerConfig { width, height, ..ViewerConfig::default() })
    }

    pub fn with_config(config: &ViewerConfig) -> Self {
        let mut camera = Camera::new(config.width, config.height, Deg(config.fov_degrees).into());
        let [x, y, z] = config.camera_position;
        camera.set_position(x, y, z);

        Self {
            camera,
            orbit: OrbitControls::new(config.orbit_sensitivity),
            fps: FpsCounter::new(),
            clock: FrameClock::new(),
            state: LoopState::Running,
            viewport: (config.width, config.height),
            clear_color: config.clear_color(),
            graphics: None,
        }
    }

    /// Hands over the GPU side; viewport and camera follow the surface size.
    pub fn attach(&mut self, mut base: WindowBase, renderer: Renderer) {
        let (width, height) = base.size();
        self.viewport = (width, height);
        self.camera.resize(width, height);
        if self.state == LoopState::Closed {
            base.request_close();
        }
        self.graphics = Some(Graphics { base, renderer });
    }

    pub fn is_attached(&self) -> bool {
        self.graphics.is_some()
    }

    pub fn loop_state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn request_close(&mut self) {
        if self.state == LoopState::Closed {
            return;
        }
        info!("close requested");
        self.state = LoopState::Closed;
        if let Some(gfx) = self.graphics.as_mut() {
            gfx.base.request_close();
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn base(&self) -> Option<&WindowBase> {
        self.graphics.as_ref().map(|g| &g.base)
    }

    /// Applies one input event. Events arriving after close are ignored.
    pub fn handle_event(&mut self, event: InputEvent) {
        if self.state == LoopState::Closed {
            return;
        }

        match event {
            InputEvent::Key { code: KeyCode::Escape, pressed: true } => self.request_close(),
            InputEvent::Key { .. } => {}
            InputEvent::CloseRequested => self.request_close(),
            InputEvent::Resized { width, height } => self.resize(width, height),
            InputEvent::MouseButton { button, pressed } => self.orbit.mouse_button(button, pressed),
            InputEvent::CursorMoved { x, y } => self.orbit.cursor_moved(x, y),
            InputEvent::Scroll { dx, dy } => self.orbit.scroll(dx, dy),
        }
    }

    /// Minimized windows report 0x0; the last usable size is kept.
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        if let Some(gfx) = self.graphics.as_mut() {
            gfx.base.resize(width, height);
        }
        self.camera.resize(width, height);
    }

    /// One iteration of the loop after events were dispatched.
    pub fn frame(&mut self, now: Instant) {
        let dt = self.clock.tick(now);
        self.update(dt);
        self.render();
    }

    /// Returns the frame count when an fps report was emitted.
    pub fn update(&mut self, dt: f32) -> Option<u32> {
        let report = self.fps.tick(dt);
        if let Some(frames) = report {
            info!("Fps: {frames}");
        }
        report
    }

    pub fn render(&mut self) {
        if self.state == LoopState::Closed {
            return;
        }
        let Some(gfx) = self.graphics.as_mut() else { return };

        let shader = &mut gfx.renderer.shader;
        shader.set_float3("u_view_pos", self.camera.position().to_vec());
        shader.set_mat4("u_proj_view", &self.camera.proj_view());
        shader.set_mat4("u_model", self.orbit.model_matrix());

        match gfx.renderer.draw(&gfx.base, self.clear_color) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gfx.base.reconfigure(),
            Err(wgpu::SurfaceError::Timeout) => warn!("Surface timeout"),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("Out of memory");
                self.request_close();
            }
            Err(wgpu::SurfaceError::Other) => error!("Unknown surface error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn escape_closes_other_keys_do_not() {
        let mut window = Window::new(800, 600);
        window.handle_event(InputEvent::Key { code: KeyCode::KeyA, pressed: true });
        window.handle_event(InputEvent::Key { code: KeyCode::Escape, pressed: false });
        assert_eq!(window.loop_state(), LoopState::Running);
        window.handle_event(InputEvent::Key { code: KeyCode::Escape, pressed: true });
        assert_eq!(window.loop_state(), LoopState::Closed);
    }

    #[test]
    fn os_close_request_closes() {
        let mut window = Window::new(800, 600);
        window.handle_event(InputEvent::CloseRequested);
        assert!(!window.is_running());
    }

    #[test]
    fn resize_updates_viewport_and_camera() {
        let mut window = Window::new(800, 600);
        window.handle_event(InputEvent::Resized { width: 1200, height: 400 });
        assert_eq!(window.viewport(), (1200, 400));
        assert!((window.camera().aspect() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn minimizing_keeps_the_last_viewport() {
        let mut window = Window::new(800, 600);
        window.handle_event(InputEvent::Resized { width: 0, height: 0 });
        assert_eq!(window.viewport(), (800, 600));
        window.handle_event(InputEvent::Resized { width: 640, height: 0 });
        assert_eq!(window.viewport(), (800, 600));
        assert!((window.camera().aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn input_after_close_is_ignored() {
        let mut window = Window::new(800, 600);
        window.request_close();
        window.handle_event(InputEvent::Scroll { dx: 0.0, dy: 3.0 });
        assert_eq!(window.orbit().scale(), 1.0);
    }

    #[test]
    fn frames_feed_the_fps_counter_without_gpu() {
        let mut window = Window::new(800, 600);
        let start = Instant::now();
        // first frame contributes nothing
        window.frame(start);
        assert_eq!(window.update(0.6), None);
        assert_eq!(window.update(0.6), Some(3));
        window.frame(start + Duration::from_millis(100));
        assert!(!window.is_attached());
    }

    #[test]
    fn camera_starts_at_configured_position() {
        let window = Window::new(800, 600);
        assert_eq!(window.camera().position(), cgmath::Point3::new(0.0, 0.0, 4.0));
        assert_eq!(window.orbit().rotation(), (0.0, 0.0));
        assert!(!window.orbit().is_button_down());
    }
}
