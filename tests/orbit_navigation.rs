//! Drives a GPU-less window through the same input sequence the platform
//! loop would feed it.

use cgmath::Vector4;
use model_viewer::input::{InputEvent, MouseButton};
use model_viewer::orbit::{MAX_PITCH_DEG, MAX_SCALE, MIN_SCALE};
use model_viewer::window::{LoopState, Window};
use winit::keyboard::KeyCode;

fn drag(window: &mut Window, from: (f64, f64), to: (f64, f64)) {
    window.handle_event(InputEvent::CursorMoved { x: from.0, y: from.1 });
    window.handle_event(InputEvent::MouseButton { button: MouseButton::Left, pressed: true });
    window.handle_event(InputEvent::CursorMoved { x: to.0, y: to.1 });
    window.handle_event(InputEvent::MouseButton { button: MouseButton::Left, pressed: false });
}

#[test]
fn horizontal_drag_rotates_about_one_axis() {
    let mut window = Window::new(800, 600);
    drag(&mut window, (0.0, 0.0), (10.0, 0.0));

    let (rx, ry) = window.orbit().rotation();
    assert!((rx - 1.0).abs() < 1e-6);
    assert_eq!(ry, 0.0);
    assert!(!window.orbit().is_button_down());
}

#[test]
fn moving_without_button_only_tracks_cursor() {
    let mut window = Window::new(800, 600);
    window.handle_event(InputEvent::CursorMoved { x: 300.0, y: 200.0 });
    window.handle_event(InputEvent::MouseButton { button: MouseButton::Right, pressed: true });
    window.handle_event(InputEvent::CursorMoved { x: 400.0, y: 250.0 });

    assert_eq!(window.orbit().rotation(), (0.0, 0.0));
    assert_eq!(window.orbit().cursor(), (400.0, 250.0));
}

#[test]
fn pitch_and_scale_stay_in_range() {
    let mut window = Window::new(800, 600);
    drag(&mut window, (0.0, 0.0), (0.0, 5000.0));
    assert_eq!(window.orbit().rotation().1, MAX_PITCH_DEG);

    for _ in 0..100 {
        window.handle_event(InputEvent::Scroll { dx: 0.0, dy: 1.0 });
    }
    assert_eq!(window.orbit().scale(), MAX_SCALE);

    for _ in 0..100 {
        window.handle_event(InputEvent::Scroll { dx: 0.0, dy: -1.0 });
    }
    assert_eq!(window.orbit().scale(), MIN_SCALE);
}

#[test]
fn horizontal_scroll_leaves_model_untouched() {
    let mut window = Window::new(800, 600);
    let before = *window.orbit().model_matrix();
    window.handle_event(InputEvent::Scroll { dx: 4.0, dy: 0.0 });
    assert_eq!(*window.orbit().model_matrix(), before);
    assert_eq!(window.orbit().scale(), 1.0);
}

#[test]
fn zoom_scales_model_matrix() {
    let mut window = Window::new(800, 600);
    window.handle_event(InputEvent::Scroll { dx: 0.0, dy: 1.0 });

    let scale = window.orbit().scale();
    assert!((scale - 1.2).abs() < 1e-6);
    let p = *window.orbit().model_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
    assert!((p.x - 1.2).abs() < 1e-5);
    assert!(p.y.abs() < 1e-6);
}

#[test]
fn escape_ends_the_session() {
    let mut window = Window::new(800, 600);
    drag(&mut window, (0.0, 0.0), (20.0, 0.0));
    window.handle_event(InputEvent::Key { code: KeyCode::Escape, pressed: true });
    assert_eq!(window.loop_state(), LoopState::Closed);

    // state from before the close is kept for persisting
    let snapshot = window.orbit().snapshot();
    assert!((snapshot.rotation_x - 2.0).abs() < 1e-6);
}

#[test]
fn hidpi_drag_rotates_by_logical_distance() {
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, WindowEvent};

    // SAFETY: the id is only carried inside the event.
    let device_id = unsafe { DeviceId::dummy() };
    let moved = |x: f64| WindowEvent::CursorMoved { device_id, position: PhysicalPosition::new(x, 0.0) };

    let mut window = Window::new(800, 600);
    window.handle_event(InputEvent::from_window_event(&moved(0.0), 2.0).unwrap());
    window.handle_event(InputEvent::MouseButton { button: MouseButton::Left, pressed: true });
    window.handle_event(InputEvent::from_window_event(&moved(20.0), 2.0).unwrap());

    let (rx, _) = window.orbit().rotation();
    assert!((rx - 1.0).abs() < 1e-6);
}
