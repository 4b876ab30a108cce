use cgmath::{Matrix4, Point3, Rad, Vector3};

/// cgmath builds OpenGL clip space (z in -1..1); wgpu expects 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective camera looking at the origin.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Point3<f32>,
    target: Point3<f32>,
    fovy: Rad<f32>,
    width: u32,
    height: u32,
    znear: f32,
    zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, fovy: Rad<f32>) -> Self {
        Camera {
            position: Point3::new(0.0, 0.0, 1.0),
            target: Point3::new(0.0, 0.0, 0.0),
            fovy,
            width: width.max(1),
            height: height.max(1),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Point3::new(x, y, z);
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Minimized windows report 0x0; keep the last usable aspect in that case.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }

    pub fn projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect(), self.znear, self.zfar)
    }

    pub fn proj_view(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Vector4};

    #[test]
    fn resize_updates_aspect() {
        let mut camera = Camera::new(800, 600, Deg(45.0).into());
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
        camera.resize(1000, 500);
        assert!((camera.aspect() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut camera = Camera::new(800, 600, Deg(45.0).into());
        camera.resize(0, 0);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn origin_projects_to_screen_centre_inside_depth_range() {
        let mut camera = Camera::new(800, 600, Deg(45.0).into());
        camera.set_position(0.0, 0.0, 4.0);
        let clip = camera.proj_view() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "depth {} outside 0..1", ndc.z);
    }
}
